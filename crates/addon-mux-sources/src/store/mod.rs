mod file;
mod memory;

pub use file::FileRegistrationStore;
pub use memory::InMemoryRegistrationStore;

use addon_mux_models::CatalogRegistration;

/// User ids become file names, so they are limited to `[A-Za-z0-9_-]`
pub fn is_valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Keep active registrations and sort them by `order`. The sort is stable.
pub fn active_in_order(mut registrations: Vec<CatalogRegistration>) -> Vec<CatalogRegistration> {
    registrations.retain(|r| r.is_active());
    registrations.sort_by_key(|r| r.order);
    registrations
}
