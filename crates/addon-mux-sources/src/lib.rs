pub mod traits;
pub mod addon;
pub mod store;
pub mod error;

pub use traits::{CatalogFetcher, RegistrationStore};
pub use addon::AddonClient;
pub use store::{FileRegistrationStore, InMemoryRegistrationStore, active_in_order, is_valid_user_id};
pub use error::{StoreError, UpstreamError};
