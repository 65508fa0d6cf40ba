use addon_mux_models::CatalogRegistration;
use async_trait::async_trait;
use serde_json::Value;
use crate::error::{StoreError, UpstreamError};
use crate::store::active_in_order;

/// Read/write access to users' catalog registrations.
///
/// Unknown users are not an error: `all_registrations` returns an empty list and
/// `user_exists` reports `false`.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn user_exists(&self, user_id: &str) -> Result<bool, StoreError>;

    async fn all_registrations(&self, user_id: &str) -> Result<Vec<CatalogRegistration>, StoreError>;

    async fn save_registrations(
        &self,
        user_id: &str,
        registrations: &[CatalogRegistration],
    ) -> Result<(), StoreError>;

    /// Registrations that take part in composition and routing: active only,
    /// ascending by `order`, ties kept in stored order
    async fn active_registrations(&self, user_id: &str) -> Result<Vec<CatalogRegistration>, StoreError> {
        let registrations = self.all_registrations(user_id).await?;
        Ok(active_in_order(registrations))
    }
}

/// Fetches catalog items from an upstream addon
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// GET `{endpoint}catalog/{content_type}/{inner_id}.json` (or `.../{inner_id}/{extra}.json`)
    /// and return its `metas` array
    async fn fetch_catalog(
        &self,
        endpoint: &str,
        content_type: &str,
        inner_id: &str,
        extra: Option<&str>,
    ) -> Result<Vec<Value>, UpstreamError>;
}
