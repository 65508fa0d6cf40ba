use addon_mux_models::CatalogRegistration;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use crate::error::StoreError;
use crate::store::is_valid_user_id;
use crate::traits::RegistrationStore;

/// Registration store held in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    users: RwLock<HashMap<String, Vec<CatalogRegistration>>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>, registrations: Vec<CatalogRegistration>) -> Self {
        self.users.get_mut().insert(user_id.into(), registrations);
        self
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn user_exists(&self, user_id: &str) -> Result<bool, StoreError> {
        Ok(self.users.read().await.contains_key(user_id))
    }

    async fn all_registrations(&self, user_id: &str) -> Result<Vec<CatalogRegistration>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_registrations(
        &self,
        user_id: &str,
        registrations: &[CatalogRegistration],
    ) -> Result<(), StoreError> {
        if !is_valid_user_id(user_id) {
            return Err(StoreError::InvalidUserId(user_id.to_string()));
        }
        self.users
            .write()
            .await
            .insert(user_id.to_string(), registrations.to_vec());
        Ok(())
    }
}
