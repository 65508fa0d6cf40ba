use addon_mux_models::CatalogRegistration;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};
use crate::error::StoreError;
use crate::store::is_valid_user_id;
use crate::traits::RegistrationStore;

/// Registration store keeping one JSON file per user under `users_dir`.
///
/// A user exists exactly when `<users_dir>/<user_id>.json` exists.
#[derive(Debug, Clone)]
pub struct FileRegistrationStore {
    users_dir: PathBuf,
}

impl FileRegistrationStore {
    pub fn new(users_dir: impl Into<PathBuf>) -> Self {
        Self {
            users_dir: users_dir.into(),
        }
    }

    pub fn users_dir(&self) -> &std::path::Path {
        &self.users_dir
    }

    fn user_file(&self, user_id: &str) -> Option<PathBuf> {
        if !is_valid_user_id(user_id) {
            return None;
        }
        Some(self.users_dir.join(format!("{}.json", user_id)))
    }
}

#[async_trait]
impl RegistrationStore for FileRegistrationStore {
    async fn user_exists(&self, user_id: &str) -> Result<bool, StoreError> {
        let Some(path) = self.user_file(user_id) else {
            debug!(user_id, "Rejected malformed user id");
            return Ok(false);
        };

        tokio::fs::try_exists(&path).await.map_err(|source| StoreError::Io {
            user_id: user_id.to_string(),
            source,
        })
    }

    async fn all_registrations(&self, user_id: &str) -> Result<Vec<CatalogRegistration>, StoreError> {
        let Some(path) = self.user_file(user_id) else {
            return Ok(Vec::new());
        };

        match tokio::fs::read(&path).await {
            Ok(content) => serde_json::from_slice(&content).map_err(|source| StoreError::Corrupted {
                user_id: user_id.to_string(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(user_id, "No registrations file for user");
                Ok(Vec::new())
            }
            Err(source) => Err(StoreError::Io {
                user_id: user_id.to_string(),
                source,
            }),
        }
    }

    async fn save_registrations(
        &self,
        user_id: &str,
        registrations: &[CatalogRegistration],
    ) -> Result<(), StoreError> {
        let path = self
            .user_file(user_id)
            .ok_or_else(|| StoreError::InvalidUserId(user_id.to_string()))?;
        let io_error = |source| StoreError::Io {
            user_id: user_id.to_string(),
            source,
        };

        let content = serde_json::to_vec_pretty(registrations).map_err(|source| StoreError::Encode {
            user_id: user_id.to_string(),
            source,
        })?;

        tokio::fs::create_dir_all(&self.users_dir).await.map_err(io_error)?;

        // Write-then-rename so readers never observe a half-written file
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await.map_err(io_error)?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(io_error)?;

        info!(
            user_id,
            registrations = registrations.len(),
            "Saved registrations"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addon_mux_models::{AddonManifest, RegistrationStatus};

    fn registration(addon_id: &str, order: i64, status: RegistrationStatus) -> CatalogRegistration {
        CatalogRegistration {
            manifest_url: format!("https://{addon_id}.example/manifest.json"),
            display_name: format!("{addon_id} picks"),
            status,
            randomized: false,
            order,
            original_manifest: AddonManifest {
                id: addon_id.to_string(),
                types: vec!["movie".to_string()],
                ..AddonManifest::default()
            },
            registered_at: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_registrations() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRegistrationStore::new(dir.path().join("users"));

        assert!(!store.user_exists("alice").await.unwrap());
        assert!(store.all_registrations("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_active_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRegistrationStore::new(dir.path().join("users"));
        let registrations = vec![
            registration("com.gamma", 2, RegistrationStatus::Active),
            registration("com.alpha", 0, RegistrationStatus::Active),
            registration("com.beta", 1, RegistrationStatus::Inactive),
        ];

        store.save_registrations("alice", &registrations).await.unwrap();

        assert!(store.user_exists("alice").await.unwrap());
        assert_eq!(store.all_registrations("alice").await.unwrap(), registrations);

        let active = store.active_registrations("alice").await.unwrap();
        let ids: Vec<&str> = active.iter().map(|r| r.addon_id()).collect();
        assert_eq!(ids, vec!["com.alpha", "com.gamma"]);
    }

    #[tokio::test]
    async fn test_empty_save_creates_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRegistrationStore::new(dir.path().join("users"));

        store.save_registrations("bob", &[]).await.unwrap();
        assert!(store.user_exists("bob").await.unwrap());
        assert!(store.active_registrations("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let users_dir = dir.path().join("users");
        std::fs::create_dir_all(&users_dir).unwrap();
        std::fs::write(users_dir.join("carol.json"), "{not json").unwrap();
        let store = FileRegistrationStore::new(users_dir);

        let err = store.all_registrations("carol").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupted { .. }));
    }

    #[tokio::test]
    async fn test_path_like_user_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRegistrationStore::new(dir.path().join("users"));

        assert!(!store.user_exists("../secrets").await.unwrap());
        let err = store.save_registrations("../secrets", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidUserId(_)));
    }
}
