use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::manifest::AddonManifest;

const MANIFEST_SUFFIX: &str = "/manifest.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Active,
    Inactive,
}

/// A user's registration of one upstream addon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRegistration {
    pub manifest_url: String,
    pub display_name: String,
    #[serde(default)]
    pub status: RegistrationStatus,
    #[serde(default)]
    pub randomized: bool,
    #[serde(default)]
    pub order: i64,
    pub original_manifest: AddonManifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
}

impl CatalogRegistration {
    pub fn is_active(&self) -> bool {
        self.status == RegistrationStatus::Active
    }

    pub fn addon_id(&self) -> &str {
        &self.original_manifest.id
    }

    /// Base endpoint of the upstream addon, always ending in exactly one `/`.
    ///
    /// `https://addon.example/manifest.json` and `https://addon.example//` both
    /// become `https://addon.example/`.
    pub fn endpoint(&self) -> String {
        let url = self.manifest_url.trim();
        let base = url.strip_suffix(MANIFEST_SUFFIX).unwrap_or(url);
        format!("{}/", base.trim_end_matches('/'))
    }
}
