use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field the router stamps on every item with the owning registration's display name.
pub const SOURCE_ADDON_FIELD: &str = "sourceAddon";

/// Body of a catalog response. Items are passed through as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CatalogResponse {
    #[serde(default)]
    pub metas: Vec<Value>,
}

impl CatalogResponse {
    pub fn empty() -> Self {
        Self { metas: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }
}
