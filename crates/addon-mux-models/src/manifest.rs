use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Upstream addon manifest as captured at registration time.
///
/// Only the fields the aggregation logic reads are typed. Everything else the
/// addon declared (resources, logo, behaviorHints, ...) is kept in `other` so the
/// stored copy stays verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddonManifest {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub types: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id_prefixes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub catalogs: Vec<CatalogDescriptor>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One inner catalog declared by an upstream addon. Undeclared fields
/// (pageSize, showInHome, ...) are kept in `other`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDescriptor {
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_supported: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Identity fields of the combined manifest served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestInfo {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Default for ManifestInfo {
    fn default() -> Self {
        Self {
            id: "community.addonmux".to_string(),
            version: "1.0.0".to_string(),
            name: "AddonMux".to_string(),
            description: "All of your catalog addons combined into one".to_string(),
            logo: None,
            background: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombinedManifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub id_prefixes: Vec<String>,
    pub catalogs: Vec<CombinedCatalog>,
    pub behavior_hints: BehaviorHints,
}

/// Catalog entry of the combined manifest. `id` is the composite catalog id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombinedCatalog {
    #[serde(rename = "type")]
    pub content_type: String,
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_supported: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub configurable: bool,
    pub configuration_required: bool,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
