use addon_mux_models::AddonManifest;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use crate::addon::api;
use crate::error::UpstreamError;
use crate::traits::CatalogFetcher;

/// Create a reqwest Client for talking to upstream addons
pub fn create_addon_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(concat!("addonmux/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// HTTP client for upstream addons. One GET per call, no retries.
#[derive(Clone)]
pub struct AddonClient {
    client: Client,
}

impl AddonClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: create_addon_client(timeout),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch an addon's `manifest.json`. Accepts the manifest URL or the addon's base URL.
    pub async fn fetch_manifest(&self, url: &str) -> Result<AddonManifest, UpstreamError> {
        let url = api::manifest_url(url);
        let body = self.get_json(&url).await?;
        serde_json::from_value(body).map_err(|source| UpstreamError::Decode { url, source })
    }

    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        debug!(upstream_url = url, "Requesting upstream addon");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| UpstreamError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| UpstreamError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|source| UpstreamError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl CatalogFetcher for AddonClient {
    async fn fetch_catalog(
        &self,
        endpoint: &str,
        content_type: &str,
        inner_id: &str,
        extra: Option<&str>,
    ) -> Result<Vec<Value>, UpstreamError> {
        let url = api::catalog_url(endpoint, content_type, inner_id, extra);
        let body = self.get_json(&url).await?;
        let metas = api::extract_metas(body, &url)?;
        debug!(upstream_url = %url, items = metas.len(), "Fetched upstream catalog");
        Ok(metas)
    }
}
