//! HTTP surface of addonmux: the per-user combined manifest and the catalog proxy.

mod handlers;

use addon_mux_config::{Config, PathManager};
use addon_mux_core::{CatalogRouter, ManifestCompositor};
use addon_mux_models::ManifestInfo;
use addon_mux_sources::{AddonClient, CatalogFetcher, FileRegistrationStore, RegistrationStore};
use anyhow::{Context, Result};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

pub const HEALTH_ENDPOINT: &str = "/health";
pub const MANIFEST_ENDPOINT: &str = "/{user_id}/manifest.json";
pub const CATALOG_ENDPOINT: &str = "/{user_id}/catalog/{content_type}/{catalog_file}";
pub const CATALOG_EXTRA_ENDPOINT: &str = "/{user_id}/catalog/{content_type}/{composite_id}/{extra_file}";

/// Shared state of the addon server. Holds no per-request data.
pub struct AppState {
    store: Arc<dyn RegistrationStore>,
    compositor: ManifestCompositor,
    router: CatalogRouter,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        fetcher: Arc<dyn CatalogFetcher>,
        info: ManifestInfo,
    ) -> Self {
        Self {
            store,
            compositor: ManifestCompositor::new(info),
            router: CatalogRouter::new(fetcher),
        }
    }

    pub fn from_config(config: &Config, paths: &PathManager) -> Result<Self> {
        config.validate().context("invalid addonmux configuration")?;

        let users_dir = config.users_dir(paths);
        std::fs::create_dir_all(&users_dir).with_context(|| {
            format!("failed to create registrations directory '{}'", users_dir.display())
        })?;

        let store = Arc::new(FileRegistrationStore::new(users_dir));
        let fetcher = Arc::new(AddonClient::new(Duration::from_secs(config.server.request_timeout_secs)));
        Ok(Self::new(store, fetcher, config.manifest.clone()))
    }
}

/// Routes of the addon server. No-cache and CORS headers are applied to every addon route,
/// including the 500 answered when a handler panics.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            MANIFEST_ENDPOINT,
            get(handlers::handle_manifest).options(handlers::handle_preflight),
        )
        .route(
            CATALOG_ENDPOINT,
            get(handlers::handle_catalog).options(handlers::handle_preflight),
        )
        .route(
            CATALOG_EXTRA_ENDPOINT,
            get(handlers::handle_catalog_with_extra).options(handlers::handle_preflight),
        )
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(middleware::map_response(handlers::apply_addon_headers))
        .route(HEALTH_ENDPOINT, get(handlers::handle_health))
        .with_state(state)
}

/// Run the addon server until Ctrl-C.
pub async fn run_server(config: &Config, paths: &PathManager) -> Result<()> {
    let bind_addr = config.bind_addr()?;
    let state = Arc::new(AppState::from_config(config, paths)?);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind addon server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve addon server listen address")?;

    info!(
        operation = "server_started",
        addr = %local_addr,
        users_dir = %config.users_dir(paths).display(),
        manifest_id = %config.manifest.id,
        "Addon server listening"
    );

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!(operation = "server_shutdown", "Shutting down addon server");
        })
        .await
        .context("addon server exited unexpectedly")?;
    Ok(())
}
