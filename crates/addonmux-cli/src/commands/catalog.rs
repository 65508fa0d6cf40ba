use crate::output::Output;
use addon_mux_core::{CatalogRequest, CatalogRouter};
use addon_mux_sources::RegistrationStore;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::sync::Arc;

pub async fn run_catalog(
    user_id: &str,
    content_type: &str,
    composite_id: &str,
    extra: Option<&str>,
    output: &Output,
) -> Result<()> {
    let paths = super::paths();
    let config = super::load_config(&paths)?;
    let store = super::open_store(&config, &paths);

    if !store.user_exists(user_id).await? {
        return Err(eyre!("User '{}' has no registrations file", user_id));
    }

    let registrations = store
        .active_registrations(user_id)
        .await
        .wrap_err_with(|| format!("Failed to read registrations of '{user_id}'"))?;

    let router = CatalogRouter::new(Arc::new(super::addon_client(&config)));
    let request = CatalogRequest::new(content_type, composite_id).with_extra(extra);
    let response = router.route(&registrations, request).await;

    if response.is_empty() {
        output.warn(format!("No items for {content_type} catalog '{composite_id}'"));
    }
    output.data(&serde_json::to_value(&response)?);
    Ok(())
}
