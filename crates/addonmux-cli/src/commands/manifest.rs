use crate::output::Output;
use addon_mux_core::ManifestCompositor;
use addon_mux_sources::RegistrationStore;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

pub async fn run_manifest(user_id: &str, output: &Output) -> Result<()> {
    let paths = super::paths();
    let config = super::load_config(&paths)?;
    let store = super::open_store(&config, &paths);
    let compositor = ManifestCompositor::new(config.manifest.clone());

    let manifest = if store.user_exists(user_id).await? {
        let registrations = store
            .active_registrations(user_id)
            .await
            .wrap_err_with(|| format!("Failed to read registrations of '{user_id}'"))?;
        compositor.compose(&registrations)
    } else {
        output.warn(format!("No registrations file for user '{user_id}'"));
        compositor.user_not_found()
    };

    output.data(&serde_json::to_value(&manifest)?);
    Ok(())
}
