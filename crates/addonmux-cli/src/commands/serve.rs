use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;

pub async fn run_serve(bind: Option<String>, output: &Output) -> Result<()> {
    let paths = super::paths();
    let mut config = super::load_config(&paths)?;
    if let Some(bind) = bind {
        config.server.bind = bind;
        config.validate().map_err(|e| eyre!("{}", e))?;
    }

    output.info(format!(
        "Serving manifests for users in {} on http://{}",
        config.users_dir(&paths).display(),
        config.server.bind
    ));

    addon_mux_server::run_server(&config, &paths)
        .await
        .map_err(|e| eyre!("{:#}", e))?;

    output.success("Addon server stopped");
    Ok(())
}
