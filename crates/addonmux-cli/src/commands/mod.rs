pub mod catalog;
pub mod config;
pub mod manifest;
pub mod registrations;
pub mod serve;

use addon_mux_config::{Config, PathManager};
use addon_mux_sources::{AddonClient, FileRegistrationStore};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::time::Duration;

pub fn paths() -> PathManager {
    PathManager::default()
}

/// Load config.toml (defaults when absent) and validate it
pub fn load_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

pub fn open_store(config: &Config, paths: &PathManager) -> FileRegistrationStore {
    FileRegistrationStore::new(config.users_dir(paths))
}

pub fn addon_client(config: &Config) -> AddonClient {
    AddonClient::new(Duration::from_secs(config.server.request_timeout_secs))
}
