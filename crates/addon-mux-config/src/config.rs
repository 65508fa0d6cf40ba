use addon_mux_models::ManifestInfo;
use crate::paths::PathManager;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub manifest: ManifestInfo,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Upper bound for a single upstream catalog or manifest request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides the registrations directory (defaults to `<data_dir>/users`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

pub fn default_bind() -> String {
    "127.0.0.1:7000".to_string()
}

pub fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if present, otherwise fall back to defaults
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.bind_addr()?;

        if self.server.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("server.request_timeout_secs must be greater than zero"));
        }

        if self.manifest.id.trim().is_empty() {
            return Err(anyhow::anyhow!("manifest.id is required and cannot be empty"));
        }

        Ok(())
    }

    /// Directory holding one registrations file per user
    pub fn users_dir(&self, paths: &PathManager) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| paths.users_dir())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            anyhow::anyhow!("Invalid server.bind '{}': expected host:port ({})", self.server.bind, e)
        })
    }
}
