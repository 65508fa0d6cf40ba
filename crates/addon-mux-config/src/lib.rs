pub mod config;
pub mod paths;

pub use config::{Config, ServerConfig, StorageConfig, default_bind, default_request_timeout_secs};
pub use paths::{PathManager, container_base_path};
