pub mod config;
pub mod paths;

pub use config::{BackendConfig, Config, ConfigError, HistoryConfig, PlaybackConfig};
pub use paths::{PathManager, container_base_path};
