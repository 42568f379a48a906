pub mod config;
pub mod episodes;
pub mod history;
pub mod play;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use media_player_config::{Config, PathManager};
use media_player_core::{FileStore, HistoryRepository};
use std::sync::Arc;

/// Load the config file (defaults when absent) and reject invalid values.
pub fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .wrap_err_with(|| format!("Invalid configuration in {}", config_file.display()))?;
    Ok(config)
}

/// Watch history backed by the on-disk store.
pub fn open_history(path_manager: &PathManager, config: &Config) -> Result<HistoryRepository> {
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create data directories: {}", e))?;
    let store = FileStore::new(path_manager.store_file());
    Ok(HistoryRepository::with_config(Arc::new(store), &config.history))
}
