use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("backend.base_url must start with http:// or https:// (got {0:?})")]
    InvalidBaseUrl(String),
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("history.storage_key cannot be empty")]
    EmptyStorageKey,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_episodes_per_page")]
    pub episodes_per_page: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: u64,
    #[serde(default = "default_controls_hide_secs")]
    pub controls_hide_secs: u64,
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: f64,
    /// Progress written for a freshly started episode until the first tick
    #[serde(default = "default_placeholder_progress_secs")]
    pub placeholder_progress_secs: f64,
    /// Used when the catalog has no runtime for an episode
    #[serde(default = "default_episode_duration_secs")]
    pub default_episode_duration_secs: f64,
    /// Navigation is blocked while a new episode loads, at most this long
    #[serde(default = "default_switch_timeout_secs")]
    pub switch_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_base_url() -> String {
    std::env::var("SWPLAY_BACKEND_URL").unwrap_or_else(|_| "http://localhost:8001".to_string())
}

fn default_episodes_per_page() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_progress_interval_secs() -> u64 {
    5
}

fn default_controls_hide_secs() -> u64 {
    3
}

fn default_skip_seconds() -> f64 {
    10.0
}

fn default_placeholder_progress_secs() -> f64 {
    1.0
}

fn default_episode_duration_secs() -> f64 {
    2400.0 // 40 minutes
}

fn default_switch_timeout_secs() -> u64 {
    15
}

fn default_max_entries() -> usize {
    50
}

fn default_storage_key() -> String {
    "watch_history".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            episodes_per_page: default_episodes_per_page(),
            timeout_secs: default_timeout_secs(),
            api_token: None,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval_secs: default_progress_interval_secs(),
            controls_hide_secs: default_controls_hide_secs(),
            skip_seconds: default_skip_seconds(),
            placeholder_progress_secs: default_placeholder_progress_secs(),
            default_episode_duration_secs: default_episode_duration_secs(),
            switch_timeout_secs: default_switch_timeout_secs(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            storage_key: default_storage_key(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PlaybackConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }

    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_secs(self.controls_hide_secs)
    }

    pub fn switch_timeout(&self) -> Duration {
        Duration::from_secs(self.switch_timeout_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.backend.base_url.clone()));
        }
        if self.backend.episodes_per_page == 0 {
            return Err(ConfigError::NotPositive { field: "backend.episodes_per_page" });
        }
        if self.playback.progress_interval_secs == 0 {
            return Err(ConfigError::NotPositive { field: "playback.progress_interval_secs" });
        }
        if self.playback.controls_hide_secs == 0 {
            return Err(ConfigError::NotPositive { field: "playback.controls_hide_secs" });
        }
        if self.playback.switch_timeout_secs == 0 {
            return Err(ConfigError::NotPositive { field: "playback.switch_timeout_secs" });
        }
        if self.playback.skip_seconds <= 0.0 {
            return Err(ConfigError::NotPositive { field: "playback.skip_seconds" });
        }
        if self.history.max_entries == 0 {
            return Err(ConfigError::NotPositive { field: "history.max_entries" });
        }
        if self.history.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.backend.base_url = "https://stream.example".to_string();
        config.backend.api_token = Some("secret".to_string());
        config.playback.skip_seconds = 15.0;

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.backend.base_url, "https://stream.example");
        assert_eq!(loaded.backend.api_token.as_deref(), Some("secret"));
        assert_eq!(loaded.playback.skip_seconds, 15.0);
        assert_eq!(loaded.history.max_entries, 50);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            base_url = "https://stream.example"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.episodes_per_page, 500);
        assert_eq!(config.playback.progress_interval(), Duration::from_secs(5));
        assert_eq!(config.playback.controls_hide_delay(), Duration::from_secs(3));
        assert_eq!(config.playback.placeholder_progress_secs, 1.0);
        assert_eq!(config.playback.switch_timeout(), Duration::from_secs(15));
        assert_eq!(config.history.storage_key, "watch_history");
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        config.backend.base_url = "ftp://nope".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBaseUrl(_))));

        config.backend.base_url = "http://localhost:8001".to_string();
        assert!(config.validate().is_ok());

        config.history.max_entries = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "history.max_entries" })
        ));

        config.history.max_entries = 50;
        config.playback.switch_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "playback.switch_timeout_secs" })
        ));

        config.playback.switch_timeout_secs = 15;
        config.history.storage_key = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyStorageKey)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.playback.progress_interval_secs, 5);
    }
}
