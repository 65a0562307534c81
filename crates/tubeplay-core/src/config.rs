//! Application configuration management.
//!
//! Handles loading, saving, and managing application-wide settings: the
//! `YouTube` Data API credential and endpoint, and the player defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::player::{DEFAULT_VOLUME, PlayerOptions};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Default `YouTube` Data API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default timeout for metadata requests.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// `YouTube` Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YouTubeApiConfig {
    /// API key used for metadata lookups.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the Data API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for YouTubeApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl YouTubeApiConfig {
    /// The API key, if set and not blank.
    #[must_use]
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Player defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Volume the player starts with.
    #[serde(default = "default_volume")]
    pub initial_volume: i32,
    /// Options passed to the embedded widget.
    #[serde(default)]
    pub options: PlayerOptions,
}

const fn default_volume() -> i32 {
    DEFAULT_VOLUME
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: DEFAULT_VOLUME,
            options: PlayerOptions::default(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Metadata lookup settings.
    #[serde(default)]
    pub youtube: YouTubeApiConfig,
    /// Player settings.
    #[serde(default)]
    pub player: PlayerConfig,
}

impl AppConfig {
    /// Load configuration from the default location, or create defaults if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific file, writing defaults if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                warn!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config file: {e}")))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
    }

    /// Replace the API key when the override is present and not blank.
    pub fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            debug!("Using API key from {}", API_KEY_ENV);
            self.youtube.api_key = Some(key);
        }
    }

    /// Get the path to the default config file.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        config_file_path()
    }
}

/// Get the path to the config file.
fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("tubeplay")
        .join("config.json")
}

/// Configuration manager that handles loading and caching config.
pub struct ConfigManager {
    config: AppConfig,
    path: PathBuf,
}

impl ConfigManager {
    /// Load config from the default location and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded.
    pub fn new() -> Result<Self> {
        Self::with_path(config_file_path())
    }

    /// Load config from a specific file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        let mut config = AppConfig::load_from(&path)?;
        config.apply_env_overrides();
        Ok(Self { config, path })
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Path the configuration is read from and saved to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the configuration and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be saved.
    pub fn update(&mut self, config: AppConfig) -> Result<()> {
        self.config = config;
        self.config.save_to(&self.path)
    }

    /// Reset to default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be saved.
    pub fn reset(&mut self) -> Result<()> {
        self.update(AppConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.player.initial_volume, 70);
        assert_eq!(config.youtube.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.youtube.api_key.is_none());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{"youtube":{"api_key":"abc"}}"#;
        let config: AppConfig = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(config.youtube.api_key.as_deref(), Some("abc"));
        assert_eq!(config.youtube.timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn test_effective_api_key_ignores_blank() {
        let mut api = YouTubeApiConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(api.effective_api_key(), None);

        api.api_key = Some(" key ".to_string());
        assert_eq!(api.effective_api_key(), Some("key"));
    }

    #[test]
    fn test_load_missing_file_writes_defaults() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("nested").join("config.json");

        let config = AppConfig::load_from(&path).expect("Should load");
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.youtube.api_key = Some("secret".to_string());
        config.player.initial_volume = 40;
        config.save_to(&path).expect("Should save");

        let loaded = AppConfig::load_from(&path).expect("Should load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_json_is_configuration_error() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("Should write");

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_api_key_override() {
        let mut config = AppConfig::default();
        config.youtube.api_key = Some("from-file".to_string());

        config.apply_api_key_override(Some(String::new()));
        assert_eq!(config.youtube.api_key.as_deref(), Some("from-file"));

        config.apply_api_key_override(None);
        assert_eq!(config.youtube.api_key.as_deref(), Some("from-file"));

        config.apply_api_key_override(Some("from-env".to_string()));
        assert_eq!(config.youtube.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_config_manager_update_persists() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("config.json");
        let mut manager = ConfigManager::with_path(path.clone()).expect("Should create");

        let mut config = manager.config().clone();
        config.player.initial_volume = 25;
        manager.update(config).expect("Should update");

        let loaded = AppConfig::load_from(&path).expect("Should load");
        assert_eq!(loaded.player.initial_volume, 25);

        manager.reset().expect("Should reset");
        assert_eq!(manager.config().player.initial_volume, 70);
        assert_eq!(manager.path(), path.as_path());
    }

    #[test]
    fn test_config_file_path_uses_correct_name() {
        let path = AppConfig::config_file_path();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "config.json");
        assert!(path.to_string_lossy().contains("tubeplay"));
    }
}
