use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::{AppConfig, DomainError};
use crate::ports::ConfigStore;

const APP_DIR: &str = "Transcriptor";
const CONFIG_FILE: &str = "config.toml";

/// `config.toml` in the OS application-data directory.
pub struct TomlConfigStore {
    data_dir: PathBuf,
}

impl TomlConfigStore {
    /// Store in the OS-specific application directory:
    /// - macOS: ~/Library/Application Support/Transcriptor/
    /// - Windows: %APPDATA%\Transcriptor\
    /// - Linux: ~/.config/Transcriptor/
    pub fn new() -> Result<Self, DomainError> {
        let base = if cfg!(target_os = "macos") {
            dirs::data_dir()
        } else {
            dirs::config_dir()
        };
        let data_dir = base
            .map(|p| p.join(APP_DIR))
            .ok_or_else(|| DomainError::Config("Could not find application data directory".to_string()))?;

        let store = Self::with_data_dir(data_dir)?;
        info!(data_dir = ?store.data_dir, "ConfigStore initialized");
        Ok(store)
    }

    /// Store rooted at an explicit directory, created if missing.
    pub fn with_data_dir(data_dir: PathBuf) -> Result<Self, DomainError> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AppConfig, DomainError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            info!(path = ?config_path, "Configuration file not found, writing defaults");
            let config = AppConfig::new();
            self.save(&config)?;
            return Ok(config);
        }

        debug!(path = ?config_path, "Loading configuration");
        let content = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&content)?;
        info!(path = ?config_path, "Configuration loaded");
        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<(), DomainError> {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&config_path, toml::to_string_pretty(config)?)?;

        info!(path = ?config_path, "Configuration saved");
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
