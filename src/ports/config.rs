use std::path::PathBuf;

use crate::domain::{AppConfig, DomainError};

/// Persistence for the application configuration.
pub trait ConfigStore: Send + Sync {
    /// Read the stored configuration, writing the defaults first when no file exists.
    fn load(&self) -> Result<AppConfig, DomainError>;

    fn save(&self, config: &AppConfig) -> Result<(), DomainError>;

    /// Location of `config.toml`.
    fn config_path(&self) -> PathBuf;

    fn data_dir(&self) -> PathBuf;

    /// Directory the rolling log files are written to.
    fn logs_dir(&self) -> PathBuf;
}
