use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{HttpTransferClient, TomlConfigStore, UuidTaskIdGenerator};
use crate::app::TranscriptionManager;
use crate::domain::config::API_URL_ENV;
use crate::domain::{AppConfig, DomainError, HealthStatus, ModelInfo, TransferError};
use crate::infrastructure::init_logging;
use crate::ports::{ConfigStore, TaskIdGenerator, TransferClient};

/// Process-level bootstrap: configuration, logging and the backend client.
/// Hands out one `TranscriptionManager` per UI session.
pub struct AppController {
    config: RwLock<AppConfig>,
    config_store: Arc<dyn ConfigStore>,
    client: Arc<dyn TransferClient>,
    task_ids: Arc<dyn TaskIdGenerator>,
    base_url: String,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize from the configuration in the OS application directory.
    pub fn new() -> Result<Self, DomainError> {
        let config_store = Arc::new(TomlConfigStore::new()?);
        Self::with_store(config_store)
    }

    /// Initialize from an explicit config store. The backend URL is resolved
    /// here, once, and injected into the transfer client.
    pub fn with_store(config_store: Arc<dyn ConfigStore>) -> Result<Self, DomainError> {
        let config = config_store.load()?;

        let log_guard = init_logging(&config_store.logs_dir(), &config.logging)?;

        info!("Transcriptor starting up");

        let env_override = std::env::var(API_URL_ENV).ok();
        let base_url = config.backend.resolve_base_url(env_override.as_deref());
        let client = HttpTransferClient::with_chunk_size(&base_url, config.upload.chunk_size_bytes())?;

        info!(
            base_url = %base_url,
            desktop = config.backend.desktop,
            "AppController initialized"
        );

        Ok(Self {
            config: RwLock::new(config),
            config_store,
            client: Arc::new(client),
            task_ids: Arc::new(UuidTaskIdGenerator),
            base_url,
            _log_guard: log_guard,
        })
    }

    /// A fresh lifecycle manager seeded with the configured default options.
    pub fn new_session(&self) -> TranscriptionManager {
        let options = self.config.read().transcription.options();
        TranscriptionManager::new(Arc::clone(&self.client), Arc::clone(&self.task_ids), options)
    }

    pub fn config(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Persist a new configuration. Backend and upload settings apply on the
    /// next start; the base URL is resolved only once per process.
    pub fn update_config(&self, config: AppConfig) -> Result<(), DomainError> {
        self.config_store.save(&config)?;
        *self.config.write() = config;

        info!("Configuration updated");
        Ok(())
    }

    /// Backend URL in use for this process.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn available_models(&self) -> ModelInfo {
        self.client.list_models().await
    }

    pub async fn health(&self) -> Result<HealthStatus, TransferError> {
        self.client.health().await
    }

    pub fn data_dir(&self) -> String {
        self.config_store.data_dir().to_string_lossy().to_string()
    }

    pub fn logs_dir(&self) -> String {
        self.config_store.logs_dir().to_string_lossy().to_string()
    }

    pub fn config_path(&self) -> String {
        self.config_store.config_path().to_string_lossy().to_string()
    }
}
