use serde::{Deserialize, Serialize};

use crate::domain::{Task, TranscriptionOptions, WhisperModel};

/// Environment variable overriding the backend URL outside desktop mode.
pub const API_URL_ENV: &str = "TRANSCRIPTOR_API_URL";

/// Transcription backend location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend URL used in web mode.
    pub base_url: String,
    /// When true, the backend is the local server started by the desktop shell.
    pub desktop: bool,
    /// Backend URL used in desktop mode.
    pub desktop_base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            desktop: false,
            desktop_base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl BackendConfig {
    /// Pick the backend URL. Desktop mode always talks to the local server;
    /// otherwise a non-empty environment override wins over `base_url`.
    pub fn resolve_base_url(&self, env_override: Option<&str>) -> String {
        if self.desktop {
            return self.desktop_base_url.clone();
        }
        env_override
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.base_url.clone())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
        }
    }
}

/// Options a new session starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model: WhisperModel,
    /// Language code (e.g., "en", "es", "auto").
    pub language: String,
    pub task: Task,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        let options = TranscriptionOptions::default();
        Self {
            model: options.model,
            language: options.language,
            task: options.task,
        }
    }
}

impl TranscriptionConfig {
    pub fn options(&self) -> TranscriptionOptions {
        TranscriptionOptions {
            model: self.model,
            language: self.language.clone(),
            task: self.task,
        }
    }
}

/// Upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Size of the chunks the upload is streamed in; one progress event per chunk.
    pub chunk_size_kb: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { chunk_size_kb: 64 }
    }
}

impl UploadConfig {
    pub fn chunk_size_bytes(&self) -> usize {
        self.chunk_size_kb.max(1) as usize * 1024
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    pub transcription: TranscriptionConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    /// Create a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }
}
