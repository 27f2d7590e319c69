use thiserror::Error;

/// Domain-level errors for Transcriptor.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("A transcription is already in progress")]
    AttemptInProgress,
}

/// Rejection of a selected file before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The selected file is empty")]
    EmptyFile,

    #[error("Unsupported file format for '{name}'. Use: MP3, WAV, FLAC, M4A, OGG, WMA, AAC")]
    UnsupportedFormat { name: String },

    #[error("The file is too large ({size} bytes). Maximum size: 100MB")]
    TooLarge { size: u64, max: u64 },
}

/// Classified failure of a transfer to or from the transcription backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is never empty.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The backend reported the task as cancelled by the user (HTTP 499).
    #[error("Transcription cancelled by the user")]
    Cancelled,

    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl TransferError {
    /// Returns true for the user-initiated cancellation classification.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TransferError::Cancelled)
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
