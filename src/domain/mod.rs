pub mod attempt;
pub mod audio;
pub mod config;
pub mod error;
pub mod options;
pub mod transcription;

pub use attempt::{
    AttemptSnapshot, AttemptState, ProgressUpdate, TranscriptionAttempt, TranscriptionEvent,
};
pub use audio::{format_duration, format_file_size, validate_audio_file, AudioFile};
pub use config::AppConfig;
pub use error::{DomainError, TransferError, ValidationError};
pub use options::{Task, TranscriptionOptions, WhisperModel};
pub use transcription::{
    HealthStatus, ModelInfo, RecommendedModels, Segment, TranscriptionResult, UploadProgress,
};
