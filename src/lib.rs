//! Client-side lifecycle for uploading audio to a Whisper transcription
//! backend: file validation, cancellable uploads with progress, and the
//! attempt state machine the presentation layer renders.

#![forbid(unsafe_code)]

pub mod adapters;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use adapters::{generate_task_id, HttpTransferClient, TomlConfigStore, UuidTaskIdGenerator};
pub use app::{AppController, AttemptOutcome, TranscriptionManager};
pub use domain::{
    AppConfig, AttemptSnapshot, AttemptState, AudioFile, DomainError, HealthStatus, ModelInfo,
    Segment, Task, TransferError, TranscriptionEvent, TranscriptionOptions, TranscriptionResult,
    UploadProgress, ValidationError, WhisperModel,
};
pub use ports::{ConfigStore, ProgressCallback, TaskIdGenerator, TransferClient};
