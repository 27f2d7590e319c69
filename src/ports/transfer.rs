use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    AudioFile, HealthStatus, ModelInfo, TransferError, TranscriptionOptions, TranscriptionResult,
    UploadProgress,
};

/// Receives upload progress. Called from the transfer task.
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Port for the network exchange with the transcription backend.
///
/// Implementations do not validate the file; callers check it first.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Upload `file` with `options`, correlated by `task_id`, and wait for the
    /// transcript. There is no client-side timeout: the backend may take many
    /// minutes after the upload itself has finished.
    ///
    /// A backend cancellation (HTTP 499) is reported as `TransferError::Cancelled`.
    async fn submit(
        &self,
        file: Arc<AudioFile>,
        options: &TranscriptionOptions,
        task_id: &str,
        on_progress: ProgressCallback,
    ) -> Result<TranscriptionResult, TransferError>;

    /// Ask the backend to stop the job for `task_id`. An empty id is a no-op.
    async fn cancel(&self, task_id: &str) -> Result<(), TransferError>;

    /// Supported model tiers. Never fails: falls back to `ModelInfo::fallback()`.
    async fn list_models(&self) -> ModelInfo;

    /// Backend liveness probe.
    async fn health(&self) -> Result<HealthStatus, TransferError>;
}
