use std::sync::Arc;

use serde::Serialize;

use crate::domain::{AudioFile, TranscriptionOptions, TranscriptionResult, UploadProgress};

/// Transcription attempt state machine.
///
/// State transitions:
/// - Idle -> Idle (select_file / remove_file)
/// - Idle | Completed | Failed -> Uploading (start, requires a file)
/// - Uploading -> AwaitingResult (upload progress reaches 100%)
/// - Uploading | AwaitingResult -> Completed (backend returned a transcript)
/// - Uploading | AwaitingResult -> Failed (any error except cancellation)
/// - Uploading | AwaitingResult -> Idle (backend reported the task cancelled)
/// - Uploading | AwaitingResult -> Cancelled -> Idle (user cancel)
/// - Completed | Failed -> Idle (new transcription)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AttemptState {
    #[default]
    Idle,
    /// Sending the file to the backend.
    Uploading,
    /// Upload finished; the backend is transcribing.
    AwaitingResult,
    Completed,
    Failed,
    /// User cancelled; waiting for the cancellation request to settle.
    Cancelled,
}

impl AttemptState {
    /// Whether network operations for an attempt are in flight.
    #[must_use]
    pub fn is_transcribing(&self) -> bool {
        matches!(self, AttemptState::Uploading | AttemptState::AwaitingResult)
    }

    /// Whether a new attempt may be started from this state.
    #[must_use]
    pub fn can_start(&self) -> bool {
        !self.is_transcribing()
    }

    /// Whether the user may cancel from this state.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.is_transcribing()
    }
}

/// Result of feeding a progress event to the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Stale task id or backwards progress.
    Ignored,
    Recorded,
    /// Recorded, and the attempt moved to `AwaitingResult`.
    UploadComplete,
}

/// The single attempt owned by a lifecycle manager.
///
/// `task_id` is set only while the state is `Uploading` or `AwaitingResult`.
#[derive(Debug, Default)]
pub struct TranscriptionAttempt {
    state: AttemptState,
    file: Option<Arc<AudioFile>>,
    options: TranscriptionOptions,
    task_id: Option<String>,
    progress: Option<UploadProgress>,
    result: Option<TranscriptionResult>,
    error: Option<String>,
    validation_error: Option<String>,
    generation: u64,
}

impl TranscriptionAttempt {
    pub fn new(options: TranscriptionOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn file(&self) -> Option<&Arc<AudioFile>> {
        self.file.as_ref()
    }

    pub fn options(&self) -> &TranscriptionOptions {
        &self.options
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn progress(&self) -> Option<UploadProgress> {
        self.progress
    }

    pub fn result(&self) -> Option<&TranscriptionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Incremented every time an attempt starts.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `task_id` identifies the attempt currently in flight.
    pub fn is_active(&self, task_id: &str) -> bool {
        self.task_id.as_deref() == Some(task_id)
    }

    fn set_state(&mut self, state: AttemptState) -> AttemptState {
        std::mem::replace(&mut self.state, state)
    }

    pub fn set_options(&mut self, options: TranscriptionOptions) {
        self.options = options;
    }

    /// Store a validated file and drop any previous outcome.
    pub fn select_file(&mut self, file: Arc<AudioFile>) -> AttemptState {
        self.file = Some(file);
        self.result = None;
        self.error = None;
        self.validation_error = None;
        self.set_state(AttemptState::Idle)
    }

    pub fn reject_file(&mut self, message: String) {
        self.validation_error = Some(message);
    }

    /// Clear the file and everything derived from it.
    pub fn clear(&mut self) -> AttemptState {
        self.file = None;
        self.task_id = None;
        self.progress = None;
        self.result = None;
        self.error = None;
        self.validation_error = None;
        self.set_state(AttemptState::Idle)
    }

    /// Enter `Uploading` under a fresh task id.
    pub fn begin(&mut self, task_id: String) -> AttemptState {
        self.generation += 1;
        self.task_id = Some(task_id);
        self.progress = Some(UploadProgress::default());
        self.result = None;
        self.error = None;
        self.validation_error = None;
        self.set_state(AttemptState::Uploading)
    }

    pub fn apply_progress(&mut self, task_id: &str, progress: UploadProgress) -> ProgressUpdate {
        if !self.is_active(task_id) {
            return ProgressUpdate::Ignored;
        }
        let current = self.progress.unwrap_or_default();
        if !current.precedes(&progress) {
            return ProgressUpdate::Ignored;
        }
        self.progress = Some(progress);

        if progress.is_complete() && self.state() == AttemptState::Uploading {
            self.set_state(AttemptState::AwaitingResult);
            ProgressUpdate::UploadComplete
        } else {
            ProgressUpdate::Recorded
        }
    }

    pub fn complete(&mut self, result: TranscriptionResult) -> AttemptState {
        self.task_id = None;
        self.progress = None;
        self.error = None;
        self.result = Some(result);
        self.set_state(AttemptState::Completed)
    }

    pub fn fail(&mut self, message: String) -> AttemptState {
        self.task_id = None;
        self.progress = None;
        self.error = Some(message);
        self.set_state(AttemptState::Failed)
    }

    /// Backend reported the task cancelled: return silently to `Idle`.
    pub fn recover_cancelled(&mut self) -> AttemptState {
        self.task_id = None;
        self.progress = None;
        self.error = None;
        self.set_state(AttemptState::Idle)
    }

    /// User cancel. Releases the task id so late completions are discarded,
    /// and returns it for the cancellation request. `None` when nothing is in flight.
    pub fn mark_cancelled(&mut self) -> Option<String> {
        if !self.state().can_cancel() {
            return None;
        }
        let task_id = self.task_id.take()?;
        self.progress = None;
        self.result = None;
        self.error = None;
        self.set_state(AttemptState::Cancelled);
        Some(task_id)
    }

    /// Settle a user cancel started under `generation`. Returns false when a
    /// newer attempt has started in the meantime.
    pub fn finish_cancel(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.state() != AttemptState::Cancelled {
            return false;
        }
        self.set_state(AttemptState::Idle);
        true
    }
}

/// Serializable view of an attempt for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptSnapshot {
    pub state: AttemptState,
    pub is_transcribing: bool,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub options: TranscriptionOptions,
    pub task_id: Option<String>,
    pub progress: Option<UploadProgress>,
    pub result: Option<TranscriptionResult>,
    pub error: Option<String>,
    pub validation_error: Option<String>,
}

impl From<&TranscriptionAttempt> for AttemptSnapshot {
    fn from(attempt: &TranscriptionAttempt) -> Self {
        Self {
            state: attempt.state(),
            is_transcribing: attempt.state().is_transcribing(),
            file_name: attempt.file().map(|f| f.name().to_string()),
            file_size: attempt.file().map(|f| f.size()),
            options: attempt.options.clone(),
            task_id: attempt.task_id.clone(),
            progress: attempt.progress,
            result: attempt.result.clone(),
            error: attempt.error.clone(),
            validation_error: attempt.validation_error.clone(),
        }
    }
}

/// Events published by the lifecycle manager.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum TranscriptionEvent {
    StateChanged {
        from: AttemptState,
        to: AttemptState,
    },
    Progress(UploadProgress),
    Completed {
        task_id: String,
        characters: usize,
    },
    Failed {
        message: String,
    },
    Cancelled {
        task_id: String,
    },
}
