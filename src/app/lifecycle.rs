use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::{
    AttemptSnapshot, AttemptState, AudioFile, DomainError, ModelInfo, ProgressUpdate,
    TransferError, TranscriptionAttempt, TranscriptionEvent, TranscriptionOptions,
    TranscriptionResult, UploadProgress,
};
use crate::ports::{ProgressCallback, TaskIdGenerator, TransferClient};

const EVENT_CAPACITY: usize = 64;

/// How a started attempt ended, from the point of view of `start`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Completed(TranscriptionResult),
    Failed(String),
    /// The backend reported the task cancelled; the manager is idle again.
    Cancelled,
    /// The attempt was cancelled or replaced before the backend answered;
    /// the response was dropped.
    Discarded,
}

/// Owns one transcription attempt and drives it through its lifecycle.
///
/// Clones share the same attempt. Every asynchronous completion is matched
/// against the active task id before it is applied, so a response for a
/// cancelled attempt never overwrites newer state.
#[derive(Clone)]
pub struct TranscriptionManager {
    client: Arc<dyn TransferClient>,
    task_ids: Arc<dyn TaskIdGenerator>,
    attempt: Arc<Mutex<TranscriptionAttempt>>,
    events: broadcast::Sender<TranscriptionEvent>,
}

impl TranscriptionManager {
    pub fn new(
        client: Arc<dyn TransferClient>,
        task_ids: Arc<dyn TaskIdGenerator>,
        options: TranscriptionOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            task_ids,
            attempt: Arc::new(Mutex::new(TranscriptionAttempt::new(options))),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> AttemptSnapshot {
        AttemptSnapshot::from(&*self.attempt.lock())
    }

    pub fn state(&self) -> AttemptState {
        self.attempt.lock().state()
    }

    pub fn is_transcribing(&self) -> bool {
        self.state().is_transcribing()
    }

    /// Change the options used by the next attempt.
    pub fn set_options(&self, options: TranscriptionOptions) -> Result<(), DomainError> {
        let mut attempt = self.attempt.lock();
        if attempt.state().is_transcribing() {
            return Err(DomainError::AttemptInProgress);
        }
        if options.is_discouraged() {
            warn!(model = %options.model, "Model is not recommended for translation");
        }
        attempt.set_options(options);
        Ok(())
    }

    /// Validate and store the file for the next attempt. A rejected file is
    /// not stored and its message is kept as the validation error.
    pub fn select_file(&self, file: AudioFile) -> Result<(), DomainError> {
        let mut attempt = self.attempt.lock();
        if attempt.state().is_transcribing() {
            return Err(DomainError::AttemptInProgress);
        }

        if let Err(err) = file.validate() {
            warn!(file = file.name(), bytes = file.size(), error = %err, "Selected file rejected");
            attempt.reject_file(err.to_string());
            return Err(err.into());
        }

        info!(file = file.name(), bytes = file.size(), "Audio file selected");
        let from = attempt.select_file(Arc::new(file));
        self.emit_transition(from, attempt.state());
        Ok(())
    }

    pub fn remove_file(&self) -> Result<(), DomainError> {
        self.reset("Selected file removed")
    }

    /// Discard file, result and error to begin a new transcription.
    pub fn new_transcription(&self) -> Result<(), DomainError> {
        self.reset("Ready for a new transcription")
    }

    fn reset(&self, reason: &str) -> Result<(), DomainError> {
        let mut attempt = self.attempt.lock();
        if attempt.state().is_transcribing() {
            return Err(DomainError::AttemptInProgress);
        }
        let from = attempt.clear();
        self.emit_transition(from, AttemptState::Idle);
        info!("{}", reason);
        Ok(())
    }

    /// Run one attempt to completion.
    ///
    /// Returns `None` without touching the network when no file is selected or
    /// an attempt is already in flight.
    pub async fn start(&self) -> Option<AttemptOutcome> {
        let (file, options, task_id) = {
            let mut attempt = self.attempt.lock();
            if !attempt.state().can_start() {
                warn!(state = ?attempt.state(), "Transcription already in progress, ignoring start");
                return None;
            }
            let Some(file) = attempt.file().cloned() else {
                warn!("No file selected, ignoring start");
                return None;
            };

            let task_id = self.task_ids.generate();
            let from = attempt.begin(task_id.clone());
            self.emit_transition(from, AttemptState::Uploading);
            (file, attempt.options().clone(), task_id)
        };

        info!(
            task_id = %task_id,
            model = %options.model,
            estimated_minutes = options.model.estimated_processing_minutes(),
            "Transcription started"
        );

        let on_progress = self.progress_callback(task_id.clone());
        let outcome = self.client.submit(file, &options, &task_id, on_progress).await;
        Some(self.settle(&task_id, outcome))
    }

    fn progress_callback(&self, task_id: String) -> ProgressCallback {
        let attempt = Arc::clone(&self.attempt);
        let events = self.events.clone();

        Arc::new(move |progress: UploadProgress| {
            let update = attempt.lock().apply_progress(&task_id, progress);
            match update {
                ProgressUpdate::Ignored => {}
                ProgressUpdate::Recorded => {
                    let _ = events.send(TranscriptionEvent::Progress(progress));
                }
                ProgressUpdate::UploadComplete => {
                    let _ = events.send(TranscriptionEvent::Progress(progress));
                    let _ = events.send(TranscriptionEvent::StateChanged {
                        from: AttemptState::Uploading,
                        to: AttemptState::AwaitingResult,
                    });
                    info!(
                        task_id = %task_id,
                        bytes = progress.bytes_total,
                        "Upload complete, awaiting transcription"
                    );
                }
            }
        })
    }

    fn settle(
        &self,
        task_id: &str,
        outcome: Result<TranscriptionResult, TransferError>,
    ) -> AttemptOutcome {
        let mut attempt = self.attempt.lock();
        if !attempt.is_active(task_id) {
            debug!(task_id = task_id, "Dropping response for an attempt that is no longer active");
            return AttemptOutcome::Discarded;
        }

        match outcome {
            Ok(result) => {
                let from = attempt.complete(result.clone());
                self.emit_transition(from, AttemptState::Completed);
                self.emit(TranscriptionEvent::Completed {
                    task_id: task_id.to_string(),
                    characters: result.text.chars().count(),
                });
                info!(task_id = task_id, chars = result.text.len(), "Transcription completed");
                AttemptOutcome::Completed(result)
            }
            Err(err) if err.is_cancellation() => {
                let from = attempt.recover_cancelled();
                self.emit_transition(from, AttemptState::Idle);
                info!(task_id = task_id, "Transcription cancelled by the backend");
                AttemptOutcome::Cancelled
            }
            Err(err) => {
                let message = err.to_string();
                let from = attempt.fail(message.clone());
                self.emit_transition(from, AttemptState::Failed);
                self.emit(TranscriptionEvent::Failed {
                    message: message.clone(),
                });
                warn!(task_id = task_id, error = %err, "Transcription failed");
                AttemptOutcome::Failed(message)
            }
        }
    }

    /// Cancel the attempt in flight.
    ///
    /// The attempt always ends up idle, whether or not the backend acknowledges
    /// the cancellation. Returns false, without any request, when nothing is in flight.
    pub async fn cancel(&self) -> bool {
        let (task_id, generation) = {
            let mut attempt = self.attempt.lock();
            let from = attempt.state();
            let Some(task_id) = attempt.mark_cancelled() else {
                warn!(state = ?from, "No active task to cancel");
                return false;
            };
            self.emit_transition(from, AttemptState::Cancelled);
            (task_id, attempt.generation())
        };

        info!(task_id = %task_id, "Cancelling transcription");
        if let Err(err) = self.client.cancel(&task_id).await {
            warn!(task_id = %task_id, error = %err, "Cancellation request failed, resetting locally");
        }

        let mut attempt = self.attempt.lock();
        if attempt.finish_cancel(generation) {
            self.emit_transition(AttemptState::Cancelled, AttemptState::Idle);
        }
        self.emit(TranscriptionEvent::Cancelled { task_id });
        true
    }

    /// Model tiers for the options selector.
    pub async fn available_models(&self) -> ModelInfo {
        self.client.list_models().await
    }

    fn emit(&self, event: TranscriptionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn emit_transition(&self, from: AttemptState, to: AttemptState) {
        if from != to {
            debug!(?from, ?to, "Attempt state changed");
            self.emit(TranscriptionEvent::StateChanged { from, to });
        }
    }
}
