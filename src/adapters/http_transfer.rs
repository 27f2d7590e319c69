use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{
    AudioFile, DomainError, HealthStatus, ModelInfo, TransferError, TranscriptionOptions,
    TranscriptionResult, UploadProgress,
};
use crate::ports::{ProgressCallback, TransferClient};

/// Status the backend answers with when the task was cancelled by the user.
pub const CANCELLED_STATUS: u16 = 499;

/// Default upload chunk size (one progress event per chunk).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Transfer client speaking the backend's `/api/v1` HTTP contract.
pub struct HttpTransferClient {
    client: Client,
    api_base: Url,
    chunk_size: usize,
}

impl HttpTransferClient {
    /// Create a client for the backend rooted at `base_url`
    /// (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> Result<Self, DomainError> {
        Self::with_chunk_size(base_url, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(base_url: &str, chunk_size: usize) -> Result<Self, DomainError> {
        let mut api_base = Url::parse(base_url.trim())
            .map_err(|e| DomainError::Config(format!("Invalid backend URL '{}': {}", base_url, e)))?;

        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(DomainError::Config(format!(
                "Unsupported backend URL scheme '{}'",
                api_base.scheme()
            )));
        }

        api_base
            .path_segments_mut()
            .map_err(|_| DomainError::Config(format!("Backend URL '{}' cannot be a base", base_url)))?
            .pop_if_empty()
            .extend(["api", "v1"]);

        // No request timeout: transcription jobs run for many minutes.
        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("Transcriptor/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::HttpRequest(format!("Failed to create HTTP client: {}", e)))?;

        info!(api_base = %api_base, chunk_size = chunk_size, "HttpTransferClient initialized");

        Ok(Self {
            client,
            api_base,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Root of the versioned API, e.g. `http://localhost:8000/api/v1`.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Stream the file in chunks, reporting progress as each chunk is handed
    /// to the transport.
    fn upload_body(file: Arc<AudioFile>, chunk_size: usize, on_progress: ProgressCallback) -> Body {
        let len = file.data().len();
        let total = len as u64;

        let chunks = futures_util::stream::iter((0..len).step_by(chunk_size)).map(move |start| {
            let end = (start + chunk_size).min(len);
            let chunk = file.data()[start..end].to_vec();
            on_progress(UploadProgress::new(end as u64, total));
            Ok::<_, std::io::Error>(chunk)
        });

        Body::wrap_stream(chunks)
    }

    fn build_form(
        &self,
        file: Arc<AudioFile>,
        options: &TranscriptionOptions,
        task_id: &str,
        on_progress: ProgressCallback,
    ) -> Result<Form, TransferError> {
        let file_name = file.name().to_string();
        let mime = file.upload_mime_type().to_string();
        let size = file.size();

        let part = Part::stream_with_length(Self::upload_body(file, self.chunk_size, on_progress), size)
            .file_name(file_name)
            .mime_str(&mime)
            .map_err(|e| TransferError::Network(format!("Invalid MIME type '{}': {}", mime, e)))?;

        let mut form = Form::new()
            .part("file", part)
            .text("model", options.model.as_str())
            .text("task", options.task.as_str());

        if let Some(language) = options.explicit_language() {
            form = form.text("language", language.to_string());
        }
        if !task_id.is_empty() {
            form = form.text("task_id", task_id.to_string());
        }

        Ok(form)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, TransferError> {
        let url = self.endpoint(segments);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| TransferError::InvalidResponse(e.to_string()))
    }

    async fn fetch_models(&self) -> Result<ModelInfo, TransferError> {
        let info: ModelInfo = self.get_json(&["models"]).await?;
        if info.models.is_empty() {
            return Err(TransferError::InvalidResponse(
                "Backend returned no models".to_string(),
            ));
        }
        Ok(info)
    }
}

#[async_trait]
impl TransferClient for HttpTransferClient {
    async fn submit(
        &self,
        file: Arc<AudioFile>,
        options: &TranscriptionOptions,
        task_id: &str,
        on_progress: ProgressCallback,
    ) -> Result<TranscriptionResult, TransferError> {
        let url = self.endpoint(&["transcribe"]);
        let file_name = file.name().to_string();
        let size = file.size();
        let form = self.build_form(file, options, task_id, on_progress)?;

        info!(
            task_id = task_id,
            file = %file_name,
            bytes = size,
            model = %options.model,
            task = options.task.as_str(),
            "Submitting transcription"
        );

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == CANCELLED_STATUS {
            info!(task_id = task_id, "Backend reported transcription cancelled");
            return Err(TransferError::Cancelled);
        }
        if !status.is_success() {
            let err = backend_error(response).await;
            warn!(task_id = task_id, status = status.as_u16(), error = %err, "Transcription request failed");
            return Err(err);
        }

        let result: TranscriptionResult = response
            .json()
            .await
            .map_err(|e| TransferError::InvalidResponse(e.to_string()))?;

        info!(
            task_id = task_id,
            chars = result.text.len(),
            language = %result.language,
            "Transcription received"
        );
        Ok(result)
    }

    async fn cancel(&self, task_id: &str) -> Result<(), TransferError> {
        let task_id = task_id.trim();
        if task_id.is_empty() {
            debug!("No task id given, skipping cancellation request");
            return Ok(());
        }

        let url = self.endpoint(&["transcribe", task_id]);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        info!(task_id = task_id, "Cancellation request acknowledged");
        Ok(())
    }

    async fn list_models(&self) -> ModelInfo {
        match self.fetch_models().await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "Model listing unavailable, using fallback list");
                ModelInfo::fallback()
            }
        }
    }

    async fn health(&self) -> Result<HealthStatus, TransferError> {
        self.get_json(&["health"]).await
    }
}

async fn backend_error(response: Response) -> TransferError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    TransferError::Backend {
        status: status.as_u16(),
        message: error_message(status, &body),
    }
}

/// Message from a `{detail}` or `{error}` body, else the status reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    let extracted = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "error"].iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(|field| field.as_str())
                    .map(str::trim)
                    .filter(|message| !message.is_empty())
                    .map(str::to_string)
            })
        });

    extracted
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
