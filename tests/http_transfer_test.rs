use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use transcriptor::{
    AudioFile, HttpTransferClient, ModelInfo, ProgressCallback, Task, TransferClient,
    TransferError, TranscriptionOptions, UploadProgress, WhisperModel,
};

async fn start_mock_backend(app: Router) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

/// Base URL nothing is listening on.
async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn transcribe_route(status: StatusCode, body: serde_json::Value, captured: Arc<Mutex<Vec<u8>>>) -> Router {
    Router::new().route(
        "/api/v1/transcribe",
        post(move |payload: Bytes| {
            let captured = captured.clone();
            let body = body.clone();
            async move {
                *captured.lock().unwrap() = payload.to_vec();
                (status, Json(body))
            }
        }),
    )
}

fn recording_progress() -> (ProgressCallback, Arc<Mutex<Vec<UploadProgress>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ProgressCallback = Arc::new(move |progress| sink.lock().unwrap().push(progress));
    (callback, seen)
}

fn mp3(size: usize) -> Arc<AudioFile> {
    Arc::new(AudioFile::new("audio.mp3", Some("audio/mpeg".to_string()), vec![7u8; size]))
}

#[tokio::test]
async fn given_backend_accepts_upload_when_submitting_then_returns_transcript() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = transcribe_route(
        StatusCode::OK,
        json!({
            "text": "hola mundo",
            "language": "es",
            "duration": 12.3,
            "task_id": "task-abc",
            "segments": [{"id": 0, "seek": 0, "start": 0.0, "end": 12.3, "text": "hola mundo"}]
        }),
        captured.clone(),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::with_chunk_size(&base_url, 64 * 1024).unwrap();
    let options = TranscriptionOptions {
        model: WhisperModel::Small,
        language: "auto".to_string(),
        task: Task::Transcribe,
    };
    let (on_progress, seen) = recording_progress();

    let result = client
        .submit(mp3(200 * 1024), &options, "task-abc", on_progress)
        .await
        .unwrap();

    assert_eq!(result.text, "hola mundo");
    assert_eq!(result.language, "es");
    assert_eq!(result.ordered_segments().len(), 1);

    let body = String::from_utf8_lossy(&captured.lock().unwrap()).to_string();
    assert!(body.contains("name=\"file\"; filename=\"audio.mp3\""));
    assert!(body.contains("name=\"task_id\"\r\n\r\ntask-abc"));
    assert!(body.contains("name=\"model\"\r\n\r\nsmall"));
    assert!(body.contains("name=\"task\"\r\n\r\ntranscribe"));
    assert!(!body.contains("name=\"language\""));

    let progress = seen.lock().unwrap().clone();
    assert_eq!(progress.len(), 4);
    assert!(progress.windows(2).all(|w| w[0].percentage <= w[1].percentage));
    let last = progress.last().unwrap();
    assert_eq!(last.percentage, 100);
    assert_eq!(last.bytes_loaded, 200 * 1024);
    assert_eq!(last.bytes_total, 200 * 1024);

    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_explicit_language_when_submitting_then_language_field_is_sent() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = transcribe_route(
        StatusCode::OK,
        json!({"text": "hello", "language": "en", "duration": 1.0}),
        captured.clone(),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();
    let options = TranscriptionOptions {
        model: WhisperModel::Turbo,
        language: "es".to_string(),
        task: Task::Translate,
    };
    let (on_progress, _) = recording_progress();

    client
        .submit(mp3(1024), &options, "task-lang", on_progress)
        .await
        .unwrap();

    let body = String::from_utf8_lossy(&captured.lock().unwrap()).to_string();
    assert!(body.contains("name=\"language\"\r\n\r\nes"));
    assert!(body.contains("name=\"task\"\r\n\r\ntranslate"));
    assert!(body.contains("name=\"model\"\r\n\r\nturbo"));

    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_backend_returns_499_when_submitting_then_returns_cancelled() {
    let status = StatusCode::from_u16(499).unwrap();
    let app = transcribe_route(
        status,
        json!({"detail": "Transcripción cancelada"}),
        Arc::new(Mutex::new(Vec::new())),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();
    let (on_progress, _) = recording_progress();

    let result = client
        .submit(mp3(1024), &TranscriptionOptions::default(), "task-x", on_progress)
        .await;

    assert_eq!(result, Err(TransferError::Cancelled));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_backend_error_with_detail_when_submitting_then_message_is_extracted() {
    let app = transcribe_route(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"detail": "Error interno: modelo no disponible"}),
        Arc::new(Mutex::new(Vec::new())),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();
    let (on_progress, _) = recording_progress();

    let result = client
        .submit(mp3(1024), &TranscriptionOptions::default(), "task-x", on_progress)
        .await;

    assert_eq!(
        result,
        Err(TransferError::Backend {
            status: 500,
            message: "Error interno: modelo no disponible".to_string(),
        })
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_backend_error_without_body_when_submitting_then_status_text_is_used() {
    let app = Router::new().route(
        "/api/v1/transcribe",
        post(|_payload: Bytes| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();
    let (on_progress, _) = recording_progress();

    let result = client
        .submit(mp3(1024), &TranscriptionOptions::default(), "task-x", on_progress)
        .await;

    assert_eq!(
        result,
        Err(TransferError::Backend {
            status: 503,
            message: "Service Unavailable".to_string(),
        })
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_malformed_success_body_when_submitting_then_returns_invalid_response() {
    let app = Router::new().route(
        "/api/v1/transcribe",
        post(|_payload: Bytes| async { (StatusCode::OK, "not json") }),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();
    let (on_progress, _) = recording_progress();

    let result = client
        .submit(mp3(1024), &TranscriptionOptions::default(), "task-x", on_progress)
        .await;

    assert!(matches!(result, Err(TransferError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unreachable_backend_when_submitting_then_returns_network_error() {
    let client = HttpTransferClient::new(&unreachable_base_url().await).unwrap();
    let (on_progress, _) = recording_progress();

    let result = client
        .submit(mp3(1024), &TranscriptionOptions::default(), "task-x", on_progress)
        .await;

    assert!(matches!(result, Err(TransferError::Network(_))));
}

#[tokio::test]
async fn given_task_id_when_cancelling_then_delete_is_sent_for_that_task() {
    let cancelled = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorder = cancelled.clone();
    let app = Router::new().route(
        "/api/v1/transcribe/:task_id",
        delete(move |Path(task_id): Path<String>| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(task_id);
                Json(json!({"message": "cancelled"}))
            }
        }),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();

    client.cancel("task-123").await.unwrap();
    client.cancel("").await.unwrap();

    assert_eq!(*cancelled.lock().unwrap(), vec!["task-123".to_string()]);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unknown_task_when_cancelling_then_returns_backend_error() {
    let app = Router::new().route(
        "/api/v1/transcribe/:task_id",
        delete(|| async { (StatusCode::NOT_FOUND, Json(json!({"detail": "Tarea no encontrada"}))) }),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();

    let result = client.cancel("missing").await;

    assert!(matches!(result, Err(TransferError::Backend { status: 404, .. })));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_models_endpoint_when_listing_then_returns_backend_models() {
    let app = Router::new().route(
        "/api/v1/models",
        get(|| async {
            Json(json!({
                "models": ["tiny", "base", "small", "medium", "large", "turbo"],
                "default": "base",
                "recommended": {
                    "speed": "tiny",
                    "balanced": "base",
                    "quality": "small",
                    "best": "medium"
                }
            }))
        }),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();

    let info = client.list_models().await;

    assert_eq!(info.models.len(), 6);
    assert_eq!(info.default, "base");
    assert_eq!(info.recommended.map(|r| r.quality), Some("small".to_string()));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_models_endpoint_missing_when_listing_then_returns_fallback() {
    let (base_url, shutdown_tx) = start_mock_backend(Router::new()).await;

    let client = HttpTransferClient::new(&base_url).unwrap();

    assert_eq!(client.list_models().await, ModelInfo::fallback());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unreachable_backend_when_listing_models_then_returns_fallback() {
    let client = HttpTransferClient::new(&unreachable_base_url().await).unwrap();

    let info = client.list_models().await;

    assert_eq!(info.models, vec!["tiny", "base", "small", "medium"]);
    assert_eq!(info.default, "base");
}

#[tokio::test]
async fn given_healthy_backend_when_probing_then_returns_status() {
    let app = Router::new().route(
        "/api/v1/health",
        get(|| async {
            Json(json!({"status": "healthy", "whisper_available": true, "device": "cpu"}))
        }),
    );
    let (base_url, shutdown_tx) = start_mock_backend(app).await;

    let client = HttpTransferClient::new(&base_url).unwrap();

    let health = client.health().await.unwrap();

    assert!(health.is_healthy());
    assert_eq!(health.details["device"], "cpu");
    shutdown_tx.send(()).ok();
}
