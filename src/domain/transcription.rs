use serde::{Deserialize, Serialize};

/// Upload progress of the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadProgress {
    pub bytes_loaded: u64,
    /// 0 when the total is unknown.
    pub bytes_total: u64,
    /// 0-100.
    pub percentage: u8,
}

impl UploadProgress {
    pub fn new(bytes_loaded: u64, bytes_total: u64) -> Self {
        let percentage = if bytes_total == 0 {
            0
        } else {
            let ratio = (bytes_loaded as f64 * 100.0 / bytes_total as f64).round();
            ratio.clamp(0.0, 100.0) as u8
        };
        Self {
            bytes_loaded,
            bytes_total,
            percentage,
        }
    }

    /// Whether the whole payload has been handed to the transport.
    pub fn is_complete(&self) -> bool {
        self.percentage >= 100
    }

    /// True when `next` does not move backwards relative to `self`.
    pub fn precedes(&self, next: &UploadProgress) -> bool {
        next.percentage >= self.percentage && next.bytes_loaded >= self.bytes_loaded
    }
}

/// A time-bounded span of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub seek: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub tokens: Vec<u32>,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub avg_logprob: f64,
    #[serde(default)]
    pub compression_ratio: f64,
    #[serde(default)]
    pub no_speech_prob: f64,
}

/// Transcript returned by the backend on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    /// Detected or requested language code.
    pub language: String,
    /// Audio duration in seconds.
    #[serde(rename = "duration")]
    pub duration_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl TranscriptionResult {
    /// Segments sorted by start time. The backend's order is not trusted.
    pub fn ordered_segments(&self) -> Vec<Segment> {
        let mut segments = self.segments.clone().unwrap_or_default();
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        segments
    }
}

/// Preferred model per use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedModels {
    pub speed: String,
    pub balanced: String,
    pub quality: String,
    pub best: String,
}

/// Model tiers offered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub models: Vec<String>,
    #[serde(alias = "default_model")]
    pub default: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<RecommendedModels>,
}

impl ModelInfo {
    /// List used when the backend cannot tell us what it supports.
    pub fn fallback() -> Self {
        Self {
            models: ["tiny", "base", "small", "medium"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            default: "base".to_string(),
            recommended: None,
        }
    }
}

/// Backend liveness report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}
