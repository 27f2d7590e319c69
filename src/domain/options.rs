use serde::{Deserialize, Serialize};

/// Language value that lets the backend detect the spoken language.
pub const AUTO_LANGUAGE: &str = "auto";

/// Quality/speed tier of the backend's Whisper engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WhisperModel {
    #[serde(rename = "tiny")]
    Tiny,
    #[default]
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "large-v1")]
    LargeV1,
    #[serde(rename = "large-v2")]
    LargeV2,
    #[serde(rename = "large-v3")]
    LargeV3,
    #[serde(rename = "large")]
    Large,
    #[serde(rename = "turbo")]
    Turbo,
}

impl WhisperModel {
    pub const ALL: [WhisperModel; 9] = [
        WhisperModel::Tiny,
        WhisperModel::Base,
        WhisperModel::Small,
        WhisperModel::Medium,
        WhisperModel::LargeV1,
        WhisperModel::LargeV2,
        WhisperModel::LargeV3,
        WhisperModel::Large,
        WhisperModel::Turbo,
    ];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Small => "small",
            WhisperModel::Medium => "medium",
            WhisperModel::LargeV1 => "large-v1",
            WhisperModel::LargeV2 => "large-v2",
            WhisperModel::LargeV3 => "large-v3",
            WhisperModel::Large => "large",
            WhisperModel::Turbo => "turbo",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Expected server-side processing time in minutes.
    pub fn estimated_processing_minutes(&self) -> u32 {
        match self {
            WhisperModel::Tiny => 3,
            WhisperModel::Base => 5,
            WhisperModel::Small => 8,
            WhisperModel::Medium => 12,
            WhisperModel::LargeV1 => 16,
            WhisperModel::LargeV2 => 18,
            WhisperModel::LargeV3 => 20,
            WhisperModel::Large => 22,
            WhisperModel::Turbo => 10,
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the backend should produce from the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    #[default]
    Transcribe,
    /// Translate the speech to English.
    Translate,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Transcribe => "transcribe",
            Task::Translate => "translate",
        }
    }
}

/// Options sent along with the audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionOptions {
    pub model: WhisperModel,
    /// ISO 639-1 code, or "auto" for detection.
    pub language: String,
    pub task: Task,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            model: WhisperModel::Base,
            language: AUTO_LANGUAGE.to_string(),
            task: Task::Transcribe,
        }
    }
}

impl TranscriptionOptions {
    /// Language to send to the backend, `None` when it should auto-detect.
    pub fn explicit_language(&self) -> Option<&str> {
        let language = self.language.trim();
        if language.is_empty() || language.eq_ignore_ascii_case(AUTO_LANGUAGE) {
            None
        } else {
            Some(language)
        }
    }

    /// Turbo is not trained for translation; the combination is allowed but
    /// should be flagged to the user.
    #[must_use]
    pub fn is_discouraged(&self) -> bool {
        self.model == WhisperModel::Turbo && self.task == Task::Translate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = TranscriptionOptions::default();
        assert_eq!(options.model, WhisperModel::Base);
        assert_eq!(options.language, "auto");
        assert_eq!(options.task, Task::Transcribe);
        assert!(options.explicit_language().is_none());
    }

    #[test]
    fn test_explicit_language() {
        let options = TranscriptionOptions {
            language: "es".to_string(),
            ..Default::default()
        };
        assert_eq!(options.explicit_language(), Some("es"));

        let empty = TranscriptionOptions {
            language: "".to_string(),
            ..Default::default()
        };
        assert!(empty.explicit_language().is_none());
    }

    #[test]
    fn test_turbo_translate_is_discouraged() {
        let options = TranscriptionOptions {
            model: WhisperModel::Turbo,
            task: Task::Translate,
            ..Default::default()
        };
        assert!(options.is_discouraged());

        let transcribe = TranscriptionOptions {
            model: WhisperModel::Turbo,
            ..Default::default()
        };
        assert!(!transcribe.is_discouraged());
    }

    #[test]
    fn test_model_names() {
        for model in WhisperModel::ALL {
            assert_eq!(WhisperModel::from_name(model.as_str()), Some(model));
        }
        assert_eq!(WhisperModel::from_name("LARGE-V3"), Some(WhisperModel::LargeV3));
        assert_eq!(WhisperModel::from_name("huge"), None);
    }

    #[test]
    fn test_model_serde_uses_wire_names() {
        let json = serde_json::to_string(&WhisperModel::LargeV2).unwrap();
        assert_eq!(json, "\"large-v2\"");
        let task: Task = serde_json::from_str("\"translate\"").unwrap();
        assert_eq!(task, Task::Translate);
    }

    #[test]
    fn test_estimated_processing_minutes() {
        assert_eq!(WhisperModel::Tiny.estimated_processing_minutes(), 3);
        assert_eq!(WhisperModel::Large.estimated_processing_minutes(), 22);
        assert_eq!(WhisperModel::Turbo.estimated_processing_minutes(), 10);
    }
}
