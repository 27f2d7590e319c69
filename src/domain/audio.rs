use std::path::Path;

use zeroize::Zeroize;

use crate::domain::{DomainError, ValidationError};

/// Largest file accepted for upload (100 MB).
pub const MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Extensions accepted regardless of the declared MIME type.
pub const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "wav", "flac", "m4a", "ogg", "wma", "aac"];

/// Declared MIME types accepted regardless of the file name.
pub const AUDIO_MIME_TYPES: [&str; 8] = [
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/flac",
    "audio/m4a",
    "audio/ogg",
    "audio/wma",
    "audio/aac",
];

/// A user-selected audio file held in memory until it is uploaded.
/// The contents are zeroed on drop.
#[derive(Debug, Zeroize)]
#[zeroize(drop)]
pub struct AudioFile {
    name: String,
    mime_type: Option<String>,
    data: Vec<u8>,
}

impl AudioFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type,
            data,
        }
    }

    /// Read a file from disk, inferring the MIME type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, DomainError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::Io(format!("Invalid file name: {}", path.display())))?
            .to_string();
        let data = tokio::fs::read(path).await?;
        let mime_type = mime_for_name(&name).map(str::to_string);
        Ok(Self::new(name, mime_type, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// MIME type to declare on upload.
    pub fn upload_mime_type(&self) -> &str {
        self.mime_type()
            .or_else(|| mime_for_name(&self.name))
            .unwrap_or("application/octet-stream")
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the file looks like audio, by MIME type or extension.
    pub fn is_audio(&self) -> bool {
        is_audio_file(&self.name, self.mime_type())
    }

    /// Check the file against the upload constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_audio_file(&self.name, self.mime_type(), self.size())
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// MIME type for an accepted audio extension.
pub fn mime_for_name(name: &str) -> Option<&'static str> {
    let mime = match extension_of(name)?.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/m4a",
        "ogg" => "audio/ogg",
        "wma" => "audio/wma",
        "aac" => "audio/aac",
        _ => return None,
    };
    Some(mime)
}

pub fn is_audio_file(name: &str, mime_type: Option<&str>) -> bool {
    let mime_ok = mime_type
        .map(|m| AUDIO_MIME_TYPES.contains(&m.trim().to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    let extension_ok = extension_of(name)
        .map(|e| AUDIO_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false);
    mime_ok || extension_ok
}

/// Validate a file before it is accepted for transcription.
pub fn validate_audio_file(
    name: &str,
    mime_type: Option<&str>,
    size: u64,
) -> Result<(), ValidationError> {
    if !is_audio_file(name, mime_type) {
        return Err(ValidationError::UnsupportedFormat {
            name: name.to_string(),
        });
    }
    if size == 0 {
        return Err(ValidationError::EmptyFile);
    }
    if size > MAX_FILE_SIZE_BYTES {
        return Err(ValidationError::TooLarge {
            size,
            max: MAX_FILE_SIZE_BYTES,
        });
    }
    Ok(())
}

/// Human-readable size, e.g. "1.5 MB".
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Duration as `m:ss`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
