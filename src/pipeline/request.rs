//! Conversion request and result types

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::decoder::MediaInput;
use crate::audio::wav::WAV_MIME_TYPE;

/// Requested output format for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetFormat {
    Wav,
    Other(String),
}

impl TargetFormat {
    /// All WAV MIME spellings normalize to `Wav`.
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_ascii_lowercase().as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Self::Wav,
            _ => Self::Other(mime.to_string()),
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            Self::Wav => WAV_MIME_TYPE,
            Self::Other(mime) => mime,
        }
    }
}

/// One conversion request. Created per caller action, consumed by exactly
/// one pipeline run, discarded afterwards.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input: MediaInput,
    pub target_format: TargetFormat,
}

/// The terminal artifact handed back to the caller. `warning` is set when
/// the requested format was unavailable and WAV was substituted.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub blob: Vec<u8>,
    pub mime_type: String,
    pub suggested_filename: String,
    pub warning: Option<String>,
}

/// Cooperative cancellation flag, checked between pipeline stages. An
/// in-progress record session is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Guess a MIME type from a file extension. Unknown extensions fall back to
/// an opaque binary type; the decoder treats the hint as advisory anyway.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "aac" => "audio/aac",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "aiff" | "aif" => "audio/aiff",
        _ => "application/octet-stream",
    }
}

/// File extension for an output MIME type.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.to_ascii_lowercase().as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => "wav",
        "audio/mpeg" => "mp3",
        "audio/flac" => "flac",
        "audio/ogg" | "application/ogg" => "ogg",
        "audio/mp4" => "m4a",
        "audio/aac" => "aac",
        "audio/webm" | "video/webm" => "webm",
        _ => "bin",
    }
}

/// Derive the suggested output filename from the input's source name (or a
/// neutral stem when the blob is nameless) and the output MIME type.
pub fn suggested_filename(source_name: Option<&str>, mime: &str) -> String {
    let stem = source_name
        .map(|name| {
            let path = Path::new(name);
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("audio")
                .to_string()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "audio".to_string());
    format!("{}.{}", stem, extension_for_mime(mime))
}
