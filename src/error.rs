//! Error types for the conversion pipeline

use thiserror::Error;

/// Why a decode attempt failed. Surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeReason {
    UnsupportedContainer(String),
    CorruptData(String),
    NoAudioTrack,
}

impl std::fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedContainer(detail) => {
                write!(f, "unsupported container: {}", detail)
            }
            Self::CorruptData(detail) => write!(f, "corrupt data: {}", detail),
            Self::NoAudioTrack => write!(f, "no audio track"),
        }
    }
}

/// Main error type
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    #[error("decode failed: {reason}")]
    Decode { reason: DecodeReason },

    // Internal renderer failures carry detail for the log, but the
    // user-facing message stays generic.
    #[error("conversion failed")]
    Render { detail: String },

    #[error("encode failed: {message}")]
    Encode { message: String },

    #[error("recorder session error: {message}")]
    Recorder { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("conversion cancelled")]
    Cancelled,
}

impl ConvertError {
    pub fn decode(reason: DecodeReason) -> Self {
        Self::Decode { reason }
    }

    pub fn corrupt<S: Into<String>>(detail: S) -> Self {
        Self::Decode { reason: DecodeReason::CorruptData(detail.into()) }
    }

    pub fn unsupported<S: Into<String>>(detail: S) -> Self {
        Self::Decode { reason: DecodeReason::UnsupportedContainer(detail.into()) }
    }

    pub fn render<S: Into<String>>(detail: S) -> Self {
        Self::Render { detail: detail.into() }
    }

    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode { message: msg.into() }
    }

    pub fn recorder<S: Into<String>>(msg: S) -> Self {
        Self::Recorder { message: msg.into() }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config { message: msg.into() }
    }

    pub fn io<S: Into<String>>(msg: S) -> Self {
        Self::Io { message: msg.into() }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
