//! Conversion Pipeline
//!
//! Request/response types, the end-to-end converter, and the event-driven
//! record session used when a non-WAV target format is delegated to an
//! external streaming encoder.

pub mod converter;
pub mod recorder;
pub mod request;

pub use converter::{ConversionStats, MediaConverter};
pub use recorder::{EncoderEvent, FormatSelector, RecorderSession, RecorderState, StreamingEncoder};
pub use request::{CancelToken, ConversionOutput, ConversionRequest, TargetFormat};

pub use crate::audio::decoder::MediaInput;
