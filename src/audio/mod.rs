//! Audio Pipeline Stages
//!
//! Canonical sample buffers plus the four processing stages: container
//! decoding, offline rendering, PCM quantization, and WAV serialization.

pub mod buffer;
pub mod decoder;
pub mod quantizer;
pub mod renderer;
pub mod wav;

pub use buffer::{DecodedAudio, PcmBuffer, RenderedAudio};
pub use decoder::{AudioProbe, SampleDecoder};
pub use quantizer::PcmQuantizer;
pub use renderer::OfflineRenderer;
pub use wav::WavWriter;
