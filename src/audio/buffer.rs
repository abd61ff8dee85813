//! Canonical in-memory audio representations
//!
//! All multi-channel sample data is held as an `Array2<f32>` with shape
//! `(frame_count, channel_count)`. Row-major layout means iterating the
//! array yields frame-major (interleaved) order, and the "every channel has
//! exactly frame_count samples" invariant holds by construction.

use ndarray::Array2;

use crate::error::{ConvertError, Result};

/// Decoded audio as produced by the sample decoder. Never mutated after
/// decode; consumed by the offline renderer.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    sample_rate: u32,
    samples: Array2<f32>,
}

impl DecodedAudio {
    pub fn new(sample_rate: u32, samples: Array2<f32>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ConvertError::corrupt("sample rate cannot be 0"));
        }
        if samples.ncols() == 0 {
            return Err(ConvertError::corrupt("channel count cannot be 0"));
        }
        if samples.nrows() == 0 {
            return Err(ConvertError::corrupt("no decoded frames"));
        }
        Ok(Self { sample_rate, samples })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u32 {
        self.samples.ncols() as u32
    }

    pub fn frame_count(&self) -> u64 {
        self.samples.nrows() as u64
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }
}

/// The final, playback-order-independent signal produced by the offline
/// renderer. Same shape as the decoded input; produced once, consumed once
/// by the quantizer.
#[derive(Debug, Clone)]
pub struct RenderedAudio {
    sample_rate: u32,
    samples: Array2<f32>,
}

impl RenderedAudio {
    pub(crate) fn new(sample_rate: u32, samples: Array2<f32>) -> Self {
        Self { sample_rate, samples }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u32 {
        self.samples.ncols() as u32
    }

    pub fn frame_count(&self) -> u64 {
        self.samples.nrows() as u64
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }
}

/// Quantized, frame-major interleaved 16-bit PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    pub channel_count: u32,
    pub sample_rate: u32,
    pub interleaved_samples: Vec<i16>,
}

impl PcmBuffer {
    pub const BYTES_PER_SAMPLE: u32 = 2;

    pub fn frame_count(&self) -> u64 {
        self.interleaved_samples.len() as u64 / self.channel_count as u64
    }

    /// Size of the raw PCM payload in bytes.
    pub fn data_size(&self) -> u64 {
        self.interleaved_samples.len() as u64 * Self::BYTES_PER_SAMPLE as u64
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel_count == 0 {
            return Err(ConvertError::encode("PCM buffer has 0 channels"));
        }
        if self.sample_rate == 0 {
            return Err(ConvertError::encode("PCM buffer has 0 sample rate"));
        }
        if self.interleaved_samples.len() as u64 % self.channel_count as u64 != 0 {
            return Err(ConvertError::encode(format!(
                "interleaved sample count {} is not a multiple of channel count {}",
                self.interleaved_samples.len(),
                self.channel_count
            )));
        }
        Ok(())
    }
}
