//! PCM Quantizer
//!
//! Converts rendered f32 samples in [-1.0, 1.0] into frame-major interleaved
//! signed 16-bit integers. Signed 16-bit is asymmetric ([-32768, 32767]), so
//! negative samples scale by 0x8000 and non-negative by 0x7FFF; a single
//! symmetric factor would either clip +1.0 or waste negative headroom.
//! Non-finite input samples quantize to silence.

use rayon::prelude::*;

use crate::audio::{PcmBuffer, RenderedAudio};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct PcmQuantizer;

impl PcmQuantizer {
    pub fn new() -> Self {
        Self
    }

    /// Quantize and interleave. Deterministic: the same input always yields
    /// a bit-identical `PcmBuffer`.
    pub fn quantize(&self, rendered: &RenderedAudio) -> Result<PcmBuffer> {
        let samples = rendered.samples();

        // Row-major (frame, channel) layout means the flat slice is already
        // in interleave order.
        let interleaved_samples: Vec<i16> = match samples.as_slice() {
            Some(flat) => flat.par_iter().map(|&s| quantize_sample(s)).collect(),
            None => samples.iter().map(|&s| quantize_sample(s)).collect(),
        };

        let pcm = PcmBuffer {
            channel_count: rendered.channel_count(),
            sample_rate: rendered.sample_rate(),
            interleaved_samples,
        };
        pcm.validate()?;
        Ok(pcm)
    }
}

#[inline]
pub fn quantize_sample(s: f32) -> i16 {
    let s = if s.is_finite() { s } else { 0.0 };
    let c = s.clamp(-1.0, 1.0);
    if c < 0.0 {
        (c * 32768.0).round() as i16
    } else {
        (c * 32767.0).round() as i16
    }
}
