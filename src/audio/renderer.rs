//! Offline Renderer
//!
//! Re-runs the decoded signal through a non-real-time, block-based render
//! pass. The output depends only on the input samples, never on wall-clock
//! timing or device buffer sizes, so repeated runs on the same input are
//! byte-for-byte identical. Channel count and sample rate pass through
//! unchanged; no resampling or mixing happens here.

use log::{debug, warn};
use ndarray::{Array2, s};

use crate::audio::{DecodedAudio, RenderedAudio};
use crate::error::{ConvertError, Result};

pub const DEFAULT_BLOCK_SIZE: usize = 4096;

#[derive(Debug, Clone)]
pub struct OfflineRenderer {
    block_size: usize,
}

impl Default for OfflineRenderer {
    fn default() -> Self {
        Self { block_size: DEFAULT_BLOCK_SIZE }
    }
}

impl OfflineRenderer {
    pub fn new(block_size: usize) -> Self {
        Self { block_size: block_size.max(1) }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Render the full signal in fixed-size blocks.
    pub fn render(&self, decoded: DecodedAudio) -> Result<RenderedAudio> {
        let frames = decoded.frame_count() as usize;
        let channels = decoded.channel_count() as usize;
        let src = decoded.samples();

        let mut out = Array2::<f32>::zeros((frames, channels));
        let mut non_finite = 0u64;

        let mut offset = 0;
        while offset < frames {
            let end = (offset + self.block_size).min(frames);
            let block = src.slice(s![offset..end, ..]);
            non_finite += block.iter().filter(|v| !v.is_finite()).count() as u64;
            out.slice_mut(s![offset..end, ..]).assign(&block);
            offset = end;
        }

        if non_finite > 0 {
            warn!(
                "render pass saw {} non-finite samples; they quantize to silence",
                non_finite
            );
        }

        if out.dim() != src.dim() {
            return Err(ConvertError::render(format!(
                "rendered shape {:?} does not match source shape {:?}",
                out.dim(),
                src.dim()
            )));
        }

        debug!("rendered {} frames in blocks of {}", frames, self.block_size);
        Ok(RenderedAudio::new(decoded.sample_rate(), out))
    }
}
