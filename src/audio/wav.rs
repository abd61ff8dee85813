//! WAV Container Writer
//!
//! Serializes a `PcmBuffer` into a canonical RIFF/WAVE byte sequence with
//! the fixed 44-byte header, little-endian throughout:
//!
//! ```text
//! "RIFF" | 36 + dataSize | "WAVE"
//! "fmt " | 16 | 1 (PCM) | channels | rate | byteRate | blockAlign | 16
//! "data" | dataSize | interleaved i16 samples
//! ```
//!
//! No compression; this is the reference encoder every format fallback
//! ultimately reduces to.

use crate::audio::PcmBuffer;
use crate::error::{ConvertError, Result};

pub const WAV_MIME_TYPE: &str = "audio/wav";
pub const HEADER_SIZE: usize = 44;

#[derive(Debug, Default)]
pub struct WavWriter;

impl WavWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, pcm: &PcmBuffer) -> Result<Vec<u8>> {
        pcm.validate()?;

        // Every derived header field must fit its slot; the products are
        // computed in u64 so an oversized buffer is rejected instead of
        // wrapping into a wrong header.
        let block_align = pcm.channel_count as u64 * PcmBuffer::BYTES_PER_SAMPLE as u64;
        if block_align > u16::MAX as u64 {
            return Err(ConvertError::encode(format!(
                "channel count {} exceeds WAV block alignment",
                pcm.channel_count
            )));
        }

        let byte_rate = pcm.sample_rate as u64 * block_align;
        if byte_rate > u32::MAX as u64 {
            return Err(ConvertError::encode(format!(
                "byte rate {} does not fit the WAV header",
                byte_rate
            )));
        }

        let data_size = pcm.data_size();
        if data_size > (u32::MAX - 36) as u64 {
            return Err(ConvertError::encode(format!(
                "PCM payload of {} bytes does not fit a RIFF chunk",
                data_size
            )));
        }
        let data_size = data_size as u32;

        let num_channels = pcm.channel_count as u16;
        let bits_per_sample: u16 = 16;
        let byte_rate = byte_rate as u32;
        let block_align = block_align as u16;

        let mut buf = Vec::with_capacity(HEADER_SIZE + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt sub-chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&pcm.sample_rate.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data sub-chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in &pcm.interleaved_samples {
            buf.extend_from_slice(&s.to_le_bytes());
        }

        Ok(buf)
    }
}
