//! Sample Decoder
//!
//! Turns an opaque media byte buffer into a canonical `DecodedAudio`.
//! Container and codec parsing is delegated to symphonia; the buffer is
//! treated as opaque and only the decoded channel/sample-rate metadata is
//! inspected. Decode failures are terminal for the request and are never
//! retried.

use std::io::Cursor;
use std::sync::Arc;

use log::{debug, warn};
use ndarray::Array2;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::DecodedAudio;
use crate::error::{ConvertError, DecodeReason, Result};

/// Opaque media byte buffer plus its declared MIME/container type.
/// Caller-owned; read once per conversion. The buffer is reference-counted
/// so handing it to the decoder's media stream shares it instead of copying.
#[derive(Debug, Clone)]
pub struct MediaInput {
    pub bytes: Arc<[u8]>,
    pub mime_type: String,
    pub source_name: Option<String>,
}

impl MediaInput {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self { bytes: bytes.into(), mime_type: mime_type.into(), source_name: None }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}

/// Metadata-only inspection result. Sample rate, frame count and duration
/// come from the container header and may be absent for streams that do not
/// declare them; nothing here is invented.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioProbe {
    pub sample_rate: Option<u32>,
    pub channel_count: u32,
    pub frame_count: Option<u64>,
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Default)]
pub struct SampleDecoder;

impl SampleDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode the full audio track into planar f32 sample data.
    pub fn decode(&self, input: &MediaInput) -> Result<DecodedAudio> {
        let mut format_reader = self.probe_container(input)?;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| ConvertError::decode(DecodeReason::NoAudioTrack))?;
        let track_id = track.id;

        let dec_opts = DecoderOptions::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &dec_opts)
            .map_err(|e| ConvertError::unsupported(format!("no codec: {}", e)))?;

        let mut interleaved: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        let mut sample_rate = 0u32;
        let mut channel_count = 0usize;
        let mut skipped_packets = 0u64;

        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(ConvertError::corrupt(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(audio_buf) => {
                    let spec = *audio_buf.spec();
                    if channel_count == 0 {
                        channel_count = spec.channels.count();
                        sample_rate = spec.rate;
                    } else if spec.channels.count() != channel_count || spec.rate != sample_rate {
                        return Err(ConvertError::corrupt(
                            "stream parameters changed mid-track",
                        ));
                    }

                    let needed = audio_buf.frames() * channel_count;
                    let needs_alloc = match &sample_buf {
                        Some(b) => b.capacity() < needed,
                        None => true,
                    };
                    if needs_alloc {
                        sample_buf =
                            Some(SampleBuffer::new(audio_buf.capacity() as u64, spec));
                    }
                    if let Some(buf) = sample_buf.as_mut() {
                        buf.copy_interleaved_ref(audio_buf);
                        interleaved.extend_from_slice(buf.samples());
                    }
                }
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::DecodeError(_)) => {
                    // A malformed packet is skippable; a stream with nothing
                    // but malformed packets is caught below.
                    skipped_packets += 1;
                    continue;
                }
                Err(e) => return Err(ConvertError::corrupt(e.to_string())),
            }
        }

        if skipped_packets > 0 {
            warn!("decoder skipped {} malformed packets", skipped_packets);
        }

        if channel_count == 0 || interleaved.is_empty() {
            return Err(ConvertError::corrupt("no decodable audio frames"));
        }

        let frame_count = interleaved.len() / channel_count;
        let samples = Array2::from_shape_vec((frame_count, channel_count), interleaved)
            .map_err(|e| ConvertError::corrupt(format!("ragged channel data: {}", e)))?;

        debug!(
            "decoded {} frames, {} ch, {} Hz",
            frame_count, channel_count, sample_rate
        );

        DecodedAudio::new(sample_rate, samples)
    }

    /// Inspect container metadata without decoding sample data.
    pub fn probe(&self, input: &MediaInput) -> Result<AudioProbe> {
        let format_reader = self.probe_container(input)?;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| ConvertError::decode(DecodeReason::NoAudioTrack))?;

        let params = &track.codec_params;
        let sample_rate = params.sample_rate;
        let channel_count = params
            .channels
            .map(|ch| ch.count() as u32)
            .ok_or_else(|| ConvertError::corrupt("missing channel metadata"))?;
        let frame_count = params.n_frames;
        let duration_seconds = match (frame_count, sample_rate) {
            (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
            _ => None,
        };

        Ok(AudioProbe { sample_rate, channel_count, frame_count, duration_seconds })
    }

    fn probe_container(
        &self,
        input: &MediaInput,
    ) -> Result<Box<dyn symphonia::core::formats::FormatReader>> {
        if input.bytes.is_empty() {
            return Err(ConvertError::corrupt("empty input buffer"));
        }

        let mss = MediaSourceStream::new(
            Box::new(Cursor::new(Arc::clone(&input.bytes))),
            Default::default(),
        );

        // The input blob carries no filename; the declared MIME type is the
        // only probe hint available.
        let mut hint = Hint::new();
        if !input.mime_type.is_empty() {
            hint.mime_type(&input.mime_type);
        }

        let meta_opts = MetadataOptions::default();
        let fmt_opts = FormatOptions::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|e| ConvertError::unsupported(e.to_string()))?;

        Ok(probed.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{PcmBuffer, WavWriter};

    fn wav_bytes(sample_rate: u32, channels: u32, samples: Vec<i16>) -> Vec<u8> {
        let pcm = PcmBuffer {
            channel_count: channels,
            sample_rate,
            interleaved_samples: samples,
        };
        WavWriter::new().write(&pcm).unwrap()
    }

    #[test]
    fn test_decode_own_wav_output() {
        let bytes = wav_bytes(8000, 1, vec![0, 16384, -16384, -32768]);
        let input = MediaInput::new(bytes, "audio/wav");
        let audio = SampleDecoder::new().decode(&input).unwrap();

        assert_eq!(audio.sample_rate(), 8000);
        assert_eq!(audio.channel_count(), 1);
        assert_eq!(audio.frame_count(), 4);
        assert!((audio.samples()[[1, 0]] - 0.5).abs() < 1e-4);
        assert!((audio.samples()[[3, 0]] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_stereo_preserves_channel_order() {
        // Left ramps up, right stays silent.
        let bytes = wav_bytes(44100, 2, vec![100, 0, 200, 0, 300, 0]);
        let input = MediaInput::new(bytes, "audio/wav");
        let audio = SampleDecoder::new().decode(&input).unwrap();

        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.frame_count(), 3);
        assert!(audio.samples()[[2, 0]] > audio.samples()[[0, 0]]);
        for frame in 0..3 {
            assert_eq!(audio.samples()[[frame, 1]], 0.0);
        }
    }

    #[test]
    fn test_input_buffer_is_shared_not_copied() {
        let input = MediaInput::new(wav_bytes(8000, 1, vec![0i16; 16]), "audio/wav");
        let alias = input.clone();
        assert!(Arc::ptr_eq(&input.bytes, &alias.bytes));

        // Decoding reads through the shared buffer and releases its handle.
        SampleDecoder::new().decode(&alias).unwrap();
        assert_eq!(Arc::strong_count(&input.bytes), 2);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let input = MediaInput::new(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01], "audio/wav");
        let err = SampleDecoder::new().decode(&input).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }));
    }

    #[test]
    fn test_decode_empty_buffer_fails() {
        let input = MediaInput::new(Vec::new(), "audio/wav");
        let err = SampleDecoder::new().decode(&input).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Decode { reason: DecodeReason::CorruptData(_) }
        ));
    }

    #[test]
    fn test_probe_reports_metadata() {
        let bytes = wav_bytes(16000, 2, vec![0i16; 32000]);
        let input = MediaInput::new(bytes, "audio/wav");
        let probe = SampleDecoder::new().probe(&input).unwrap();

        assert_eq!(probe.sample_rate, Some(16000));
        assert_eq!(probe.channel_count, 2);
        assert_eq!(probe.frame_count, Some(16000));
        assert!((probe.duration_seconds.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_probe_duration_requires_declared_metadata() {
        // A duration is only reported when both frame count and sample rate
        // come from the container; neither is ever substituted.
        let bytes = wav_bytes(16000, 1, vec![0i16; 16]);
        let probe = SampleDecoder::new()
            .probe(&MediaInput::new(bytes, "audio/wav"))
            .unwrap();
        assert!(probe.sample_rate.is_some());
        assert_eq!(
            probe.duration_seconds.is_some(),
            probe.sample_rate.is_some() && probe.frame_count.is_some()
        );
    }
}
