//! End-to-end conversion pipeline
//!
//! Single flow per request: decode → offline render → quantize → encode.
//! All intermediate buffers are owned by the one running conversion and
//! dropped once the output blob exists; concurrent requests each get their
//! own converter state.

use std::time::Instant;

use log::{debug, info, warn};

use crate::audio::decoder::{AudioProbe, MediaInput, SampleDecoder};
use crate::audio::wav::WAV_MIME_TYPE;
use crate::audio::{OfflineRenderer, PcmQuantizer, WavWriter};
use crate::config::Config;
use crate::error::{ConvertError, Result};
use crate::pipeline::recorder::{EncodePlan, FormatSelector, RecorderSession, StreamingEncoder};
use crate::pipeline::request::{
    CancelToken, ConversionOutput, ConversionRequest, suggested_filename,
};

/// Wall-time breakdown of one conversion.
#[derive(Debug, Clone)]
pub struct ConversionStats {
    pub decode_seconds: f64,
    pub render_seconds: f64,
    pub encode_seconds: f64,
    pub input_duration_seconds: f64,
    pub real_time_factor: f64,
}

pub struct MediaConverter {
    config: Config,
    decoder: SampleDecoder,
    renderer: OfflineRenderer,
    quantizer: PcmQuantizer,
    wav_writer: WavWriter,
    encoder: Option<Box<dyn StreamingEncoder>>,
}

impl MediaConverter {
    pub fn new(config: Config) -> Self {
        let renderer = OfflineRenderer::new(config.block_size());
        Self {
            config,
            decoder: SampleDecoder::new(),
            renderer,
            quantizer: PcmQuantizer::new(),
            wav_writer: WavWriter::new(),
            encoder: None,
        }
    }

    /// Register an external streaming-encoder capability for non-WAV
    /// targets.
    pub fn with_encoder(mut self, encoder: Box<dyn StreamingEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Inspect input metadata without converting.
    pub fn probe(&self, input: &MediaInput) -> Result<AudioProbe> {
        self.decoder.probe(input)
    }

    pub fn convert(&mut self, request: ConversionRequest) -> Result<ConversionOutput> {
        let (output, _) = self.convert_detailed(request, &CancelToken::new())?;
        Ok(output)
    }

    pub fn convert_with_cancel(
        &mut self,
        request: ConversionRequest,
        token: &CancelToken,
    ) -> Result<ConversionOutput> {
        let (output, _) = self.convert_detailed(request, token)?;
        Ok(output)
    }

    /// Run one request end-to-end, returning the output blob and timing
    /// stats. The token is checked between stages only; once a streaming
    /// record session starts it runs to completion.
    pub fn convert_detailed(
        &mut self,
        request: ConversionRequest,
        token: &CancelToken,
    ) -> Result<(ConversionOutput, ConversionStats)> {
        let ConversionRequest { input, target_format } = request;
        let source_name = input.source_name.clone();

        if token.is_cancelled() {
            return Err(ConvertError::Cancelled);
        }
        let decode_start = Instant::now();
        let decoded = self.decoder.decode(&input)?;
        // The input blob is read exactly once.
        drop(input);
        let decode_seconds = decode_start.elapsed().as_secs_f64();
        let input_duration_seconds = decoded.duration_seconds();
        debug!(
            "decoded: {:.2}s, {} Hz, {} ch",
            input_duration_seconds,
            decoded.sample_rate(),
            decoded.channel_count()
        );

        if token.is_cancelled() {
            return Err(ConvertError::Cancelled);
        }
        let render_start = Instant::now();
        let rendered = self.renderer.render(decoded)?;
        let render_seconds = render_start.elapsed().as_secs_f64();

        if token.is_cancelled() {
            return Err(ConvertError::Cancelled);
        }
        let encode_start = Instant::now();
        let plan = FormatSelector::plan(&target_format, self.encoder.as_deref());
        let (blob, mime_type, warning) = match plan {
            EncodePlan::WavDirect => {
                let pcm = self.quantizer.quantize(&rendered)?;
                let blob = self.wav_writer.write(&pcm)?;
                (blob, WAV_MIME_TYPE.to_string(), None)
            }
            EncodePlan::Stream => {
                let encoder = self
                    .encoder
                    .as_deref_mut()
                    .ok_or_else(|| ConvertError::recorder("encoder capability vanished"))?;
                let mime = encoder.mime_type().to_string();
                let mut session = RecorderSession::new(self.config.block_size());
                let blob = session.record(encoder, &rendered)?;
                (blob, mime, None)
            }
            EncodePlan::WavFallback { requested } => {
                let warning = FormatSelector::fallback_warning(&requested);
                warn!("{}", warning);
                let pcm = self.quantizer.quantize(&rendered)?;
                let blob = self.wav_writer.write(&pcm)?;
                (blob, WAV_MIME_TYPE.to_string(), Some(warning))
            }
        };
        let encode_seconds = encode_start.elapsed().as_secs_f64();

        let total = decode_seconds + render_seconds + encode_seconds;
        let real_time_factor = if input_duration_seconds > 0.0 {
            total / input_duration_seconds
        } else {
            0.0
        };
        let stats = ConversionStats {
            decode_seconds,
            render_seconds,
            encode_seconds,
            input_duration_seconds,
            real_time_factor,
        };
        info!(
            "conversion done: {} bytes as {}, RTF {:.3}",
            blob.len(),
            mime_type,
            real_time_factor
        );

        let suggested = suggested_filename(source_name.as_deref(), &mime_type);
        let output = ConversionOutput {
            blob,
            mime_type,
            suggested_filename: suggested,
            warning,
        };
        Ok((output, stats))
    }
}
