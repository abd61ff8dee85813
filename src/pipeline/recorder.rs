//! Format Fallback Selector and Recorder Session
//!
//! WAV targets go straight to the synchronous WAV writer. Any other target
//! is offered to an external streaming-encoder capability; when none accepts
//! it the pipeline falls back to WAV and attaches a soft warning, so the
//! caller always receives usable output.
//!
//! The streaming path is event-driven across a message-passing boundary:
//! the encoder runs on its own thread and emits `EncoderEvent`s, while the
//! session blocks on the channel and assembles chunks in emission order.
//! State machine: `Idle → Recording → Stopped → Assembled`. The transition
//! to `Stopped` is triggered only by the source signal's natural end, never
//! by a timeout, so the session cannot resolve before the full signal is
//! captured — even if no chunks have arrived yet.

use std::thread;

use crossbeam_channel::Sender;
use log::debug;

use crate::audio::RenderedAudio;
use crate::error::{ConvertError, Result};
use crate::pipeline::request::TargetFormat;

/// Messages emitted by a streaming encoder during a record session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    Started,
    Chunk(Vec<u8>),
    Stopped,
}

/// External streaming-encoder capability. Implementations run on the
/// session's worker thread and must emit `Started`, then any number of
/// `Chunk`s, then exactly one `Stopped` after the source signal ends.
pub trait StreamingEncoder: Send {
    /// Negotiated output MIME type of the encoded blob.
    fn mime_type(&self) -> &str;

    /// Whether this encoder can produce the requested MIME type.
    fn supports(&self, mime: &str) -> bool;

    /// Encode the full signal, reading it block by block, pushing events on
    /// `events`.
    fn encode(
        &mut self,
        audio: &RenderedAudio,
        block_size: usize,
        events: Sender<EncoderEvent>,
    ) -> Result<()>;
}

/// How a target format request will be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodePlan {
    /// WAV writer, synchronous.
    WavDirect,
    /// External streaming encoder accepted the format.
    Stream,
    /// Requested format unavailable; WAV substituted with a warning.
    WavFallback { requested: String },
}

#[derive(Debug, Default)]
pub struct FormatSelector;

impl FormatSelector {
    pub fn plan(target: &TargetFormat, encoder: Option<&dyn StreamingEncoder>) -> EncodePlan {
        match target {
            TargetFormat::Wav => EncodePlan::WavDirect,
            TargetFormat::Other(mime) => match encoder {
                Some(enc) if enc.supports(mime) => EncodePlan::Stream,
                _ => EncodePlan::WavFallback { requested: mime.clone() },
            },
        }
    }

    pub fn fallback_warning(requested: &str) -> String {
        format!(
            "requested format '{}' is not supported by any available encoder; WAV was written instead",
            requested
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Stopped,
    Assembled,
}

/// One record session against an external streaming encoder. Single-use.
#[derive(Debug)]
pub struct RecorderSession {
    state: RecorderState,
    block_size: usize,
}

impl RecorderSession {
    pub fn new(block_size: usize) -> Self {
        Self { state: RecorderState::Idle, block_size: block_size.max(1) }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Re-feed the rendered signal through the encoder and assemble its
    /// chunks. Blocks until the encoder's `Stopped` event; a session that
    /// has started is not cancellable.
    pub fn record(
        &mut self,
        encoder: &mut dyn StreamingEncoder,
        audio: &RenderedAudio,
    ) -> Result<Vec<u8>> {
        if self.state != RecorderState::Idle {
            return Err(ConvertError::recorder("record session is single-use"));
        }

        let (tx, rx) = crossbeam_channel::unbounded();
        let block_size = self.block_size;

        let mut blob = Vec::new();
        let mut chunk_count = 0u64;

        thread::scope(|scope| -> Result<()> {
            let worker = scope.spawn(move || encoder.encode(audio, block_size, tx));

            loop {
                match rx.recv() {
                    Ok(EncoderEvent::Started) => {
                        if self.state != RecorderState::Idle {
                            return Err(ConvertError::recorder("duplicate start event"));
                        }
                        self.state = RecorderState::Recording;
                    }
                    Ok(EncoderEvent::Chunk(chunk)) => {
                        if self.state != RecorderState::Recording {
                            return Err(ConvertError::recorder(
                                "chunk emitted outside recording state",
                            ));
                        }
                        chunk_count += 1;
                        blob.extend_from_slice(&chunk);
                    }
                    Ok(EncoderEvent::Stopped) => {
                        if self.state != RecorderState::Recording {
                            return Err(ConvertError::recorder(
                                "stop event without active recording",
                            ));
                        }
                        self.state = RecorderState::Stopped;
                        break;
                    }
                    // Sender dropped: the encoder returned (or died) without
                    // signalling stop.
                    Err(_) => break,
                }
            }

            let worker_result = worker
                .join()
                .map_err(|_| ConvertError::recorder("encoder thread panicked"))?;
            worker_result?;

            if self.state != RecorderState::Stopped {
                return Err(ConvertError::recorder(
                    "encoder finished without a stop event",
                ));
            }
            Ok(())
        })?;

        self.state = RecorderState::Assembled;
        debug!(
            "record session assembled {} bytes from {} chunks",
            blob.len(),
            chunk_count
        );
        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{DecodedAudio, renderer::OfflineRenderer};
    use ndarray::Array2;

    fn rendered(frames: usize) -> RenderedAudio {
        OfflineRenderer::default()
            .render(DecodedAudio::new(8000, Array2::zeros((frames, 1))).unwrap())
            .unwrap()
    }

    /// Emits one numbered chunk per input block.
    struct CountingEncoder {
        emitted: Vec<u8>,
    }

    impl CountingEncoder {
        fn new() -> Self {
            Self { emitted: Vec::new() }
        }
    }

    impl StreamingEncoder for CountingEncoder {
        fn mime_type(&self) -> &str {
            "audio/ogg"
        }

        fn supports(&self, mime: &str) -> bool {
            mime == "audio/ogg"
        }

        fn encode(
            &mut self,
            audio: &RenderedAudio,
            block_size: usize,
            events: Sender<EncoderEvent>,
        ) -> Result<()> {
            events.send(EncoderEvent::Started).ok();
            let frames = audio.frame_count() as usize;
            let mut index = 0u8;
            let mut offset = 0;
            while offset < frames {
                events.send(EncoderEvent::Chunk(vec![index])).ok();
                self.emitted.push(index);
                index += 1;
                offset += block_size;
            }
            events.send(EncoderEvent::Stopped).ok();
            Ok(())
        }
    }

    struct SilentEncoder;

    impl StreamingEncoder for SilentEncoder {
        fn mime_type(&self) -> &str {
            "audio/ogg"
        }

        fn supports(&self, _mime: &str) -> bool {
            true
        }

        fn encode(
            &mut self,
            _audio: &RenderedAudio,
            _block_size: usize,
            events: Sender<EncoderEvent>,
        ) -> Result<()> {
            events.send(EncoderEvent::Started).ok();
            // No chunks at all; the session must still wait for Stopped.
            std::thread::sleep(std::time::Duration::from_millis(20));
            events.send(EncoderEvent::Stopped).ok();
            Ok(())
        }
    }

    struct NeverStopsEncoder;

    impl StreamingEncoder for NeverStopsEncoder {
        fn mime_type(&self) -> &str {
            "audio/ogg"
        }

        fn supports(&self, _mime: &str) -> bool {
            true
        }

        fn encode(
            &mut self,
            _audio: &RenderedAudio,
            _block_size: usize,
            events: Sender<EncoderEvent>,
        ) -> Result<()> {
            events.send(EncoderEvent::Started).ok();
            events.send(EncoderEvent::Chunk(vec![1, 2, 3])).ok();
            Ok(())
        }
    }

    #[test]
    fn test_chunks_assemble_in_emission_order() {
        let mut encoder = CountingEncoder::new();
        let mut session = RecorderSession::new(100);
        let blob = session.record(&mut encoder, &rendered(450)).unwrap();

        assert_eq!(blob, vec![0, 1, 2, 3, 4]);
        assert_eq!(blob, encoder.emitted);
        assert_eq!(session.state(), RecorderState::Assembled);
    }

    #[test]
    fn test_session_waits_for_stop_with_no_chunks() {
        let mut session = RecorderSession::new(4096);
        let blob = session.record(&mut SilentEncoder, &rendered(10)).unwrap();
        assert!(blob.is_empty());
        assert_eq!(session.state(), RecorderState::Assembled);
    }

    #[test]
    fn test_missing_stop_event_is_an_error() {
        let mut session = RecorderSession::new(4096);
        let err = session.record(&mut NeverStopsEncoder, &rendered(10)).unwrap_err();
        assert!(matches!(err, ConvertError::Recorder { .. }));
    }

    #[test]
    fn test_session_is_single_use() {
        let audio = rendered(10);
        let mut session = RecorderSession::new(4096);
        session.record(&mut SilentEncoder, &audio).unwrap();
        let err = session.record(&mut SilentEncoder, &audio).unwrap_err();
        assert!(matches!(err, ConvertError::Recorder { .. }));
    }

    #[test]
    fn test_plan_selection() {
        let encoder = CountingEncoder::new();

        assert_eq!(
            FormatSelector::plan(&TargetFormat::Wav, Some(&encoder)),
            EncodePlan::WavDirect
        );
        assert_eq!(
            FormatSelector::plan(&TargetFormat::Other("audio/ogg".into()), Some(&encoder)),
            EncodePlan::Stream
        );
        assert_eq!(
            FormatSelector::plan(&TargetFormat::Other("audio/mpeg".into()), Some(&encoder)),
            EncodePlan::WavFallback { requested: "audio/mpeg".into() }
        );
        assert_eq!(
            FormatSelector::plan(&TargetFormat::Other("audio/ogg".into()), None),
            EncodePlan::WavFallback { requested: "audio/ogg".into() }
        );
    }
}
