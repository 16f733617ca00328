use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::surface::FrameRGBA;

/// Media type of every artifact this crate produces.
pub const WEBM_MEDIA_TYPE: &str = "video/webm";

/// Stream configuration handed to a [`MediaEncoder`] when recording starts.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Soundtrack muxed into the same output, if any.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for encoders that mux a soundtrack.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Encoded output bytes in emission order.
pub type ChunkReceiver = mpsc::Receiver<Vec<u8>>;

/// Frame-in, chunks-out encoder contract.
///
/// `start` returns the receiving end of the chunk channel. Implementations send encoded bytes
/// as they become available and close the channel once `finish` or `abort` returns.
pub trait MediaEncoder: Send {
    /// Begin a stream. Called once, before any frame.
    fn start(&mut self, cfg: EncoderConfig) -> StudioResult<ChunkReceiver>;
    /// Encode one frame. Indices are strictly increasing.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StudioResult<()>;
    /// Flush and close the stream.
    fn finish(&mut self) -> StudioResult<()>;
    /// Tear down without producing a valid stream. Must be safe to call in any state.
    fn abort(&mut self);
    /// Media type of the concatenated chunks.
    fn media_type(&self) -> &'static str {
        WEBM_MEDIA_TYPE
    }
}

impl<E: MediaEncoder + ?Sized> MediaEncoder for Box<E> {
    fn start(&mut self, cfg: EncoderConfig) -> StudioResult<ChunkReceiver> {
        (**self).start(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StudioResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn finish(&mut self) -> StudioResult<()> {
        (**self).finish()
    }

    fn abort(&mut self) {
        (**self).abort()
    }

    fn media_type(&self) -> &'static str {
        (**self).media_type()
    }
}

/// What an [`InMemoryEncoder`] observed. Shared so callers can inspect it after the encoder has
/// been moved into a recorder.
#[derive(Debug, Default, Clone)]
pub struct EncoderCapture {
    pub config: Option<EncoderConfig>,
    pub frame_count: u64,
    /// Distinct consecutive frame contents, in order.
    pub distinct_frames: Vec<FrameRGBA>,
    pub finished: bool,
    pub aborted: bool,
}

/// Encoder for tests and dry runs: emits a small header chunk, one chunk per frame carrying the
/// little-endian frame index, and a trailer chunk.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    capture: Arc<Mutex<EncoderCapture>>,
    tx: Option<mpsc::Sender<Vec<u8>>>,
}

impl InMemoryEncoder {
    pub const HEADER: &'static [u8] = b"VO3M";
    pub const TRAILER: &'static [u8] = b"END!";

    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the captured state.
    pub fn capture(&self) -> Arc<Mutex<EncoderCapture>> {
        self.capture.clone()
    }

    fn with_capture<R>(&self, f: impl FnOnce(&mut EncoderCapture) -> R) -> StudioResult<R> {
        let mut guard = self
            .capture
            .lock()
            .map_err(|_| StudioError::encode("in-memory encoder capture poisoned"))?;
        Ok(f(&mut guard))
    }

    fn send(&self, bytes: &[u8]) -> StudioResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| StudioError::encode("in-memory encoder not started"))?;
        tx.send(bytes.to_vec())
            .map_err(|_| StudioError::encode("chunk receiver dropped"))
    }
}

impl MediaEncoder for InMemoryEncoder {
    fn start(&mut self, cfg: EncoderConfig) -> StudioResult<ChunkReceiver> {
        let (tx, rx) = mpsc::channel();
        self.tx = Some(tx);
        self.with_capture(|c| {
            *c = EncoderCapture {
                config: Some(cfg),
                ..EncoderCapture::default()
            };
        })?;
        self.send(Self::HEADER)?;
        Ok(rx)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StudioResult<()> {
        self.with_capture(|c| {
            c.frame_count += 1;
            if c.distinct_frames.last() != Some(frame) {
                c.distinct_frames.push(frame.clone());
            }
        })?;
        self.send(&idx.0.to_le_bytes())
    }

    fn finish(&mut self) -> StudioResult<()> {
        self.send(Self::TRAILER)?;
        self.tx = None;
        self.with_capture(|c| c.finished = true)
    }

    fn abort(&mut self) {
        self.tx = None;
        if let Ok(mut c) = self.capture.lock() {
            c.aborted = true;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
