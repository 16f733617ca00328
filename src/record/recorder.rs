use crate::artifact::OutputArtifact;
use crate::encode::sink::{ChunkReceiver, EncoderConfig, MediaEncoder};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::surface::FrameRGBA;

/// Upper bound on buffered encoded bytes for one render.
pub const MAX_CHUNK_BUFFER_BYTES: usize = 1 << 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecorderState {
    Idle,
    Recording,
    /// Terminal: the artifact was produced.
    Stopped,
    /// Terminal: aborted, buffered chunks discarded.
    Failed,
}

impl RecorderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        })
    }
}

/// Drives a [`MediaEncoder`] and collects its chunks in emission order.
///
/// Dropping a recorder that is still recording aborts it.
pub struct Recorder<E: MediaEncoder> {
    encoder: E,
    state: RecorderState,
    rx: Option<ChunkReceiver>,
    chunks: Vec<Vec<u8>>,
    buffered: usize,
    max_buffered: usize,
    fps: Fps,
    frames: u64,
}

impl<E: MediaEncoder> std::fmt::Debug for Recorder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("state", &self.state)
            .field("chunks", &self.chunks.len())
            .field("buffered", &self.buffered)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl<E: MediaEncoder> Recorder<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            state: RecorderState::Idle,
            rx: None,
            chunks: Vec::new(),
            buffered: 0,
            max_buffered: MAX_CHUNK_BUFFER_BYTES,
            fps: Fps::CAPTURE,
            frames: 0,
        }
    }

    /// Override the chunk buffer bound.
    pub fn with_buffer_limit(mut self, max_bytes: usize) -> Self {
        self.max_buffered = max_bytes;
        self
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn frames_pushed(&self) -> u64 {
        self.frames
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffered
    }

    /// `Idle → Recording`.
    pub fn start(&mut self, cfg: EncoderConfig) -> StudioResult<()> {
        self.expect_state(RecorderState::Idle, "start")?;
        let fps = cfg.fps;
        match self.encoder.start(cfg) {
            Ok(rx) => {
                self.rx = Some(rx);
                self.fps = fps;
                self.state = RecorderState::Recording;
                tracing::debug!("recorder started");
                Ok(())
            }
            Err(e) => {
                self.abort();
                Err(e)
            }
        }
    }

    /// Encode one frame and collect whatever the encoder has emitted so far.
    pub fn push_frame(&mut self, frame: &FrameRGBA) -> StudioResult<()> {
        self.expect_state(RecorderState::Recording, "push_frame")?;
        let idx = FrameIndex(self.frames);
        let res = self
            .encoder
            .push_frame(idx, frame)
            .and_then(|()| self.drain_available());
        if let Err(e) = res {
            self.abort();
            return Err(e);
        }
        self.frames += 1;
        Ok(())
    }

    /// `Recording → Stopped`: finish the encoder and concatenate every chunk in order.
    pub fn stop(&mut self) -> StudioResult<OutputArtifact> {
        self.expect_state(RecorderState::Recording, "stop")?;
        let res = self
            .encoder
            .finish()
            .and_then(|()| self.drain_available());
        if let Err(e) = res {
            self.abort();
            return Err(e);
        }
        self.rx = None;

        let mut bytes = Vec::with_capacity(self.buffered);
        for chunk in self.chunks.drain(..) {
            bytes.extend_from_slice(&chunk);
        }
        self.buffered = 0;
        self.state = RecorderState::Stopped;

        let artifact = OutputArtifact {
            bytes,
            media_type: self.encoder.media_type().to_owned(),
            frame_count: self.frames,
            fps: self.fps,
            duration_secs: self.fps.frames_to_secs(self.frames),
        };
        tracing::debug!(
            bytes = artifact.bytes.len(),
            frames = artifact.frame_count,
            "recorder stopped"
        );
        Ok(artifact)
    }

    /// Move to `Failed`, tearing down the encoder and discarding buffered chunks.
    ///
    /// No-op once the recorder is `Stopped` or `Failed`.
    pub fn abort(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.encoder.abort();
        self.rx = None;
        self.chunks.clear();
        self.buffered = 0;
        if self.state == RecorderState::Recording {
            tracing::debug!(frames = self.frames, "recorder aborted");
        }
        self.state = RecorderState::Failed;
    }

    fn drain_available(&mut self) -> StudioResult<()> {
        let Some(rx) = self.rx.as_ref() else {
            return Ok(());
        };
        for chunk in rx.try_iter() {
            if chunk.is_empty() {
                continue;
            }
            self.buffered = self.buffered.saturating_add(chunk.len());
            if self.buffered > self.max_buffered {
                return Err(StudioError::encode(format!(
                    "encoded output exceeds the {} byte buffer limit",
                    self.max_buffered
                )));
            }
            self.chunks.push(chunk);
        }
        Ok(())
    }

    fn expect_state(&self, want: RecorderState, op: &str) -> StudioResult<()> {
        if self.state != want {
            return Err(StudioError::encode(format!(
                "recorder cannot {op} while {} (expected {want})",
                self.state
            )));
        }
        Ok(())
    }
}

impl<E: MediaEncoder> Drop for Recorder<E> {
    fn drop(&mut self) {
        if self.state == RecorderState::Recording {
            self.abort();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/record/recorder.rs"]
mod tests;
