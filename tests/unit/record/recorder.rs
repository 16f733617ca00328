use std::sync::mpsc;

use super::*;
use crate::encode::sink::InMemoryEncoder;

/// Emits one scripted chunk per pushed frame and nothing else.
struct ScriptedEncoder {
    script: Vec<Vec<u8>>,
    tx: Option<mpsc::Sender<Vec<u8>>>,
    fail_start: bool,
}

impl ScriptedEncoder {
    fn new(script: &[&[u8]]) -> Self {
        Self {
            script: script.iter().rev().map(|c| c.to_vec()).collect(),
            tx: None,
            fail_start: false,
        }
    }
}

impl MediaEncoder for ScriptedEncoder {
    fn start(&mut self, _cfg: EncoderConfig) -> StudioResult<ChunkReceiver> {
        if self.fail_start {
            return Err(StudioError::encode("scripted start failure"));
        }
        let (tx, rx) = mpsc::channel();
        self.tx = Some(tx);
        Ok(rx)
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> StudioResult<()> {
        if let (Some(tx), Some(chunk)) = (self.tx.as_ref(), self.script.pop()) {
            let _ = tx.send(chunk);
        }
        Ok(())
    }

    fn finish(&mut self) -> StudioResult<()> {
        self.tx = None;
        Ok(())
    }

    fn abort(&mut self) {
        self.tx = None;
    }
}

fn cfg() -> EncoderConfig {
    EncoderConfig {
        width: 1,
        height: 1,
        fps: Fps::CAPTURE,
        audio: None,
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0, 0, 0, 255],
        premultiplied: true,
    }
}

#[test]
fn chunks_concatenate_in_emission_order() {
    let mut rec = Recorder::new(ScriptedEncoder::new(&[b"c1", b"c2", b"c3"]));
    assert_eq!(rec.state(), RecorderState::Idle);
    rec.start(cfg()).unwrap();
    assert_eq!(rec.state(), RecorderState::Recording);
    for _ in 0..3 {
        rec.push_frame(&frame()).unwrap();
    }
    assert_eq!(rec.chunk_count(), 3);
    let artifact = rec.stop().unwrap();
    assert_eq!(artifact.bytes, b"c1c2c3");
    assert_eq!(artifact.media_type, "video/webm");
    assert_eq!(artifact.frame_count, 3);
    assert_eq!(rec.state(), RecorderState::Stopped);
}

#[test]
fn push_requires_recording() {
    let mut rec = Recorder::new(InMemoryEncoder::new());
    assert!(matches!(
        rec.push_frame(&frame()),
        Err(StudioError::Encode(_))
    ));
    assert!(rec.stop().is_err());
    assert_eq!(rec.state(), RecorderState::Idle);
}

#[test]
fn stopped_recorder_cannot_restart() {
    let mut rec = Recorder::new(InMemoryEncoder::new());
    rec.start(cfg()).unwrap();
    rec.stop().unwrap();
    assert!(rec.start(cfg()).is_err());
    assert!(rec.stop().is_err());
    rec.abort();
    assert_eq!(rec.state(), RecorderState::Stopped);
}

#[test]
fn artifact_duration_follows_frame_count() {
    let mut rec = Recorder::new(InMemoryEncoder::new());
    rec.start(cfg()).unwrap();
    for _ in 0..60 {
        rec.push_frame(&frame()).unwrap();
    }
    let a = rec.stop().unwrap();
    assert_eq!(a.frame_count, 60);
    assert!((a.duration_secs - 2.0).abs() < 1e-9);
    assert!(a.bytes.starts_with(InMemoryEncoder::HEADER));
    assert!(a.bytes.ends_with(InMemoryEncoder::TRAILER));
}

#[test]
fn abort_discards_chunks() {
    let mut rec = Recorder::new(ScriptedEncoder::new(&[b"aa", b"bb"]));
    rec.start(cfg()).unwrap();
    rec.push_frame(&frame()).unwrap();
    rec.abort();
    assert_eq!(rec.state(), RecorderState::Failed);
    assert_eq!(rec.chunk_count(), 0);
    assert_eq!(rec.buffered_bytes(), 0);
    assert!(rec.push_frame(&frame()).is_err());
}

#[test]
fn drop_while_recording_aborts_encoder() {
    let enc = InMemoryEncoder::new();
    let capture = enc.capture();
    {
        let mut rec = Recorder::new(enc);
        rec.start(cfg()).unwrap();
        rec.push_frame(&frame()).unwrap();
    }
    let c = capture.lock().unwrap();
    assert!(c.aborted);
    assert!(!c.finished);
}

#[test]
fn buffer_limit_fails_the_recording() {
    let mut rec =
        Recorder::new(ScriptedEncoder::new(&[b"12345", b"67890"])).with_buffer_limit(8);
    rec.start(cfg()).unwrap();
    rec.push_frame(&frame()).unwrap();
    let err = rec.push_frame(&frame()).unwrap_err();
    assert!(matches!(err, StudioError::Encode(_)));
    assert_eq!(rec.state(), RecorderState::Failed);
}

#[test]
fn failed_start_is_terminal() {
    let mut enc = ScriptedEncoder::new(&[]);
    enc.fail_start = true;
    let mut rec = Recorder::new(enc);
    assert!(rec.start(cfg()).is_err());
    assert_eq!(rec.state(), RecorderState::Failed);
}
