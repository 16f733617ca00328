use std::path::Path;

use crate::assets::source::AudioSource;
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::tempfile::{TempFileGuard, temp_path};

/// Sample rate every soundtrack is resampled to before encoding.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Channel count every soundtrack is remixed to before encoding.
pub const MIX_CHANNELS: u16 = 2;

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate.max(1))
    }
}

/// Decode raw soundtrack bytes to stereo interleaved `f32` PCM at [`MIX_SAMPLE_RATE`].
///
/// The bytes are staged in a temp file so `ffmpeg` can seek in containers; the file is
/// removed on every exit path.
#[tracing::instrument(skip(source), fields(name = %source.name, bytes = source.bytes.len()))]
pub fn decode_audio(source: &AudioSource) -> StudioResult<AudioPcm> {
    if source.bytes.is_empty() {
        return Err(StudioError::decode(format!(
            "audio '{}' is empty",
            source.name
        )));
    }

    let staged = TempFileGuard::new(temp_path("vo3_audio_in", "bin"));
    let path = staged
        .path()
        .ok_or_else(|| StudioError::decode("audio staging path missing"))?;
    std::fs::write(path, &source.bytes).map_err(|e| {
        StudioError::decode(format!(
            "failed to stage audio '{}' at '{}': {e}",
            source.name,
            path.display()
        ))
    })?;

    let pcm = decode_audio_f32_stereo(path, MIX_SAMPLE_RATE)
        .map_err(|e| StudioError::decode(format!("audio '{}': {e}", source.name)))?;
    if pcm.interleaved_f32.is_empty() {
        return Err(StudioError::decode(format!(
            "audio '{}' decoded to zero samples",
            source.name
        )));
    }
    tracing::debug!(secs = pcm.duration_secs(), "decoded audio");
    Ok(pcm)
}

/// Decode an audio file through the system `ffmpeg` to stereo interleaved `f32` PCM.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> Result<AudioPcm, String> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &MIX_CHANNELS.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| format!("failed to run ffmpeg for audio decode: {e}"))?;

    if !out.status.success() {
        return Err(format!(
            "ffmpeg audio decode failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        ));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err("decoded audio byte length is not aligned to f32 samples".to_owned());
    }
    let pcm = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(AudioPcm {
        sample_rate,
        channels: MIX_CHANNELS,
        interleaved_f32: pcm,
    })
}

// No unit tests here: decoding shells out to `ffmpeg` and is covered by integration tests that
// skip when the tool is unavailable.
