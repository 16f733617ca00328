use std::path::Path;

use crate::assets::media::AudioPcm;
use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::tempfile::{TempFileGuard, temp_path};

/// A soundtrack fitted to the video and staged on disk for the encoder.
///
/// The staged file is removed when the track is dropped.
#[derive(Debug)]
pub struct AudioTrack {
    input: AudioInputConfig,
    _file: TempFileGuard,
}

impl AudioTrack {
    /// Fit `pcm` to `duration_secs` and write it as raw `f32le` to a temp file.
    #[tracing::instrument(skip(pcm), fields(source_secs = pcm.duration_secs()))]
    pub fn stage(pcm: &AudioPcm, duration_secs: f64) -> StudioResult<Self> {
        let samples = fit_to_duration(pcm, duration_secs);
        let guard = TempFileGuard::new(temp_path("vo3_audio_track", "f32le"));
        let path = guard
            .path()
            .ok_or_else(|| StudioError::encode("audio track path missing"))?
            .to_path_buf();
        write_f32le_file(&samples, &path)?;
        Ok(Self {
            input: AudioInputConfig {
                path,
                sample_rate: pcm.sample_rate,
                channels: pcm.channels,
            },
            _file: guard,
        })
    }

    pub fn input(&self) -> &AudioInputConfig {
        &self.input
    }
}

/// Trim or zero-pad interleaved samples so they last exactly `duration_secs`.
pub(crate) fn fit_to_duration(pcm: &AudioPcm, duration_secs: f64) -> Vec<f32> {
    let channels = usize::from(pcm.channels.max(1));
    let frames = (duration_secs.max(0.0) * f64::from(pcm.sample_rate)).round() as usize;
    let want = frames * channels;
    let mut out = Vec::with_capacity(want);
    let take = want.min(pcm.interleaved_f32.len());
    out.extend_from_slice(&pcm.interleaved_f32[..take]);
    out.resize(want, 0.0);
    out
}

pub(crate) fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> StudioResult<()> {
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        StudioError::encode(format!(
            "failed to write audio track '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/audio.rs"]
mod tests;
