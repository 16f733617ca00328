use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::core::Fps;
use crate::foundation::error::StudioResult;

/// Filename used when the title is blank.
pub const DEFAULT_DOWNLOAD_STEM: &str = "vo3_video";

/// The encoded video produced by one successful render.
#[derive(Clone, PartialEq)]
pub struct OutputArtifact {
    /// Concatenated encoder output.
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub frame_count: u64,
    pub fps: Fps,
    /// Duration implied by `frame_count` at `fps`.
    pub duration_secs: f64,
}

impl std::fmt::Debug for OutputArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputArtifact")
            .field("bytes", &self.bytes.len())
            .field("media_type", &self.media_type)
            .field("frame_count", &self.frame_count)
            .field("fps", &self.fps)
            .field("duration_secs", &self.duration_secs)
            .finish()
    }
}

impl OutputArtifact {
    /// Write the bytes to `path`, creating parent directories.
    pub fn save_as(&self, path: &Path) -> StudioResult<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write video to '{}'", path.display()))?;
        Ok(())
    }
}

/// A published artifact: a uniquely named file in a preview directory.
///
/// The file is released (deleted) when the handle is dropped, which happens when a newer render
/// supersedes it.
#[derive(Debug)]
pub struct ArtifactHandle {
    path: PathBuf,
    artifact: OutputArtifact,
}

impl ArtifactHandle {
    pub fn publish(artifact: OutputArtifact, dir: &Path) -> StudioResult<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create preview directory '{}'", dir.display()))?;
        let path = dir.join(format!("vo3_{}.webm", uuid::Uuid::new_v4().simple()));
        std::fs::write(&path, &artifact.bytes)
            .with_context(|| format!("failed to publish video to '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "published video");
        Ok(Self { path, artifact })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn artifact(&self) -> &OutputArtifact {
        &self.artifact
    }

    /// Copy the video to a caller-chosen location. The handle stays valid.
    pub fn save_as(&self, path: &Path) -> StudioResult<()> {
        self.artifact.save_as(path)
    }
}

impl Drop for ArtifactHandle {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release video");
        }
    }
}

/// Download filename for a project title: every whitespace run becomes `_`, an empty title uses
/// [`DEFAULT_DOWNLOAD_STEM`]. A whitespace-only title therefore yields `_.webm`.
pub fn download_file_name(title: &str) -> String {
    if title.is_empty() {
        return format!("{DEFAULT_DOWNLOAD_STEM}.webm");
    }
    let mut stem = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(ch);
            in_space = false;
        }
    }
    format!("{stem}.webm")
}

#[cfg(test)]
#[path = "../tests/unit/artifact.rs"]
mod tests;
