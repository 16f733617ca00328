use std::path::PathBuf;

/// Removes the wrapped path on drop.
///
/// Used for intermediate files handed to `ffmpeg` (raw audio inputs, mixed PCM) so that every exit
/// path of a render, including errors and cancellation, releases them.
#[derive(Debug, Default)]
pub(crate) struct TempFileGuard(pub(crate) Option<PathBuf>);

impl TempFileGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(Some(path))
    }

    pub(crate) fn path(&self) -> Option<&std::path::Path> {
        self.0.as_deref()
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take()
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file");
        }
    }
}

/// Unique path in the system temp directory.
pub(crate) fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "{prefix}_{}_{}.{ext}",
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    ))
}
