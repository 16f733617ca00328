use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::source::{AudioSource, ImageAsset};
use crate::foundation::core::Fps;
use crate::foundation::error::{StudioError, StudioResult};
use crate::pipeline::RenderRequest;
use crate::render::overlay::TextOverlayConfig;

/// Most slides a project may hold.
pub const MAX_IMAGES: usize = 30;
pub const MIN_SECONDS_PER_IMAGE: f64 = 1.0;
pub const MAX_SECONDS_PER_IMAGE: f64 = 10.0;
pub const MIN_FONT_SIZE: u32 = 16;
pub const MAX_FONT_SIZE: u32 = 128;
pub const DEFAULT_TITLE: &str = "My VO3 Video";
pub const DEFAULT_SECONDS_PER_IMAGE: f64 = 3.0;

/// A project file: JSON, with asset paths relative to the file's directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub title: String,
    pub seconds_per_image: f64,
    pub fps: Fps,
    pub images: Vec<String>,
    pub logo: Option<String>,
    pub audio: Option<String>,
    pub overlay: TextOverlayConfig,
    /// Script text for fact-checking; not rendered.
    pub subtitles: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            seconds_per_image: DEFAULT_SECONDS_PER_IMAGE,
            fps: Fps::CAPTURE,
            images: Vec::new(),
            logo: None,
            audio: None,
            overlay: TextOverlayConfig::default(),
            subtitles: String::new(),
        }
    }
}

impl ProjectConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> StudioResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StudioError::validation(format!("parse project JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StudioError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the limits the studio enforces on user input.
    pub fn validate(&self) -> StudioResult<()> {
        if self.images.len() > MAX_IMAGES {
            return Err(StudioError::validation(format!(
                "at most {MAX_IMAGES} images per project, got {}",
                self.images.len()
            )));
        }
        let d = self.seconds_per_image;
        if !(MIN_SECONDS_PER_IMAGE..=MAX_SECONDS_PER_IMAGE).contains(&d) {
            return Err(StudioError::validation(format!(
                "seconds_per_image must be within [{MIN_SECONDS_PER_IMAGE}, \
                 {MAX_SECONDS_PER_IMAGE}], got {d}"
            )));
        }
        let size = self.overlay.font_size;
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
            return Err(StudioError::validation(format!(
                "overlay font_size must be within [{MIN_FONT_SIZE}, {MAX_FONT_SIZE}], got {size}"
            )));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        for p in self
            .images
            .iter()
            .chain(self.logo.iter())
            .chain(self.audio.iter())
        {
            normalize_rel_path(p)?;
        }
        Ok(())
    }

    /// Validate, then read every referenced asset relative to `root`.
    pub fn into_request(self, root: &Path) -> StudioResult<RenderRequest> {
        self.validate()?;
        let images = self
            .images
            .iter()
            .map(|p| ImageAsset::from_path(&resolve(root, p)?))
            .collect::<StudioResult<Vec<_>>>()?;
        let logo = self
            .logo
            .as_deref()
            .map(|p| ImageAsset::from_path(&resolve(root, p)?))
            .transpose()?;
        let audio = self
            .audio
            .as_deref()
            .map(|p| AudioSource::from_path(&resolve(root, p)?))
            .transpose()?;

        let mut overlay = self.overlay;
        if let Some(font) = overlay.font_path.take() {
            overlay.font_path = Some(if font.is_relative() {
                root.join(font)
            } else {
                font
            });
        }

        Ok(RenderRequest {
            images,
            seconds_per_image: self.seconds_per_image,
            logo,
            audio,
            overlay,
            fps: self.fps,
        })
    }
}

fn resolve(root: &Path, rel: &str) -> StudioResult<PathBuf> {
    Ok(root.join(normalize_rel_path(rel)?))
}

/// Normalize and validate project-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> StudioResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StudioError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(StudioError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StudioError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StudioError::validation(
            "asset path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
