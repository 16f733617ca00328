use std::path::{Path, PathBuf};

use crate::artifact::{ArtifactHandle, download_file_name};
use crate::assets::source::{AudioSource, ImageAsset};
use crate::config::{MAX_IMAGES, ProjectConfig};
use crate::encode::sink::MediaEncoder;
use crate::factcheck::{AnalysisResult, ContentAnalyzer, FactCheckOutcome, ensure_content};
use crate::foundation::core::Fps;
use crate::foundation::error::StudioResult;
use crate::pipeline::{RenderProgress, RenderRequest, generate_video};
use crate::record::cancel::CancellationToken;
use crate::record::clock::Clock;
use crate::render::overlay::TextOverlayConfig;

pub const READY_STATUS: &str = "Ready. Add images to begin.";

/// Project state plus the last rendered video and analysis, with a one-line status.
///
/// Failures are reported through the status line (`"Error: ..."`, `"Analysis Error: ..."`);
/// a failed render never leaves a partial video behind.
#[derive(Debug)]
pub struct Studio {
    pub title: String,
    pub seconds_per_image: f64,
    pub overlay: TextOverlayConfig,
    pub subtitles: String,
    images: Vec<ImageAsset>,
    logo: Option<ImageAsset>,
    audio: Option<AudioSource>,
    preview_dir: PathBuf,
    video: Option<ArtifactHandle>,
    analysis: Option<AnalysisResult>,
    status: String,
    history: Vec<String>,
}

impl Studio {
    /// A studio that publishes previews into `preview_dir`.
    pub fn new(preview_dir: impl Into<PathBuf>) -> Self {
        let defaults = ProjectConfig::default();
        let mut studio = Self {
            title: defaults.title,
            seconds_per_image: defaults.seconds_per_image,
            overlay: defaults.overlay,
            subtitles: defaults.subtitles,
            images: Vec::new(),
            logo: None,
            audio: None,
            preview_dir: preview_dir.into(),
            video: None,
            analysis: None,
            status: String::new(),
            history: Vec::new(),
        };
        studio.set_status(READY_STATUS);
        studio
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Every status line so far, oldest first.
    pub fn status_history(&self) -> &[String] {
        &self.history
    }

    pub fn images(&self) -> &[ImageAsset] {
        &self.images
    }

    pub fn video(&self) -> Option<&ArtifactHandle> {
        self.video.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Append images up to [`MAX_IMAGES`]; returns how many were accepted.
    pub fn add_images(&mut self, images: impl IntoIterator<Item = ImageAsset>) -> usize {
        let room = MAX_IMAGES.saturating_sub(self.images.len());
        let before = self.images.len();
        self.images.extend(images.into_iter().take(room));
        let added = self.images.len() - before;
        self.set_status(format!("{added} image(s) added."));
        added
    }

    pub fn remove_image(&mut self, index: usize) -> Option<ImageAsset> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn clear_images(&mut self) {
        self.images.clear();
    }

    pub fn set_audio(&mut self, audio: AudioSource) {
        self.set_status(format!("Audio file \"{}\" selected.", audio.name));
        self.audio = Some(audio);
    }

    pub fn set_logo(&mut self, logo: ImageAsset) {
        self.set_status(format!("Logo file \"{}\" selected.", logo.name));
        self.logo = Some(logo);
    }

    pub fn request(&self) -> RenderRequest {
        RenderRequest {
            images: self.images.clone(),
            seconds_per_image: self.seconds_per_image,
            logo: self.logo.clone(),
            audio: self.audio.clone(),
            overlay: self.overlay.clone(),
            fps: Fps::CAPTURE,
        }
    }

    /// Render the current project and publish it, replacing (and releasing) any previous video.
    pub fn generate<E: MediaEncoder>(
        &mut self,
        encoder: E,
        clock: &mut dyn Clock,
        cancel: &CancellationToken,
    ) -> Option<&ArtifactHandle> {
        self.video = None;
        self.set_status("Starting video generation...");

        let request = self.request();
        let mut report = |p: RenderProgress| self.set_status(p.status_line());
        let result = generate_video(&request, encoder, clock, cancel, &mut report);
        let published =
            result.and_then(|artifact| ArtifactHandle::publish(artifact, &self.preview_dir));
        match published {
            Ok(handle) => {
                self.video = Some(handle);
                self.set_status("Preview generated successfully!");
            }
            Err(e) => {
                tracing::warn!(error = %e, "video generation failed");
                self.set_status(format!("Error: {e}"));
            }
        }
        self.video.as_ref()
    }

    /// Copy the current video into `dir` under [`download_file_name`] of the title.
    pub fn save_video(&self, dir: &Path) -> StudioResult<Option<PathBuf>> {
        let Some(video) = self.video.as_ref() else {
            return Ok(None);
        };
        let path = dir.join(download_file_name(&self.title));
        video.save_as(&path)?;
        Ok(Some(path))
    }

    /// Fact-check the title and subtitles. Never affects the current video.
    pub fn analyze(&mut self, analyzer: &dyn ContentAnalyzer) -> FactCheckOutcome {
        if let Err(e) = ensure_content(&self.title, &self.subtitles) {
            self.set_status("Please provide a title or subtitles to analyze.");
            return Err::<AnalysisResult, _>(e).into();
        }
        self.set_status("Analyzing content with Gemini...");
        self.analysis = None;

        let result = analyzer.analyze(&self.title, &self.subtitles);
        match &result {
            Ok(a) => {
                self.analysis = Some(a.clone());
                self.set_status("Content analysis complete.");
            }
            Err(e) => self.set_status(format!("Analysis Error: {e}")),
        }
        result.into()
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        tracing::debug!(status = %self.status, "studio status");
        self.history.push(self.status.clone());
    }
}

#[cfg(test)]
#[path = "../tests/unit/studio.rs"]
mod tests;
