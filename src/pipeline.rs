use crate::artifact::OutputArtifact;
use crate::assets::decode::{decode_image_asset, decode_images, read_dimensions};
use crate::assets::media::decode_audio;
use crate::assets::source::{AudioSource, ImageAsset};
use crate::encode::audio::AudioTrack;
use crate::encode::sink::{EncoderConfig, MediaEncoder};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{StudioError, StudioResult};
use crate::record::cancel::CancellationToken;
use crate::record::clock::Clock;
use crate::record::recorder::Recorder;
use crate::record::timeline::{frames_for_image, nominal_duration_secs, total_frames};
use crate::render::cpu::CpuCompositor;
use crate::render::overlay::TextOverlayConfig;
use crate::render::plan::{CaptionLayout, FrameLayout, FramePlan, compile_frame, logo_draw_width};
use crate::render::surface::{FrameRGBA, Surface, surface_size_for};
use crate::render::text::{PreparedText, load_font_bytes, resolve_font_path};

/// Longest video a single request may produce.
pub const MAX_TOTAL_SECONDS: f64 = 600.0;

/// Everything one render needs. Immutable for the duration of the render.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Slides in display order.
    pub images: Vec<ImageAsset>,
    /// How long each slide is held.
    pub seconds_per_image: f64,
    pub logo: Option<ImageAsset>,
    pub audio: Option<AudioSource>,
    pub overlay: TextOverlayConfig,
    pub fps: Fps,
}

impl RenderRequest {
    pub fn new(images: Vec<ImageAsset>, seconds_per_image: f64) -> Self {
        Self {
            images,
            seconds_per_image,
            logo: None,
            audio: None,
            overlay: TextOverlayConfig::default(),
            fps: Fps::CAPTURE,
        }
    }

    /// Checks that need no decoding: non-empty input, a usable hold and the total length bound.
    pub fn validate(&self) -> StudioResult<()> {
        if self.images.is_empty() {
            return Err(StudioError::no_input("no images to generate video from"));
        }
        let d = self.seconds_per_image;
        if !d.is_finite() || d <= 0.0 {
            return Err(StudioError::validation(format!(
                "seconds per image must be finite and > 0, got {d}"
            )));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        let total = self.nominal_duration_secs();
        if total > MAX_TOTAL_SECONDS {
            return Err(StudioError::validation(format!(
                "video would last {total}s, longer than the {MAX_TOTAL_SECONDS}s limit"
            )));
        }
        Ok(())
    }

    pub fn nominal_duration_secs(&self) -> f64 {
        nominal_duration_secs(self.images.len(), self.seconds_per_image)
    }

    pub fn total_frames(&self) -> u64 {
        total_frames(self.images.len(), self.seconds_per_image, self.fps)
    }
}

/// Progress reported while a render runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderProgress {
    InitializingSurface,
    ProcessingAudio,
    /// Slide `index` (0-based) of `total` is being drawn and held.
    RenderingImage { index: usize, total: usize },
    Finalizing,
}

impl RenderProgress {
    /// Human-readable status line.
    pub fn status_line(&self) -> String {
        match self {
            Self::InitializingSurface => "Initializing canvas...".to_owned(),
            Self::ProcessingAudio => "Processing audio...".to_owned(),
            Self::RenderingImage { index, total } => {
                format!("Rendering frame {} of {total}...", index + 1)
            }
            Self::Finalizing => "Finalizing video...".to_owned(),
        }
    }
}

/// Slides, logo and caption decoded and bound to one surface.
#[derive(Debug)]
pub struct PreparedScene {
    layout: FrameLayout,
    compositor: CpuCompositor,
    surface: Surface,
}

impl PreparedScene {
    /// Probe, allocate and decode, in that order, so a bad first image fails before decode work.
    #[tracing::instrument(skip(request), fields(images = request.images.len()))]
    pub fn prepare(request: &RenderRequest) -> StudioResult<Self> {
        request.validate()?;

        let first = &request.images[0];
        let (w, h) = read_dimensions(first)?;
        let canvas = surface_size_for(w, h);
        let surface = Surface::new(canvas)?;
        tracing::info!(width = canvas.width, height = canvas.height, "surface allocated");

        let slides = decode_images(&request.images)?;
        let logo = request
            .logo
            .as_ref()
            .map(|asset| decode_image_asset(asset, Some(logo_draw_width(canvas))))
            .transpose()?;

        let caption_text = prepare_caption(&request.overlay, canvas)?;
        let caption = caption_text.as_ref().map(|(layout, _)| *layout);

        let layout = FrameLayout {
            canvas,
            slides: slides.iter().map(|s| (s.width, s.height)).collect(),
            logo: logo.as_ref().map(|l| (l.width, l.height)),
            caption,
        };
        let compositor = CpuCompositor::new(
            canvas,
            &slides,
            logo.as_ref(),
            caption_text.map(|(_, text)| text),
        )?;

        Ok(Self {
            layout,
            compositor,
            surface,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.layout.canvas
    }

    pub fn slide_count(&self) -> usize {
        self.layout.slides.len()
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn plan(&self, index: usize) -> FramePlan {
        compile_frame(&self.layout, index)
    }

    /// Compose slide `index` and return its pixels.
    pub fn render(&mut self, index: usize) -> StudioResult<FrameRGBA> {
        if index >= self.slide_count() {
            return Err(StudioError::validation(format!(
                "slide {index} out of range (have {})",
                self.slide_count()
            )));
        }
        let plan = compile_frame(&self.layout, index);
        self.compositor.execute(&plan, &mut self.surface)?;
        Ok(self.surface.snapshot())
    }
}

fn prepare_caption(
    overlay: &TextOverlayConfig,
    canvas: Canvas,
) -> StudioResult<Option<(CaptionLayout, PreparedText)>> {
    let Some(resolved) = overlay.resolve(canvas)? else {
        return Ok(None);
    };
    let font_path = resolve_font_path(overlay.font_path.as_deref())?;
    let font_bytes = load_font_bytes(&font_path)?;
    let text = PreparedText::shape(&overlay.text, font_bytes, resolved.font_size)?;
    tracing::debug!(font = %font_path.display(), width = text.width, "caption shaped");
    Ok(Some((
        CaptionLayout {
            overlay: resolved,
            width: text.width,
            height: text.height,
        },
        text,
    )))
}

/// Render a single slide without recording, e.g. for previews.
pub fn render_frame(request: &RenderRequest, index: usize) -> StudioResult<FrameRGBA> {
    PreparedScene::prepare(request)?.render(index)
}

/// Turn `request` into a WebM artifact.
///
/// Stages run strictly in order: input normalization, surface setup (with the soundtrack merged
/// into the stream configuration), recording, and per-slide rendering with holds. On any error
/// or cancellation the recorder is aborted and staged audio is removed before returning.
#[tracing::instrument(
    skip_all,
    fields(images = request.images.len(), secs = request.seconds_per_image)
)]
pub fn generate_video<E: MediaEncoder>(
    request: &RenderRequest,
    encoder: E,
    clock: &mut dyn Clock,
    cancel: &CancellationToken,
    on_progress: &mut dyn FnMut(RenderProgress),
) -> StudioResult<OutputArtifact> {
    on_progress(RenderProgress::InitializingSurface);
    let mut scene = PreparedScene::prepare(request)?;
    cancel.check()?;

    let duration = request.nominal_duration_secs();
    let track = match request.audio.as_ref() {
        Some(source) => {
            on_progress(RenderProgress::ProcessingAudio);
            let pcm = decode_audio(source)?;
            Some(AudioTrack::stage(&pcm, duration)?)
        }
        None => None,
    };
    cancel.check()?;

    let canvas = scene.canvas();
    let mut recorder = Recorder::new(encoder);
    recorder.start(EncoderConfig {
        width: canvas.width,
        height: canvas.height,
        fps: request.fps,
        audio: track.as_ref().map(|t| t.input().clone()),
    })?;
    tracing::info!(
        frames = request.total_frames(),
        duration_secs = duration,
        audio = track.is_some(),
        "recording started"
    );

    let total = scene.slide_count();
    for index in 0..total {
        on_progress(RenderProgress::RenderingImage { index, total });
        cancel.check()?;
        let frame = scene.render(index)?;
        let repeats = frames_for_image(index, request.seconds_per_image, request.fps);
        tracing::debug!(index, repeats, "slide composed");
        for _ in 0..repeats {
            cancel.check()?;
            recorder.push_frame(&frame)?;
        }
        clock.hold(request.seconds_per_image, cancel)?;
    }

    on_progress(RenderProgress::Finalizing);
    let artifact = recorder.stop()?;
    tracing::info!(
        bytes = artifact.bytes.len(),
        frames = artifact.frame_count,
        "video generated"
    );
    drop(track);
    Ok(artifact)
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
