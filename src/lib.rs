//! VO3 Studio turns a list of still images into a WebM slideshow.
//!
//! Each image is cover-fit onto a fixed canvas and held for a configurable number of seconds,
//! with an optional logo in the bottom-right corner, an optional text caption (stroked, with a soft
//! drop shadow) and an optional soundtrack. Frames are rasterized on the CPU and handed to a
//! [`MediaEncoder`] through a [`Recorder`]; the ffmpeg-backed [`WebmEncoder`] produces VP9/Opus.
//!
//! - Describe a render with a [`RenderRequest`] (or load a [`ProjectConfig`])
//! - Call [`generate_video`] to get an [`OutputArtifact`]
//! - Or drive everything through a [`Studio`], which also tracks status and fact-checking
#![forbid(unsafe_code)]
// Some helpers are only reached from tests or the CLI.
#![allow(dead_code)]

mod artifact;
mod assets;
mod config;
mod encode;
mod factcheck;
mod foundation;
mod pipeline;
mod record;
mod render;
mod studio;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{StudioError, StudioResult};

pub use crate::assets::color::parse_css_color;
pub use crate::assets::decode::{
    DecodedImage, decode_image, decode_image_asset, decode_images, read_dimensions,
};
pub use crate::assets::media::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio};
pub use crate::assets::source::{AudioSource, ImageAsset};

pub use crate::render::overlay::{
    HAlign, OverlayPosition, ResolvedOverlay, TEXT_PADDING_PX, TextAnchor, TextOverlayConfig,
    VBaseline, overlay_anchor,
};
pub use crate::render::plan::{
    CaptionLayout, DrawOp, FrameLayout, FramePlan, ImageRef, LOGO_MARGIN_PX, LOGO_MAX_WIDTH_PX,
    LOGO_OPACITY, LOGO_WIDTH_FRACTION, SHADOW_BLUR_PX, SHADOW_OFFSET, ShadowStyle, TextPlacement,
    compile_frame, cover_fit, logo_draw_width, logo_rect, text_origin,
};
pub use crate::render::surface::{FrameRGBA, Surface, surface_size_for};
pub use crate::render::text::{FALLBACK_FONT_PATHS, resolve_font_path};

pub use crate::encode::audio::AudioTrack;
pub use crate::encode::ffmpeg::{WebmEncoder, WebmEncoderOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{
    AudioInputConfig, ChunkReceiver, EncoderCapture, EncoderConfig, InMemoryEncoder, MediaEncoder,
    WEBM_MEDIA_TYPE,
};

pub use crate::record::cancel::CancellationToken;
pub use crate::record::clock::{Clock, RealtimeClock, SimulatedClock};
pub use crate::record::recorder::{MAX_CHUNK_BUFFER_BYTES, Recorder, RecorderState};
pub use crate::record::timeline::{frames_for_image, nominal_duration_secs, total_frames};

pub use crate::artifact::{
    ArtifactHandle, DEFAULT_DOWNLOAD_STEM, OutputArtifact, download_file_name,
};
pub use crate::config::{
    DEFAULT_SECONDS_PER_IMAGE, DEFAULT_TITLE, MAX_FONT_SIZE, MAX_IMAGES, MAX_SECONDS_PER_IMAGE,
    MIN_FONT_SIZE, MIN_SECONDS_PER_IMAGE, ProjectConfig,
};
pub use crate::pipeline::{
    MAX_TOTAL_SECONDS, PreparedScene, RenderProgress, RenderRequest, generate_video, render_frame,
};
pub use crate::studio::{READY_STATUS, Studio};

pub use crate::factcheck::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL, FactCheckConfig, GeminiClient};
pub use crate::factcheck::{
    AnalysisResult, AnalysisSource, ContentAnalyzer, FactCheckError, FactCheckFailure,
    FactCheckOutcome, analysis_prompt, dedup_sources, ensure_content,
};
