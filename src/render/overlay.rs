use std::path::PathBuf;

use crate::assets::color::parse_css_color;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{StudioError, StudioResult};

/// Distance between a text anchor and the surface edge it is attached to.
pub const TEXT_PADDING_PX: f64 = 30.0;

/// One of the nine caption anchor points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlayPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
}

/// Horizontal text alignment relative to the anchor x coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HAlign {
    /// Text starts at the anchor (`left`).
    Start,
    Center,
    /// Text ends at the anchor (`right`).
    End,
}

/// Vertical text placement relative to the anchor y coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VBaseline {
    Top,
    Middle,
    Bottom,
}

impl OverlayPosition {
    /// Every position, row by row.
    pub const ALL: [OverlayPosition; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Interpret a position name by substring, the way the caption picker values are matched.
    ///
    /// `left`/`right` select the horizontal side and `top`/`bottom` the vertical side; anything
    /// else on an axis falls back to center/middle, so unknown strings are always accepted.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        let h = if name.contains("left") {
            HAlign::Start
        } else if name.contains("right") {
            HAlign::End
        } else {
            HAlign::Center
        };
        let v = if name.contains("top") {
            VBaseline::Top
        } else if name.contains("bottom") {
            VBaseline::Bottom
        } else {
            VBaseline::Middle
        };
        Self::from_axes(h, v)
    }

    pub fn from_axes(h: HAlign, v: VBaseline) -> Self {
        match (v, h) {
            (VBaseline::Top, HAlign::Start) => Self::TopLeft,
            (VBaseline::Top, HAlign::Center) => Self::TopCenter,
            (VBaseline::Top, HAlign::End) => Self::TopRight,
            (VBaseline::Middle, HAlign::Start) => Self::MiddleLeft,
            (VBaseline::Middle, HAlign::Center) => Self::MiddleCenter,
            (VBaseline::Middle, HAlign::End) => Self::MiddleRight,
            (VBaseline::Bottom, HAlign::Start) => Self::BottomLeft,
            (VBaseline::Bottom, HAlign::Center) => Self::BottomCenter,
            (VBaseline::Bottom, HAlign::End) => Self::BottomRight,
        }
    }

    pub fn h_align(self) -> HAlign {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => HAlign::Start,
            Self::TopCenter | Self::MiddleCenter | Self::BottomCenter => HAlign::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => HAlign::End,
        }
    }

    pub fn v_baseline(self) -> VBaseline {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => VBaseline::Top,
            Self::MiddleLeft | Self::MiddleCenter | Self::MiddleRight => VBaseline::Middle,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => VBaseline::Bottom,
        }
    }

    /// Canonical kebab-case name (`"top-left"`, ..., `"middle-center"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::MiddleCenter => "middle-center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl std::fmt::Display for OverlayPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for OverlayPosition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl serde::Serialize for OverlayPosition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for OverlayPosition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_name(&s))
    }
}

/// Where and how a caption is attached to the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextAnchor {
    pub x: f64,
    pub y: f64,
    pub align: HAlign,
    pub baseline: VBaseline,
}

/// Anchor point for `position` on a surface of `canvas` size.
///
/// Pure function of its inputs: the same position and surface always yield the same anchor.
pub fn overlay_anchor(position: OverlayPosition, canvas: Canvas) -> TextAnchor {
    let align = position.h_align();
    let baseline = position.v_baseline();
    let x = match align {
        HAlign::Start => TEXT_PADDING_PX,
        HAlign::End => canvas.w() - TEXT_PADDING_PX,
        HAlign::Center => canvas.w() / 2.0,
    };
    let y = match baseline {
        VBaseline::Top => TEXT_PADDING_PX,
        VBaseline::Bottom => canvas.h() - TEXT_PADDING_PX,
        VBaseline::Middle => canvas.h() / 2.0,
    };
    TextAnchor {
        x,
        y,
        align,
        baseline,
    }
}

/// Caption settings shared by every frame of one render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextOverlayConfig {
    /// Caption text. Blank text disables the overlay.
    pub text: String,
    pub position: OverlayPosition,
    /// Font size in pixels.
    pub font_size: u32,
    /// CSS color for the fill pass.
    pub color: String,
    /// Font file to shape with. When unset, a bundled system font is searched for.
    pub font_path: Option<PathBuf>,
}

impl Default for TextOverlayConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            position: OverlayPosition::BottomCenter,
            font_size: 48,
            color: "#FFFFFF".to_owned(),
            font_path: None,
        }
    }
}

impl TextOverlayConfig {
    pub fn is_enabled(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Validate and resolve into per-render drawing parameters, or `None` when disabled.
    pub fn resolve(&self, canvas: Canvas) -> StudioResult<Option<ResolvedOverlay>> {
        if !self.is_enabled() {
            return Ok(None);
        }
        if self.font_size == 0 {
            return Err(StudioError::validation("overlay font_size must be > 0"));
        }
        let fill = parse_css_color(&self.color)?;
        let font_size = f64::from(self.font_size);
        Ok(Some(ResolvedOverlay {
            anchor: overlay_anchor(self.position, canvas),
            font_size,
            fill,
            stroke: Rgba8Premul::black(),
            stroke_width: (font_size / 16.0).max(1.0),
        }))
    }
}

/// Caption parameters after color parsing and anchor placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedOverlay {
    pub anchor: TextAnchor,
    pub font_size: f64,
    pub fill: Rgba8Premul,
    pub stroke: Rgba8Premul,
    pub stroke_width: f64,
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
