//! Per-frame draw lists.
//!
//! A [`FramePlan`] is a pure function of the render's static layout and the image index. The
//! CPU executor in [`crate::render::cpu`] is the only consumer.

use crate::foundation::core::{Canvas, Point, Rect, Rgba8Premul, Vec2};
use crate::render::overlay::{HAlign, ResolvedOverlay, TextAnchor, VBaseline};

/// Maximum logo width in pixels.
pub const LOGO_MAX_WIDTH_PX: f64 = 200.0;
/// Logo width as a fraction of the surface width, when smaller than [`LOGO_MAX_WIDTH_PX`].
pub const LOGO_WIDTH_FRACTION: f64 = 0.18;
/// Gap between the logo and the bottom-right corner.
pub const LOGO_MARGIN_PX: f64 = 20.0;
pub const LOGO_OPACITY: f32 = 0.95;

/// Canvas-style `shadowBlur` of the caption.
pub const SHADOW_BLUR_PX: f64 = 10.0;
pub const SHADOW_OFFSET: Vec2 = Vec2::new(2.0, 2.0);

/// Image drawn by a [`DrawOp::DrawImage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// Index into the decoded slide list.
    Slide(usize),
    Logo,
}

/// Drop shadow applied to the text ops between [`DrawOp::PushShadow`] and [`DrawOp::PopShadow`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowStyle {
    /// Canvas-style blur amount; the gaussian sigma is half of it.
    pub blur: f64,
    pub offset: Vec2,
    pub color: Rgba8Premul,
}

impl ShadowStyle {
    pub fn caption() -> Self {
        Self {
            blur: SHADOW_BLUR_PX,
            offset: SHADOW_OFFSET,
            color: Rgba8Premul::from_straight_rgba(0, 0, 0, 179),
        }
    }
}

/// A caption draw, positioned by its anchor and by the top-left of its layout box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextPlacement {
    pub anchor: TextAnchor,
    /// Top-left corner of the shaped line box.
    pub origin: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill the whole surface.
    Clear { color: Rgba8Premul },
    DrawImage {
        image: ImageRef,
        dest: Rect,
        opacity: f32,
    },
    PushShadow(ShadowStyle),
    StrokeText {
        placement: TextPlacement,
        color: Rgba8Premul,
        width: f64,
    },
    FillText {
        placement: TextPlacement,
        color: Rgba8Premul,
    },
    PopShadow,
}

impl DrawOp {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::StrokeText { .. } | Self::FillText { .. })
    }
}

/// Ordered draw list for one image hold.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub canvas: Canvas,
    pub slide: usize,
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    pub fn text_ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| op.is_text())
    }
}

/// Shaped caption size plus its resolved style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionLayout {
    pub overlay: ResolvedOverlay,
    /// Line box width in pixels.
    pub width: f64,
    /// Line box height in pixels.
    pub height: f64,
}

/// Everything a frame plan depends on that is fixed for the whole render.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameLayout {
    pub canvas: Canvas,
    /// Natural size of each slide, in input order.
    pub slides: Vec<(u32, u32)>,
    /// Natural size of the logo, if any.
    pub logo: Option<(u32, u32)>,
    pub caption: Option<CaptionLayout>,
}

/// Destination rectangle that covers the canvas with an image, cropping the overflow evenly.
pub fn cover_fit(canvas: Canvas, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return Rect::new(0.0, 0.0, canvas.w(), canvas.h());
    }
    let (iw, ih) = (f64::from(width), f64::from(height));
    let scale = (canvas.w() / iw).max(canvas.h() / ih);
    let (sw, sh) = (iw * scale, ih * scale);
    let x = (canvas.w() - sw) / 2.0;
    let y = (canvas.h() - sh) / 2.0;
    Rect::new(x, y, x + sw, y + sh)
}

/// Bottom-right logo rectangle, aspect preserved.
pub fn logo_rect(canvas: Canvas, width: u32, height: u32) -> Rect {
    let lw = LOGO_MAX_WIDTH_PX.min(canvas.w() * LOGO_WIDTH_FRACTION);
    let lh = if width == 0 {
        0.0
    } else {
        lw * f64::from(height) / f64::from(width)
    };
    let x = canvas.w() - lw - LOGO_MARGIN_PX;
    let y = canvas.h() - lh - LOGO_MARGIN_PX;
    Rect::new(x, y, x + lw, y + lh)
}

/// Width the logo is drawn at, used to rasterize vector logos at their final size.
pub fn logo_draw_width(canvas: Canvas) -> u32 {
    LOGO_MAX_WIDTH_PX
        .min(canvas.w() * LOGO_WIDTH_FRACTION)
        .round()
        .max(1.0) as u32
}

/// Top-left corner of a `width`×`height` line box attached to `anchor`.
pub fn text_origin(anchor: TextAnchor, width: f64, height: f64) -> Point {
    let x = match anchor.align {
        HAlign::Start => anchor.x,
        HAlign::Center => anchor.x - width / 2.0,
        HAlign::End => anchor.x - width,
    };
    let y = match anchor.baseline {
        VBaseline::Top => anchor.y,
        VBaseline::Middle => anchor.y - height / 2.0,
        VBaseline::Bottom => anchor.y - height,
    };
    Point::new(x, y)
}

/// Compile the draw list for slide `index`.
pub fn compile_frame(layout: &FrameLayout, index: usize) -> FramePlan {
    let mut ops = Vec::with_capacity(7);
    ops.push(DrawOp::Clear {
        color: Rgba8Premul::black(),
    });

    if let Some(&(w, h)) = layout.slides.get(index) {
        ops.push(DrawOp::DrawImage {
            image: ImageRef::Slide(index),
            dest: cover_fit(layout.canvas, w, h),
            opacity: 1.0,
        });
    }

    if let Some((w, h)) = layout.logo {
        ops.push(DrawOp::DrawImage {
            image: ImageRef::Logo,
            dest: logo_rect(layout.canvas, w, h),
            opacity: LOGO_OPACITY,
        });
    }

    if let Some(caption) = &layout.caption {
        let placement = TextPlacement {
            anchor: caption.overlay.anchor,
            origin: text_origin(caption.overlay.anchor, caption.width, caption.height),
        };
        ops.push(DrawOp::PushShadow(ShadowStyle::caption()));
        ops.push(DrawOp::StrokeText {
            placement,
            color: caption.overlay.stroke,
            width: caption.overlay.stroke_width,
        });
        ops.push(DrawOp::FillText {
            placement,
            color: caption.overlay.fill,
        });
        ops.push(DrawOp::PopShadow);
    }

    FramePlan {
        canvas: layout.canvas,
        slide: index,
        ops,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
