use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, Vec2};
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::premul_over_in_place;
use crate::render::blur::{
    blur_rgba8_premul_in_place, gaussian_kernel_q16, radius_for_sigma, shadow_sigma,
};
use crate::render::plan::{DrawOp, FramePlan, ImageRef, ShadowStyle, TextPlacement};
use crate::render::surface::{Surface, raster_dims};
use crate::render::text::PreparedText;

/// Antialiasing slack around a glyph region.
const GLYPH_AA_MARGIN_PX: f64 = 2.0;

/// Executes [`FramePlan`]s on a [`Surface`] with `vello_cpu`.
///
/// Slides, logo and caption are converted to paints once; every frame only replays draw ops.
pub struct CpuCompositor {
    canvas: Canvas,
    slides: Vec<vello_cpu::Image>,
    logo: Option<vello_cpu::Image>,
    caption: Option<PreparedText>,
    ctx: vello_cpu::RenderContext,
    scratch: vello_cpu::Pixmap,
    shadow_kernel: Option<(u64, Arc<Vec<u32>>)>,
}

impl std::fmt::Debug for CpuCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCompositor")
            .field("canvas", &self.canvas)
            .field("slides", &self.slides.len())
            .field("logo", &self.logo.is_some())
            .field("caption", &self.caption)
            .finish_non_exhaustive()
    }
}

enum TextPaint {
    Stroke(f64),
    Fill,
}

impl CpuCompositor {
    pub(crate) fn new(
        canvas: Canvas,
        slides: &[DecodedImage],
        logo: Option<&DecodedImage>,
        caption: Option<PreparedText>,
    ) -> StudioResult<Self> {
        let (w, h) = raster_dims(canvas)?;
        let slides = slides
            .iter()
            .map(image_paint)
            .collect::<StudioResult<Vec<_>>>()?;
        let logo = logo.map(image_paint).transpose()?;
        Ok(Self {
            canvas,
            slides,
            logo,
            caption,
            ctx: vello_cpu::RenderContext::new(w, h),
            scratch: vello_cpu::Pixmap::new(w, h),
            shadow_kernel: None,
        })
    }

    /// Replay `plan` onto `surface`.
    pub fn execute(&mut self, plan: &FramePlan, surface: &mut Surface) -> StudioResult<()> {
        if plan.canvas != self.canvas || surface.canvas() != self.canvas {
            return Err(StudioError::surface(format!(
                "plan for {}x{} does not match compositor {}x{}",
                plan.canvas.width, plan.canvas.height, self.canvas.width, self.canvas.height
            )));
        }

        let mut batched = false;
        let mut shadow: Option<ShadowStyle> = None;
        self.ctx.reset();

        for op in &plan.ops {
            match *op {
                DrawOp::Clear { color } => {
                    self.ctx.reset();
                    batched = false;
                    surface.fill(color);
                }
                DrawOp::DrawImage {
                    image,
                    dest,
                    opacity,
                } => {
                    self.draw_image(image, dest, opacity)?;
                    batched = true;
                }
                DrawOp::PushShadow(style) => shadow = Some(style),
                DrawOp::PopShadow => shadow = None,
                DrawOp::StrokeText {
                    placement,
                    color,
                    width,
                } => {
                    if batched {
                        self.flush_batch(surface);
                        batched = false;
                    }
                    self.draw_text(surface, placement, color, TextPaint::Stroke(width), shadow)?;
                }
                DrawOp::FillText { placement, color } => {
                    if batched {
                        self.flush_batch(surface);
                        batched = false;
                    }
                    self.draw_text(surface, placement, color, TextPaint::Fill, shadow)?;
                }
            }
        }

        if batched {
            self.flush_batch(surface);
        }
        Ok(())
    }

    fn draw_image(&mut self, image: ImageRef, dest: Rect, opacity: f32) -> StudioResult<()> {
        let paint = match image {
            ImageRef::Slide(i) => self.slides.get(i).ok_or_else(|| {
                StudioError::surface(format!("slide {i} is not loaded in the compositor"))
            })?,
            ImageRef::Logo => self
                .logo
                .as_ref()
                .ok_or_else(|| StudioError::surface("logo is not loaded in the compositor"))?,
        };
        let (iw, ih) = image_paint_size(paint);
        if iw <= 0.0 || ih <= 0.0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }

        let tr = Affine::translate(Vec2::new(dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / iw, dest.height() / ih);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(paint.clone());
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
        }
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        Ok(())
    }

    // vello_cpu renders into a fresh buffer, so batched image draws go through the scratch
    // pixmap and are composited over what the surface already holds.
    fn flush_batch(&mut self, surface: &mut Surface) {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.scratch);
        premul_over_in_place(surface.data_mut(), self.scratch.data_as_u8_slice(), 1.0);
        self.ctx.reset();
    }

    fn draw_text(
        &mut self,
        surface: &mut Surface,
        placement: TextPlacement,
        color: Rgba8Premul,
        paint: TextPaint,
        shadow: Option<ShadowStyle>,
    ) -> StudioResult<()> {
        let Some(caption) = self.caption.as_ref() else {
            return Err(StudioError::surface(
                "text op without a prepared caption in the compositor",
            ));
        };
        let stroke_pad = match paint {
            TextPaint::Stroke(w) => w / 2.0,
            TextPaint::Fill => 0.0,
        };
        let glyph_box = Rect::new(
            placement.origin.x,
            placement.origin.y,
            placement.origin.x + caption.width,
            placement.origin.y + caption.height,
        )
        .inflate(
            stroke_pad + GLYPH_AA_MARGIN_PX,
            stroke_pad + GLYPH_AA_MARGIN_PX,
        );

        if let Some(style) = shadow {
            let sigma = shadow_sigma(style.blur);
            let radius = radius_for_sigma(sigma);
            let spread = f64::from(radius);
            let region = glyph_box
                .with_origin(Point::new(
                    glyph_box.x0 + style.offset.x,
                    glyph_box.y0 + style.offset.y,
                ))
                .inflate(spread, spread);
            let kernel = cached_kernel(&mut self.shadow_kernel, radius, sigma)?;
            let origin = placement.origin + style.offset;
            if let Some(mut layer) = render_glyph_region(
                self.canvas,
                region,
                caption,
                origin,
                style.color,
                &paint,
            )? {
                blur_rgba8_premul_in_place(&mut layer.data, layer.width, layer.height, &kernel);
                layer.composite_onto(surface);
            }
        }

        if let Some(layer) = render_glyph_region(
            self.canvas,
            glyph_box,
            caption,
            placement.origin,
            color,
            &paint,
        )? {
            layer.composite_onto(surface);
        }
        Ok(())
    }
}

/// Premultiplied pixels of a sub-rectangle of the surface.
struct RegionLayer {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RegionLayer {
    fn composite_onto(&self, surface: &mut Surface) {
        let stride = surface.canvas().width as usize * 4;
        let row_len = self.width as usize * 4;
        let dst = surface.data_mut();
        for row in 0..self.height as usize {
            let d0 = (self.y as usize + row) * stride + self.x as usize * 4;
            let s0 = row * row_len;
            premul_over_in_place(
                &mut dst[d0..d0 + row_len],
                &self.data[s0..s0 + row_len],
                1.0,
            );
        }
    }
}

fn render_glyph_region(
    canvas: Canvas,
    region: Rect,
    caption: &PreparedText,
    origin: Point,
    color: Rgba8Premul,
    paint: &TextPaint,
) -> StudioResult<Option<RegionLayer>> {
    let bounds = Rect::new(0.0, 0.0, canvas.w(), canvas.h());
    let clipped = region.intersect(bounds);
    let x0 = clipped.x0.floor().max(0.0) as u32;
    let y0 = clipped.y0.floor().max(0.0) as u32;
    let x1 = (clipped.x1.ceil() as u32).min(canvas.width);
    let y1 = (clipped.y1.ceil() as u32).min(canvas.height);
    if x1 <= x0 || y1 <= y0 {
        return Ok(None);
    }
    let (w, h) = raster_dims(Canvas {
        width: x1 - x0,
        height: y1 - y0,
    })?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    let tr = Affine::translate(Vec2::new(
        origin.x - f64::from(x0),
        origin.y - f64::from(y0),
    ));
    ctx.set_transform(affine_to_cpu(tr));
    let [r, g, b, a] = color.to_straight_rgba();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    if let TextPaint::Stroke(width) = paint {
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
    }
    for (font_size, glyphs) in caption.glyph_runs() {
        let run = ctx.glyph_run(&caption.font).font_size(font_size);
        match paint {
            TextPaint::Stroke(_) => run.stroke_glyphs(glyphs.into_iter()),
            TextPaint::Fill => run.fill_glyphs(glyphs.into_iter()),
        }
    }
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    Ok(Some(RegionLayer {
        x: x0,
        y: y0,
        width: u32::from(w),
        height: u32::from(h),
        data: pixmap.data_as_u8_slice().to_vec(),
    }))
}

fn cached_kernel(
    cache: &mut Option<(u64, Arc<Vec<u32>>)>,
    radius: u32,
    sigma: f32,
) -> StudioResult<Arc<Vec<u32>>> {
    let key = (u64::from(radius) << 32) | u64::from(sigma.to_bits());
    if let Some((k, kernel)) = cache.as_ref()
        && *k == key
    {
        return Ok(kernel.clone());
    }
    let kernel = Arc::new(gaussian_kernel_q16(radius, sigma)?);
    *cache = Some((key, kernel.clone()));
    Ok(kernel)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint(img: &DecodedImage) -> StudioResult<vello_cpu::Image> {
    let pixmap = premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_paint_size(image: &vello_cpu::Image) -> (f64, f64) {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => (f64::from(p.width()), f64::from(p.height())),
        vello_cpu::ImageSource::OpaqueId(_) => (0.0, 0.0),
    }
}

pub(crate) fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StudioResult<vello_cpu::Pixmap> {
    let (w, h) = raster_dims(Canvas { width, height })
        .map_err(|e| StudioError::decode(format!("image cannot be painted: {e}")))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StudioError::decode("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
