use crate::foundation::error::{StudioError, StudioResult};

// Avoid pathological allocations from hostile or mis-sized documents.
const MAX_DIM: u32 = 16_384;

pub(crate) fn parse_svg(bytes: &[u8]) -> StudioResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| StudioError::decode(format!("parse svg tree: {e}")))
}

/// Intrinsic size of an SVG document, rounded up to whole pixels.
pub(crate) fn svg_intrinsic_size(tree: &usvg::Tree) -> StudioResult<(u32, u32)> {
    fn to_px(v: f32) -> StudioResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(StudioError::decode("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    Ok((to_px(size.width())?, to_px(size.height())?))
}

/// Raster size for an SVG, optionally re-scaled to `width_hint` pixels wide.
///
/// Logos are drawn much smaller or larger than their intrinsic size; rasterizing at the drawn
/// width avoids blurry resampling.
pub(crate) fn svg_raster_size(
    tree: &usvg::Tree,
    width_hint: Option<u32>,
) -> StudioResult<(u32, u32)> {
    let (base_w, base_h) = svg_intrinsic_size(tree)?;
    let (w, h) = match width_hint {
        Some(hint) if hint > 0 => {
            let s = f64::from(hint) / f64::from(base_w);
            (hint, ((f64::from(base_h) * s).ceil() as u32).max(1))
        }
        _ => (base_w, base_h),
    };
    if w > MAX_DIM || h > MAX_DIM {
        return Err(StudioError::decode(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

/// Rasterize into premultiplied RGBA8 (tiny-skia's native layout).
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StudioResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StudioError::decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
