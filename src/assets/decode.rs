use std::io::Cursor;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::source::ImageAsset;
use crate::assets::svg::{
    parse_svg, rasterize_svg_to_premul_rgba8, svg_intrinsic_size, svg_raster_size,
};
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// A drawable image in premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Name of the asset this was decoded from.
    pub name: String,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 pixels.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded raster bytes (PNG, JPEG, WebP, ...) and convert to premultiplied RGBA8.
pub fn decode_image(name: &str, bytes: &[u8]) -> StudioResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| StudioError::decode(format!("image '{name}': {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        name: name.to_owned(),
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Decode one asset. SVG documents are rasterized, at `svg_width_hint` pixels wide when given.
pub fn decode_image_asset(
    asset: &ImageAsset,
    svg_width_hint: Option<u32>,
) -> StudioResult<DecodedImage> {
    let bytes = asset.decoded_bytes()?;
    if asset.is_svg() {
        let tree = parse_svg(&bytes)?;
        let (width, height) = svg_raster_size(&tree, svg_width_hint)?;
        let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, width, height)?;
        return Ok(DecodedImage {
            name: asset.name.clone(),
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        });
    }
    decode_image(&asset.name, &bytes)
}

/// Read only the natural dimensions of an asset (header only, no pixel decode).
pub fn read_dimensions(asset: &ImageAsset) -> StudioResult<(u32, u32)> {
    let bytes = asset.decoded_bytes()?;
    if asset.is_svg() {
        let tree = parse_svg(&bytes)?;
        return svg_intrinsic_size(&tree);
    }
    image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| StudioError::decode(format!("image '{}': {e}", asset.name)))?
        .into_dimensions()
        .map_err(|e| StudioError::decode(format!("image '{}': {e}", asset.name)))
}

/// Decode every asset concurrently; results keep the input order.
#[tracing::instrument(skip_all, fields(count = assets.len()))]
pub fn decode_images(assets: &[ImageAsset]) -> StudioResult<Vec<DecodedImage>> {
    assets
        .par_iter()
        .map(|asset| decode_image_asset(asset, None))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
