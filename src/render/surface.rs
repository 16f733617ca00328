use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{StudioError, StudioResult};

/// Output surface size for a first image of natural size `width`×`height`.
///
/// Each axis is clamped to [`Canvas::MAX`]; an axis reporting zero falls back to
/// [`Canvas::FALLBACK`].
pub fn surface_size_for(width: u32, height: u32) -> Canvas {
    let width = if width == 0 {
        Canvas::FALLBACK.width
    } else {
        width.min(Canvas::MAX.width)
    };
    let height = if height == 0 {
        Canvas::FALLBACK.height
    } else {
        height.min(Canvas::MAX.height)
    };
    Canvas { width, height }
}

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Copy out as a straight-alpha `image` buffer, e.g. for PNG export.
    pub fn to_rgba_image(&self) -> StudioResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            for px in data.chunks_exact_mut(4) {
                let straight = Rgba8Premul {
                    r: px[0],
                    g: px[1],
                    b: px[2],
                    a: px[3],
                }
                .to_straight_rgba();
                px.copy_from_slice(&straight);
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| StudioError::surface("frame buffer length does not match its size"))
    }
}

/// Raster target for one render. Size is fixed at creation.
pub struct Surface {
    canvas: Canvas,
    pub(crate) pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}

impl Surface {
    pub fn new(canvas: Canvas) -> StudioResult<Self> {
        let (w, h) = raster_dims(canvas)?;
        Ok(Self {
            canvas,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Premultiplied RGBA8 bytes of the current contents.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub fn fill(&mut self, color: Rgba8Premul) {
        let rgba = [color.r, color.g, color.b, color.a];
        for px in self.data_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }
}

/// Validate that `canvas` can back a raster context.
pub(crate) fn raster_dims(canvas: Canvas) -> StudioResult<(u16, u16)> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(StudioError::surface(format!(
            "cannot allocate a {}x{} surface",
            canvas.width, canvas.height
        )));
    }
    let w: u16 = canvas.width.try_into().map_err(|_| {
        StudioError::surface(format!("surface width {} exceeds u16", canvas.width))
    })?;
    let h: u16 = canvas.height.try_into().map_err(|_| {
        StudioError::surface(format!("surface height {} exceeds u16", canvas.height))
    })?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
