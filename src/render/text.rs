use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{StudioError, StudioResult};

/// Fonts tried, in order, when a caption is requested without an explicit font file.
pub const FALLBACK_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Pick the font file for a caption: the configured one, else the first fallback that exists.
pub fn resolve_font_path(configured: Option<&Path>) -> StudioResult<PathBuf> {
    if let Some(p) = configured {
        if p.is_file() {
            return Ok(p.to_path_buf());
        }
        return Err(StudioError::validation(format!(
            "font file '{}' does not exist",
            p.display()
        )));
    }
    FALLBACK_FONT_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or_else(|| {
            StudioError::validation(
                "no usable font found for the text overlay; set a font path explicitly",
            )
        })
}

pub(crate) fn load_font_bytes(path: &Path) -> StudioResult<Arc<Vec<u8>>> {
    let bytes = std::fs::read(path).map_err(|e| {
        StudioError::validation(format!("read font '{}': {e}", path.display()))
    })?;
    if bytes.is_empty() {
        return Err(StudioError::validation(format!(
            "font '{}' is empty",
            path.display()
        )));
    }
    Ok(Arc::new(bytes))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape one caption as a single unbroken line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
    ) -> StudioResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StudioError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StudioError::validation("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StudioError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::default()));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// A caption shaped once per render and reused for every frame.
pub(crate) struct PreparedText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl std::fmt::Debug for PreparedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedText")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PreparedText {
    #[tracing::instrument(skip(font_bytes), fields(font_len = font_bytes.len()))]
    pub(crate) fn shape(text: &str, font_bytes: Arc<Vec<u8>>, size_px: f64) -> StudioResult<Self> {
        let line = single_line(text);
        let mut engine = TextLayoutEngine::new();
        let layout = engine.layout_line(&line, font_bytes.as_slice(), size_px as f32)?;
        let width = f64::from(layout.width());
        let height = f64::from(layout.height());
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
            0,
        );
        Ok(Self {
            layout,
            font,
            width,
            height,
        })
    }

    /// Every glyph run as (font size, glyphs), positioned relative to the line box top-left.
    pub(crate) fn glyph_runs(&self) -> Vec<(f32, Vec<vello_cpu::Glyph>)> {
        let mut out = Vec::new();
        for line in self.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                // Positioned glyphs carry line-absolute x and the baseline y.
                let glyphs = run
                    .positioned_glyphs()
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                out.push((run.run().font_size(), glyphs));
            }
        }
        out
    }
}

/// Line breaks and other vertical whitespace drawn as spaces, so a caption is always one line.
pub(crate) fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' | '\u{0B}' | '\u{0C}' | '\u{2028}' | '\u{2029}' => ' ',
            c => c,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
