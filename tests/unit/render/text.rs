use super::*;

fn any_font() -> Option<PathBuf> {
    resolve_font_path(None).ok()
}

#[test]
fn missing_configured_font_is_validation_error() {
    let err = resolve_font_path(Some(Path::new("/definitely/not/here.ttf"))).unwrap_err();
    assert!(matches!(err, StudioError::Validation(_)));
}

#[test]
fn configured_font_wins_when_present() {
    let Some(font) = any_font() else {
        return;
    };
    assert_eq!(resolve_font_path(Some(&font)).unwrap(), font);
}

#[test]
fn shaped_caption_has_positive_extent() {
    let Some(font) = any_font() else {
        return;
    };
    let bytes = load_font_bytes(&font).unwrap();
    let short = PreparedText::shape("Hi", bytes.clone(), 48.0).unwrap();
    assert!(short.width > 0.0);
    assert!(short.height > 0.0);
    assert!(!short.glyph_runs().is_empty());

    let long = PreparedText::shape("Hi there, friend", bytes, 48.0).unwrap();
    assert!(long.width > short.width);
    assert_eq!(long.layout.lines().count(), 1);
}

#[test]
fn bad_font_size_is_rejected() {
    let mut engine = TextLayoutEngine::new();
    assert!(engine.layout_line("x", b"not a font", 0.0).is_err());
    assert!(engine.layout_line("x", b"not a font", 12.0).is_err());
}

#[test]
fn glyphs_advance_along_the_line() {
    let Some(font) = any_font() else {
        return;
    };
    let bytes = load_font_bytes(&font).unwrap();
    let text = PreparedText::shape("HHHH", bytes, 48.0).unwrap();
    let glyphs: Vec<vello_cpu::Glyph> = text
        .glyph_runs()
        .into_iter()
        .flat_map(|(_, g)| g)
        .collect();
    assert_eq!(glyphs.len(), 4);
    for pair in glyphs.windows(2) {
        assert!(pair[1].x > pair[0].x, "{:?} then {:?}", pair[0].x, pair[1].x);
    }
    let last = glyphs[3].x as f64;
    assert!(last > text.width * 0.5, "last glyph at {last}, line {}", text.width);
    // Baselines sit inside the line box, below its top edge.
    for g in &glyphs {
        let y = g.y as f64;
        assert!(y > text.height * 0.3 && y <= text.height, "baseline {y}, line {}", text.height);
    }
}

#[test]
fn line_breaks_are_drawn_as_spaces() {
    assert_eq!(single_line("a\nb\r\nc\td"), "a b  c d");
    let Some(font) = any_font() else {
        return;
    };
    let bytes = load_font_bytes(&font).unwrap();
    let broken = PreparedText::shape("Hello\nworld", bytes.clone(), 32.0).unwrap();
    let spaced = PreparedText::shape("Hello world", bytes, 32.0).unwrap();
    assert_eq!(broken.layout.lines().count(), 1);
    assert!((broken.width - spaced.width).abs() < 0.5);
    assert!((broken.height - spaced.height).abs() < 0.5);
}
