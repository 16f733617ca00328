use super::*;
use crate::render::overlay::{OverlayPosition, TextOverlayConfig, overlay_anchor};

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

fn caption(text: &str, position: OverlayPosition, c: Canvas) -> Option<CaptionLayout> {
    let cfg = TextOverlayConfig {
        text: text.to_owned(),
        position,
        ..TextOverlayConfig::default()
    };
    cfg.resolve(c).unwrap().map(|overlay| CaptionLayout {
        overlay,
        width: 100.0,
        height: 40.0,
    })
}

#[test]
fn cover_fit_wide_image_on_landscape_canvas() {
    // 2000x500 on 1280x720: height-bound, scale 1.44.
    let r = cover_fit(canvas(1280, 720), 2000, 500);
    assert!((r.width() - 2880.0).abs() < 1e-9);
    assert!((r.height() - 720.0).abs() < 1e-9);
    assert!((r.x0 - (1280.0 - 2880.0) / 2.0).abs() < 1e-9);
    assert_eq!(r.y0, 0.0);
}

#[test]
fn cover_fit_never_leaves_gaps() {
    let c = canvas(1280, 720);
    for (w, h) in [(1, 1), (640, 480), (3000, 100), (100, 3000), (1280, 720)] {
        let r = cover_fit(c, w, h);
        assert!(r.x0 <= 1e-9 && r.y0 <= 1e-9, "{w}x{h}: {r:?}");
        assert!(r.x1 >= c.w() - 1e-9 && r.y1 >= c.h() - 1e-9, "{w}x{h}: {r:?}");
        // Centered: equal overflow on both sides.
        assert!((r.x0 + (r.x1 - c.w())).abs() < 1e-9);
        assert!((r.y0 + (r.y1 - c.h())).abs() < 1e-9);
    }
}

#[test]
fn logo_width_is_capped_and_aspect_preserved() {
    let big = logo_rect(canvas(1920, 1080), 400, 200);
    assert_eq!(big.width(), 200.0);
    assert_eq!(big.height(), 100.0);
    assert_eq!((big.x1, big.y1), (1900.0, 1060.0));

    let small = logo_rect(canvas(500, 400), 100, 100);
    assert!((small.width() - 90.0).abs() < 1e-9);
    assert!((small.height() - 90.0).abs() < 1e-9);
    assert!((small.x1 - 480.0).abs() < 1e-9);
    assert!((small.y1 - 380.0).abs() < 1e-9);
}

#[test]
fn text_origin_follows_alignment() {
    let c = canvas(1000, 500);
    let tl = text_origin(overlay_anchor(OverlayPosition::TopLeft, c), 100.0, 40.0);
    assert_eq!((tl.x, tl.y), (30.0, 30.0));
    let mc = text_origin(overlay_anchor(OverlayPosition::MiddleCenter, c), 100.0, 40.0);
    assert_eq!((mc.x, mc.y), (450.0, 230.0));
    let br = text_origin(overlay_anchor(OverlayPosition::BottomRight, c), 100.0, 40.0);
    assert_eq!((br.x, br.y), (870.0, 430.0));
}

#[test]
fn full_frame_op_order() {
    let c = canvas(1280, 720);
    let layout = FrameLayout {
        canvas: c,
        slides: vec![(640, 480), (800, 800)],
        logo: Some((50, 50)),
        caption: caption("Hi", OverlayPosition::TopLeft, c),
    };
    let plan = compile_frame(&layout, 1);
    assert_eq!(plan.slide, 1);
    let kinds: Vec<&str> = plan
        .ops
        .iter()
        .map(|op| match op {
            DrawOp::Clear { .. } => "clear",
            DrawOp::DrawImage {
                image: ImageRef::Slide(1),
                ..
            } => "slide",
            DrawOp::DrawImage {
                image: ImageRef::Logo,
                ..
            } => "logo",
            DrawOp::DrawImage { .. } => "other-image",
            DrawOp::PushShadow(_) => "push-shadow",
            DrawOp::StrokeText { .. } => "stroke",
            DrawOp::FillText { .. } => "fill",
            DrawOp::PopShadow => "pop-shadow",
        })
        .collect();
    assert_eq!(
        kinds,
        [
            "clear",
            "slide",
            "logo",
            "push-shadow",
            "stroke",
            "fill",
            "pop-shadow"
        ]
    );

    let DrawOp::DrawImage { opacity, .. } = plan.ops[2] else {
        panic!("expected logo draw");
    };
    assert_eq!(opacity, LOGO_OPACITY);

    let DrawOp::PushShadow(shadow) = plan.ops[3] else {
        panic!("expected shadow");
    };
    assert_eq!(shadow.blur, 10.0);
    assert_eq!(shadow.offset, Vec2::new(2.0, 2.0));
    assert_eq!(shadow.color.a, 179);
}

#[test]
fn top_left_caption_places_text_at_padding() {
    let c = canvas(1280, 720);
    let layout = FrameLayout {
        canvas: c,
        slides: vec![(10, 10); 3],
        logo: None,
        caption: caption("Hi", OverlayPosition::TopLeft, c),
    };
    for i in 0..3 {
        let plan = compile_frame(&layout, i);
        let texts: Vec<_> = plan.text_ops().collect();
        assert_eq!(texts.len(), 2);
        for op in texts {
            let (DrawOp::StrokeText { placement, .. } | DrawOp::FillText { placement, .. }) = op
            else {
                unreachable!()
            };
            assert_eq!((placement.anchor.x, placement.anchor.y), (30.0, 30.0));
            assert_eq!(placement.anchor.align, HAlign::Start);
            assert_eq!(placement.anchor.baseline, VBaseline::Top);
            assert_eq!(placement.origin, Point::new(30.0, 30.0));
        }
    }
}

#[test]
fn blank_caption_yields_no_text_ops() {
    let c = canvas(320, 240);
    let layout = FrameLayout {
        canvas: c,
        slides: vec![(320, 240); 4],
        logo: None,
        caption: caption("   ", OverlayPosition::BottomCenter, c),
    };
    assert!(layout.caption.is_none());
    for i in 0..4 {
        let plan = compile_frame(&layout, i);
        assert_eq!(plan.text_ops().count(), 0);
        assert!(!plan.ops.iter().any(|op| matches!(op, DrawOp::PushShadow(_))));
    }
}

#[test]
fn shadow_is_closed_within_each_frame() {
    let c = canvas(320, 240);
    let layout = FrameLayout {
        canvas: c,
        slides: vec![(320, 240); 2],
        logo: None,
        caption: caption("x", OverlayPosition::MiddleCenter, c),
    };
    let plan = compile_frame(&layout, 0);
    let push = plan
        .ops
        .iter()
        .position(|op| matches!(op, DrawOp::PushShadow(_)))
        .unwrap();
    let pop = plan
        .ops
        .iter()
        .position(|op| matches!(op, DrawOp::PopShadow))
        .unwrap();
    assert!(push < pop);
    assert_eq!(pop, plan.ops.len() - 1);
    let first_image = plan
        .ops
        .iter()
        .position(|op| matches!(op, DrawOp::DrawImage { .. }))
        .unwrap();
    assert!(first_image < push);
}
