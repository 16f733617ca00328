use super::*;

#[test]
fn size_clamps_to_full_hd() {
    assert_eq!(
        surface_size_for(4000, 3000),
        Canvas {
            width: 1920,
            height: 1080
        }
    );
    assert_eq!(
        surface_size_for(800, 600),
        Canvas {
            width: 800,
            height: 600
        }
    );
}

#[test]
fn zero_axes_fall_back_independently() {
    assert_eq!(
        surface_size_for(0, 0),
        Canvas {
            width: 1280,
            height: 720
        }
    );
    assert_eq!(
        surface_size_for(500, 0),
        Canvas {
            width: 500,
            height: 720
        }
    );
    assert_eq!(
        surface_size_for(0, 2000),
        Canvas {
            width: 1280,
            height: 1080
        }
    );
}

#[test]
fn zero_surface_is_a_surface_error() {
    let err = Surface::new(Canvas {
        width: 0,
        height: 10,
    })
    .unwrap_err();
    assert!(matches!(err, StudioError::Surface(_)));
}

#[test]
fn oversized_surface_is_a_surface_error() {
    let err = Surface::new(Canvas {
        width: 70_000,
        height: 10,
    })
    .unwrap_err();
    assert!(matches!(err, StudioError::Surface(_)));
}

#[test]
fn fill_and_snapshot() {
    let mut s = Surface::new(Canvas {
        width: 3,
        height: 2,
    })
    .unwrap();
    s.fill(Rgba8Premul::black());
    let f = s.snapshot();
    assert_eq!((f.width, f.height), (3, 2));
    assert!(f.premultiplied);
    assert_eq!(f.data.len(), 3 * 2 * 4);
    assert!(f.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn to_rgba_image_unpremultiplies() {
    let f = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    let img = f.to_rgba_image().unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [128, 0, 0, 128]);
}
