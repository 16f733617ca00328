use super::*;

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "vo3_config_test_{}",
        uuid::Uuid::new_v4().simple()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, w: u32, h: u32) {
    image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
        .save(path)
        .unwrap();
}

#[test]
fn defaults_match_studio() {
    let cfg: ProjectConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg.title, "My VO3 Video");
    assert_eq!(cfg.seconds_per_image, 3.0);
    assert_eq!(cfg.fps, Fps::CAPTURE);
    assert_eq!(cfg.overlay.font_size, 48);
    assert_eq!(cfg.overlay.color, "#FFFFFF");
    assert!(cfg.validate().is_ok());
}

#[test]
fn overlay_position_parses_from_json() {
    let cfg: ProjectConfig = serde_json::from_str(
        r#"{"overlay": {"text": "Hi", "position": "top-left", "font_size": 64}}"#,
    )
    .unwrap();
    assert_eq!(
        cfg.overlay.position,
        crate::render::overlay::OverlayPosition::TopLeft
    );
    assert_eq!(cfg.overlay.font_size, 64);
    assert_eq!(cfg.overlay.color, "#FFFFFF");
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(ProjectConfig::from_reader(r#"{"titel": "x"}"#.as_bytes()).is_err());
}

#[test]
fn limits_are_enforced() {
    let too_many = ProjectConfig {
        images: vec!["a.png".to_owned(); 31],
        ..ProjectConfig::default()
    };
    assert!(too_many.validate().is_err());

    for d in [0.5, 10.5, f64::NAN] {
        let cfg = ProjectConfig {
            seconds_per_image: d,
            ..ProjectConfig::default()
        };
        assert!(cfg.validate().is_err(), "{d}");
    }

    let mut cfg = ProjectConfig::default();
    cfg.overlay.font_size = 129;
    assert!(cfg.validate().is_err());
    cfg.overlay.font_size = 16;
    assert!(cfg.validate().is_ok());
}

#[test]
fn traversal_paths_are_rejected() {
    assert!(normalize_rel_path("../secret.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
    assert_eq!(normalize_rel_path("./img\\a.png").unwrap(), "img/a.png");
}

#[test]
fn into_request_reads_assets_relative_to_root() {
    let root = scratch_dir();
    std::fs::create_dir_all(root.join("img")).unwrap();
    write_png(&root.join("img/one.png"), 4, 3);
    write_png(&root.join("img/two.png"), 2, 2);
    write_png(&root.join("logo.png"), 1, 1);

    let cfg = ProjectConfig {
        images: vec!["img/one.png".to_owned(), "./img/two.png".to_owned()],
        logo: Some("logo.png".to_owned()),
        seconds_per_image: 1.5,
        ..ProjectConfig::default()
    };
    let req = cfg.into_request(&root).unwrap();
    assert_eq!(req.images.len(), 2);
    assert_eq!(req.images[0].media_type(), Some("image/png"));
    assert!(req.logo.is_some());
    assert!(req.audio.is_none());
    assert_eq!(req.seconds_per_image, 1.5);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_asset_fails_into_request() {
    let root = scratch_dir();
    let cfg = ProjectConfig {
        images: vec!["nope.png".to_owned()],
        ..ProjectConfig::default()
    };
    assert!(cfg.into_request(&root).is_err());
    let _ = std::fs::remove_dir_all(&root);
}
