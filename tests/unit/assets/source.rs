use super::*;

#[test]
fn from_bytes_roundtrips_through_data_uri() {
    let asset = ImageAsset::from_bytes("a.png", "image/png", &[1, 2, 3, 250]);
    assert!(asset.data.starts_with("data:image/png;base64,"));
    assert_eq!(asset.media_type(), Some("image/png"));
    assert_eq!(asset.decoded_bytes().unwrap(), vec![1, 2, 3, 250]);
    assert!(!asset.is_svg());
}

#[test]
fn plain_svg_data_uri_is_percent_decoded() {
    let asset = ImageAsset {
        name: "logo.svg".to_owned(),
        data: "data:image/svg+xml,%3Csvg%3E%3C/svg%3E".to_owned(),
    };
    assert!(asset.is_svg());
    assert_eq!(asset.decoded_bytes().unwrap(), b"<svg></svg>".to_vec());
}

#[test]
fn malformed_uri_is_a_decode_error() {
    let asset = ImageAsset {
        name: "x".to_owned(),
        data: "http://example.com/x.png".to_owned(),
    };
    let err = asset.decoded_bytes().unwrap_err();
    assert!(matches!(err, StudioError::Decode(_)));
    assert!(err.to_string().contains("'x'"));

    let asset = ImageAsset {
        name: "y".to_owned(),
        data: "data:image/png;base64,!!!".to_owned(),
    };
    assert!(matches!(
        asset.decoded_bytes().unwrap_err(),
        StudioError::Decode(_)
    ));
}

#[test]
fn media_type_follows_extension() {
    assert_eq!(media_type_for_path(Path::new("a/B.JPG")), "image/jpeg");
    assert_eq!(media_type_for_path(Path::new("logo.svg")), "image/svg+xml");
    assert_eq!(
        media_type_for_path(Path::new("noext")),
        "application/octet-stream"
    );
}

#[test]
fn from_path_reads_file_name() {
    let dir = std::env::temp_dir().join(format!("vo3_source_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let p = dir.join("pic.webp");
    std::fs::write(&p, [9u8, 8, 7]).unwrap();

    let asset = ImageAsset::from_path(&p).unwrap();
    assert_eq!(asset.name, "pic.webp");
    assert_eq!(asset.media_type(), Some("image/webp"));

    let audio = AudioSource::from_path(&p).unwrap();
    assert_eq!(&*audio.bytes, &[9, 8, 7]);

    std::fs::remove_dir_all(&dir).unwrap();
}
