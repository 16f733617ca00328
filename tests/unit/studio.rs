use std::cell::Cell;
use std::io::Cursor;

use super::*;
use crate::encode::sink::InMemoryEncoder;
use crate::factcheck::{AnalysisSource, FactCheckError, FactCheckFailure};
use crate::record::clock::SimulatedClock;

fn png(name: &str) -> ImageAsset {
    let img = image::RgbaImage::from_pixel(6, 4, image::Rgba([200, 100, 50, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageAsset::from_bytes(name, "image/png", &buf)
}

fn preview_dir() -> PathBuf {
    std::env::temp_dir().join(format!("vo3_studio_test_{}", uuid::Uuid::new_v4().simple()))
}

struct FakeAnalyzer {
    result: Result<AnalysisResult, &'static str>,
    calls: Cell<usize>,
}

impl ContentAnalyzer for FakeAnalyzer {
    fn analyze(&self, _title: &str, _subtitles: &str) -> Result<AnalysisResult, FactCheckError> {
        self.calls.set(self.calls.get() + 1);
        self.result
            .clone()
            .map_err(|m| FactCheckError::Upstream(m.to_owned()))
    }
}

#[test]
fn starts_ready_with_defaults() {
    let s = Studio::new(preview_dir());
    assert_eq!(s.status(), READY_STATUS);
    assert_eq!(s.title, "My VO3 Video");
    assert_eq!(s.seconds_per_image, 3.0);
    assert!(s.video().is_none());
}

#[test]
fn image_list_is_capped() {
    let mut s = Studio::new(preview_dir());
    assert_eq!(s.add_images((0..25).map(|i| png(&format!("{i}.png")))), 25);
    assert_eq!(s.add_images((0..10).map(|i| png(&format!("x{i}.png")))), 5);
    assert_eq!(s.images().len(), MAX_IMAGES);
    assert_eq!(s.status(), "5 image(s) added.");
    assert!(s.remove_image(100).is_none());
    assert!(s.remove_image(0).is_some());
    assert_eq!(s.images().len(), MAX_IMAGES - 1);
}

#[test]
fn generating_without_images_reports_error() {
    let dir = preview_dir();
    let mut s = Studio::new(&dir);
    let out = s.generate(
        InMemoryEncoder::new(),
        &mut SimulatedClock::new(),
        &CancellationToken::new(),
    );
    assert!(out.is_none());
    assert!(s.status().starts_with("Error: "), "{}", s.status());
    assert!(s.status().contains("no images"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn successful_generation_publishes_and_supersedes() {
    let dir = preview_dir();
    let mut s = Studio::new(&dir);
    s.seconds_per_image = 1.0;
    s.add_images([png("a.png"), png("b.png")]);

    let first = s
        .generate(
            InMemoryEncoder::new(),
            &mut SimulatedClock::new(),
            &CancellationToken::new(),
        )
        .map(|h| h.path().to_path_buf())
        .unwrap();
    assert_eq!(s.status(), "Preview generated successfully!");
    assert!(s
        .status_history()
        .iter()
        .any(|l| l == "Rendering frame 2 of 2..."));
    assert_eq!(s.video().unwrap().artifact().frame_count, 60);

    let second = s
        .generate(
            InMemoryEncoder::new(),
            &mut SimulatedClock::new(),
            &CancellationToken::new(),
        )
        .map(|h| h.path().to_path_buf())
        .unwrap();
    assert!(!first.exists());
    assert!(second.exists());

    s.title = "Trip  to Rome".to_owned();
    let saved_dir = dir.join("out");
    let saved = s.save_video(&saved_dir).unwrap().unwrap();
    assert_eq!(saved, saved_dir.join("Trip_to_Rome.webm"));
    assert!(saved.exists());

    drop(s);
    assert!(!second.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_generation_drops_previous_video() {
    let dir = preview_dir();
    let mut s = Studio::new(&dir);
    s.seconds_per_image = 1.0;
    s.add_images([png("a.png")]);
    let first = s
        .generate(
            InMemoryEncoder::new(),
            &mut SimulatedClock::new(),
            &CancellationToken::new(),
        )
        .map(|h| h.path().to_path_buf())
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(s
        .generate(InMemoryEncoder::new(), &mut SimulatedClock::new(), &cancel)
        .is_none());
    assert_eq!(s.status(), "Error: render cancelled");
    assert!(!first.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn analysis_success_and_failure_update_status() {
    let mut s = Studio::new(preview_dir());
    let ok = FakeAnalyzer {
        result: Ok(AnalysisResult {
            text: "Looks right.".to_owned(),
            sources: vec![AnalysisSource {
                uri: "https://a.example".to_owned(),
                title: "A".to_owned(),
            }],
        }),
        calls: Cell::new(0),
    };
    assert!(matches!(s.analyze(&ok), FactCheckOutcome::Analysis(_)));
    assert_eq!(s.status(), "Content analysis complete.");
    assert_eq!(s.analysis().map(|a| a.sources.len()), Some(1));

    let bad = FakeAnalyzer {
        result: Err("quota exceeded"),
        calls: Cell::new(0),
    };
    let outcome = s.analyze(&bad);
    assert!(matches!(
        outcome,
        FactCheckOutcome::Failed {
            kind: FactCheckFailure::Upstream,
            ..
        }
    ));
    assert_eq!(s.status(), "Analysis Error: quota exceeded");
    assert!(s.analysis().is_none());
}

#[test]
fn empty_analysis_request_skips_the_analyzer() {
    let mut s = Studio::new(preview_dir());
    s.title.clear();
    let fake = FakeAnalyzer {
        result: Err("unused"),
        calls: Cell::new(0),
    };
    let outcome = s.analyze(&fake);
    assert_eq!(fake.calls.get(), 0);
    assert!(matches!(
        outcome,
        FactCheckOutcome::Failed {
            kind: FactCheckFailure::NothingToAnalyze,
            ..
        }
    ));
    assert_eq!(s.status(), "Please provide a title or subtitles to analyze.");
}
