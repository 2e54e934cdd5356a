//! Integration tests for complete augmentation and filtering workflows
//!
//! Video I/O goes through the in-memory backend; annotation files live in temporary
//! directories.

use clipaug::{
    backends::{FrameRate, MemoryBackend, VideoMetadata},
    config::{AugmentConfig, FilterConfig},
    error::Result,
    filter::run_existence_filter,
    processor::{run_augmentation, FrameTransformer, TransformOutcome},
    transform::TransformVariant,
    AnnotationMap, VideoCodec,
};
use image::{Rgb, RgbImage};
use std::path::Path;
use tempfile::TempDir;

const WIDTH: u32 = 96;
const HEIGHT: u32 = 48;

fn test_metadata() -> VideoMetadata {
    VideoMetadata::new(WIDTH, HEIGHT, FrameRate::new(25, 1))
}

/// Frames with a horizontal gradient so shifts are observable
fn test_frames(count: usize) -> Vec<RgbImage> {
    (0..count)
        .map(|i| {
            RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
                Rgb([(x * 2) as u8, (y * 5) as u8, (i * 10) as u8 + 5])
            })
        })
        .collect()
}

fn write_json(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

fn read_mapping(path: &Path) -> AnnotationMap {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn augment_config(dir: &TempDir, threshold: usize) -> AugmentConfig {
    AugmentConfig::builder()
        .annotation_file(dir.path().join("annotation_dict.json"))
        .labels_file(dir.path().join("labels_dict.json"))
        .data_dir(dir.path().join("examples"))
        .output_dir(dir.path().join("augmented-examples"))
        .output_file(dir.path().join("augmented_annotation_dict.json"))
        .threshold(threshold)
        .build()
        .unwrap()
}

#[test]
fn test_full_augmentation_workflow() -> Result<()> {
    let dir = TempDir::new()?;
    write_json(
        &dir.path().join("annotation_dict.json"),
        r#"{"s1": 0, "s2": 0, "s3": 0, "p1": 1, "b1": 2}"#,
    );
    write_json(
        &dir.path().join("labels_dict.json"),
        r#"{"0": "shoot", "1": "pass", "2": "block"}"#,
    );

    let config = augment_config(&dir, 2);
    let backend = MemoryBackend::new();
    for id in ["s1", "s2", "s3", "p1", "b1"] {
        backend.insert_clip(config.source_path(id), test_metadata(), test_frames(3));
    }

    let report = run_augmentation(config.clone(), Box::new(backend.clone()))?;
    assert_eq!(report.videos_considered, 5);
    assert_eq!(report.videos_augmented, 2);
    assert_eq!(report.derived_written, 8);
    assert_eq!(report.sources_skipped, 0);
    assert!(report.selected_labels.contains("pass"));
    assert!(report.selected_labels.contains("block"));
    assert!(!report.selected_labels.contains("shoot"));

    // Only new entries, in generation order
    let written = read_mapping(&config.output_file);
    let keys: Vec<&str> = written.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "p1_rotate_30",
            "p1_rotate_330",
            "p1_translate_32_0",
            "p1_translate_-32_0",
            "b1_rotate_30",
            "b1_rotate_330",
            "b1_translate_32_0",
            "b1_translate_-32_0",
        ]
    );
    assert_eq!(written.get("p1_rotate_30"), Some(&1));
    assert_eq!(written.get("b1_translate_-32_0"), Some(&2));

    // One derived clip per entry, same geometry and rate as the source
    for key in written.keys() {
        let clip = backend
            .written_clip(config.output_path(key))
            .expect("derived clip written");
        assert!(clip.finalized);
        assert_eq!(clip.frames.len(), 3);
        assert_eq!(clip.metadata, test_metadata());
        assert_eq!(clip.codec, VideoCodec::Mpeg4);
    }

    let shifted = backend
        .written_clip(config.output_path("p1_translate_-32_0"))
        .unwrap();
    let source = &test_frames(3)[1];
    assert_eq!(shifted.frames[1].get_pixel(0, 7), source.get_pixel(32, 7));
    assert_eq!(shifted.frames[1].get_pixel(WIDTH - 1, 7), &Rgb([0, 0, 0]));

    Ok(())
}

#[test]
fn test_merged_label_names_exceed_threshold() -> Result<()> {
    let dir = TempDir::new()?;
    write_json(&dir.path().join("annotation_dict.json"), r#"{"v1": 0, "v2": 1}"#);
    write_json(
        &dir.path().join("labels_dict.json"),
        r#"{"0": "dribble", "1": "dribble"}"#,
    );

    let config = augment_config(&dir, 1);
    let backend = MemoryBackend::new();
    backend.insert_clip(config.source_path("v1"), test_metadata(), test_frames(1));
    backend.insert_clip(config.source_path("v2"), test_metadata(), test_frames(1));

    let report = run_augmentation(config.clone(), Box::new(backend.clone()))?;
    assert!(report.augmented.is_empty());
    assert!(backend.written_paths().is_empty());
    assert_eq!(std::fs::read_to_string(&config.output_file)?, "{}");
    Ok(())
}

#[test]
fn test_missing_source_is_skipped_and_run_continues() -> Result<()> {
    let dir = TempDir::new()?;
    write_json(
        &dir.path().join("annotation_dict.json"),
        r#"{"gone": 4, "here": 4}"#,
    );
    write_json(&dir.path().join("labels_dict.json"), r#"{"4": "steal"}"#);

    let config = augment_config(&dir, 10);
    let backend = MemoryBackend::new();
    backend.insert_clip(config.source_path("here"), test_metadata(), test_frames(2));

    let report = run_augmentation(config.clone(), Box::new(backend.clone()))?;
    assert_eq!(report.sources_skipped, 1);
    assert_eq!(report.derived_written, 4);
    // Entries for the missing clip are still recorded
    assert_eq!(report.augmented.len(), 8);
    assert!(report.augmented.contains_key("gone_rotate_330"));

    let paths = backend.written_paths();
    assert_eq!(paths.len(), 4);
    assert!(paths
        .iter()
        .all(|p| p.file_name().unwrap().to_string_lossy().starts_with("here_")));
    Ok(())
}

#[test]
fn test_output_file_is_overwritten() -> Result<()> {
    let dir = TempDir::new()?;
    write_json(&dir.path().join("annotation_dict.json"), r#"{"a": 0}"#);
    write_json(&dir.path().join("labels_dict.json"), r#"{"0": "run"}"#);

    let config = augment_config(&dir, 5);
    write_json(&config.output_file, r#"{"stale_rotate_30": 9}"#);

    let backend = MemoryBackend::new();
    backend.insert_clip(config.source_path("a"), test_metadata(), test_frames(1));
    run_augmentation(config.clone(), Box::new(backend))?;

    let written = read_mapping(&config.output_file);
    assert_eq!(written.len(), 4);
    assert!(!written.contains_key("stale_rotate_30"));
    Ok(())
}

#[test]
fn test_zero_rotation_preserves_clip() -> Result<()> {
    let backend = MemoryBackend::new();
    let frames = test_frames(6);
    backend.insert_clip("in/clip.mp4", test_metadata(), frames.clone());

    let transformer = FrameTransformer::new(&backend, VideoCodec::Mpeg4);
    let outcome = transformer.transform(
        Path::new("in/clip.mp4"),
        Path::new("out/clip_rotate_0.mp4"),
        TransformVariant::Rotate { degrees: 0 },
    )?;
    assert!(matches!(outcome, TransformOutcome::Written { frames: 6, .. }));

    let clip = backend.written_clip("out/clip_rotate_0.mp4").unwrap();
    assert_eq!(clip.metadata.dimensions(), (WIDTH, HEIGHT));
    assert_eq!(clip.frames, frames);
    Ok(())
}

#[test]
fn test_existence_filter_workflow() -> Result<()> {
    let dir = TempDir::new()?;
    let videos = dir.path().join("examples");
    std::fs::create_dir_all(&videos)?;
    std::fs::write(videos.join("v1.mp4"), b"not really a video")?;

    let annotation_file = dir.path().join("annotation_dict.json");
    write_json(&annotation_file, r#"{"v1": 0, "v2": 1}"#);

    let config = FilterConfig::builder()
        .annotation_file(&annotation_file)
        .video_dir(&videos)
        .output_file(dir.path().join("out/filtered_annotation.json"))
        .build()?;

    let report = run_existence_filter(&config)?;
    assert_eq!(report.kept, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(
        std::fs::read_to_string(&config.output_file)?,
        "{\n  \"v1\": 0\n}"
    );

    // Keys are a subset of the input, each backed by a file
    let filtered = read_mapping(&config.output_file);
    let original = read_mapping(&annotation_file);
    for key in filtered.keys() {
        assert!(original.contains_key(key));
        assert!(videos.join(format!("{key}.mp4")).exists());
    }
    Ok(())
}
