//! Augmentation driver and per-clip frame transformer
//!
//! [`AugmentationProcessor`] walks the annotation mapping in order. Every entry whose label
//! is under-represented gets four derived entries, and [`FrameTransformer`] renders one
//! derived clip per variant through the configured [`VideoBackend`].

use crate::{
    annotations::{resolve_label, AnnotationMap, LabelMap},
    backends::video::{VideoBackend, VideoCodec},
    config::AugmentConfig,
    error::{AugmentError, Result},
    selection::select_under_represented,
    services::{AnnotationIO, JsonStyle, NoOpProgressReporter, ProgressReporter, ProgressUpdate},
    tracing_config::spans,
    transform::{TransformVariant, AUGMENTATION_VARIANTS},
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Result of transforming one clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// The derived clip was written
    Written { path: PathBuf, frames: u64 },
    /// The source could not be opened; nothing was written
    SourceUnavailable,
}

/// Renders a derived clip by warping every frame of a source clip
pub struct FrameTransformer<'a> {
    backend: &'a dyn VideoBackend,
    codec: VideoCodec,
}

impl<'a> FrameTransformer<'a> {
    pub fn new(backend: &'a dyn VideoBackend, codec: VideoCodec) -> Self {
        Self { backend, codec }
    }

    /// Decode `source`, apply `variant` to each frame and encode the result to
    /// `destination` at the source resolution and frame rate.
    ///
    /// A source that cannot be opened is logged and reported as
    /// [`TransformOutcome::SourceUnavailable`]. Any later failure is returned as an error;
    /// the partially written sink is still finalized when it goes out of scope.
    pub fn transform(
        &self,
        source: &Path,
        destination: &Path,
        variant: TransformVariant,
    ) -> Result<TransformOutcome> {
        let mut input = match self.backend.open_source(source) {
            Ok(input) => input,
            Err(AugmentError::SourceUnavailable(reason)) => {
                error!(
                    source = %source.display(),
                    transform = variant.kind(),
                    "Error opening video file: {reason}"
                );
                return Ok(TransformOutcome::SourceUnavailable);
            },
            Err(e) => return Err(e),
        };

        let metadata = input.metadata();
        let affine = variant.affine(metadata.width, metadata.height);
        let mut output = self.backend.create_sink(destination, &metadata, self.codec)?;

        while let Some(frame) = input.next_frame()? {
            let warped = affine.apply(&frame)?;
            output.write_frame(&warped)?;
        }
        output.finish()?;

        let frames = output.frames_written();
        debug!(
            destination = %destination.display(),
            frames,
            fps = %metadata.frame_rate,
            "Wrote derived clip"
        );

        Ok(TransformOutcome::Written {
            path: destination.to_path_buf(),
            frames,
        })
    }
}

/// Summary of an augmentation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentationReport {
    /// Only the new entries, in generation order
    pub augmented: AnnotationMap,
    /// Label names at or below the threshold
    pub selected_labels: BTreeSet<String>,
    /// Annotation entries examined
    pub videos_considered: usize,
    /// Entries whose label was selected
    pub videos_augmented: usize,
    /// Derived clips actually written
    pub derived_written: usize,
    /// Selected entries whose source could not be opened
    pub sources_skipped: usize,
}

/// Augmentation driver
pub struct AugmentationProcessor {
    config: AugmentConfig,
    backend: Box<dyn VideoBackend>,
    progress_reporter: Box<dyn ProgressReporter>,
}

impl AugmentationProcessor {
    /// Create a processor after validating `config`
    pub fn new(config: AugmentConfig, backend: Box<dyn VideoBackend>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            progress_reporter: Box::new(NoOpProgressReporter),
        })
    }

    /// Replace the progress reporter
    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress_reporter = reporter;
        self
    }

    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    /// Generate the derived clips and annotation entries for all under-represented labels.
    ///
    /// Entries are recorded for every selected video even when its source clip is
    /// missing; the missing clip only suppresses the video files.
    pub fn augment(&self, annotations: &AnnotationMap, labels: &LabelMap) -> Result<AugmentationReport> {
        let _run = spans::augmentation(self.config.threshold, self.backend.name()).entered();

        let selected_labels = select_under_represented(annotations, labels, self.config.threshold)?;
        info!(
            selected = ?selected_labels,
            threshold = self.config.threshold,
            "Augmenting under-represented labels"
        );

        let transformer = FrameTransformer::new(self.backend.as_ref(), self.config.codec);
        let total = annotations.len();
        let mut report = AugmentationReport {
            selected_labels,
            ..AugmentationReport::default()
        };

        for (index, (video_id, &code)) in annotations.iter().enumerate() {
            report.videos_considered += 1;
            let label = resolve_label(labels, video_id, code)?;

            if report.selected_labels.contains(label) {
                let _video = spans::video(video_id, label).entered();
                report.videos_augmented += 1;

                let source = self.config.source_path(video_id);
                let mut source_available = true;

                for variant in AUGMENTATION_VARIANTS {
                    let derived_id = variant.derived_id(video_id);
                    report.augmented.insert(derived_id.clone(), code);

                    // One failed open is enough to know the clip is missing
                    if !source_available {
                        continue;
                    }

                    let destination = self.config.output_path(&derived_id);
                    match transformer.transform(&source, &destination, variant)? {
                        TransformOutcome::Written { .. } => report.derived_written += 1,
                        TransformOutcome::SourceUnavailable => source_available = false,
                    }
                }

                if !source_available {
                    report.sources_skipped += 1;
                    self.progress_reporter
                        .report_skip(video_id, &format!("cannot open {}", source.display()));
                }
            }

            self.progress_reporter
                .report_progress(&ProgressUpdate::new(index + 1, total, video_id.as_str()));
        }

        self.progress_reporter
            .report_completion(report.derived_written, report.sources_skipped);

        info!(
            considered = report.videos_considered,
            augmented = report.videos_augmented,
            written = report.derived_written,
            skipped = report.sources_skipped,
            "Augmentation finished"
        );

        Ok(report)
    }

    /// Load both mappings, augment, and write only the new entries to the output file
    pub fn run(&self) -> Result<AugmentationReport> {
        let annotations = AnnotationIO::load_annotations(&self.config.annotation_file)?;
        let labels = AnnotationIO::load_labels(&self.config.labels_file)?;

        let report = self.augment(&annotations, &labels)?;
        AnnotationIO::save_annotations(&report.augmented, &self.config.output_file, JsonStyle::Compact)?;

        info!(
            path = %self.config.output_file.display(),
            entries = report.augmented.len(),
            "Wrote augmented annotations"
        );
        Ok(report)
    }
}

/// Run a full augmentation with the given configuration and backend
pub fn run_augmentation(config: AugmentConfig, backend: Box<dyn VideoBackend>) -> Result<AugmentationReport> {
    AugmentationProcessor::new(config, backend)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{FrameRate, MemoryBackend, VideoMetadata};
    use crate::services::TracingProgressReporter;
    use image::{Rgb, RgbImage};
    use std::sync::{Arc, Mutex};

    fn metadata() -> VideoMetadata {
        VideoMetadata::new(64, 16, FrameRate::new(30, 1))
    }

    fn frames(count: usize) -> Vec<RgbImage> {
        (0..count)
            .map(|i| RgbImage::from_fn(64, 16, |x, _| Rgb([x as u8 * 4, i as u8, 90])))
            .collect()
    }

    fn config() -> AugmentConfig {
        AugmentConfig::builder()
            .data_dir("src")
            .output_dir("out")
            .threshold(1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_transformer_writes_all_frames() {
        let backend = MemoryBackend::new();
        backend.insert_clip("src/a.mp4", metadata(), frames(5));
        let transformer = FrameTransformer::new(&backend, VideoCodec::Mpeg4);

        let outcome = transformer
            .transform(
                Path::new("src/a.mp4"),
                Path::new("out/a_translate_32_0.mp4"),
                TransformVariant::Translate { dx: 32, dy: 0 },
            )
            .unwrap();
        assert_eq!(
            outcome,
            TransformOutcome::Written {
                path: PathBuf::from("out/a_translate_32_0.mp4"),
                frames: 5
            }
        );

        let clip = backend.written_clip("out/a_translate_32_0.mp4").unwrap();
        assert!(clip.finalized);
        assert_eq!(clip.metadata, metadata());
        assert_eq!(clip.frames[0].get_pixel(10, 3), &Rgb([0, 0, 0]));
        assert_eq!(clip.frames[2].get_pixel(40, 3), &Rgb([32, 2, 90]));
    }

    #[test]
    fn test_transformer_skips_missing_source_for_both_kinds() {
        let backend = MemoryBackend::new();
        let transformer = FrameTransformer::new(&backend, VideoCodec::Mpeg4);

        for variant in AUGMENTATION_VARIANTS {
            let outcome = transformer
                .transform(Path::new("src/gone.mp4"), Path::new("out/gone.mp4"), variant)
                .unwrap();
            assert_eq!(outcome, TransformOutcome::SourceUnavailable);
        }
        assert!(backend.written_paths().is_empty());
    }

    #[test]
    fn test_decode_failure_is_fatal_and_sink_is_finalized() {
        let backend = MemoryBackend::new();
        backend.insert_corrupt_clip("src/bad.mp4", metadata(), frames(4), 2);
        let transformer = FrameTransformer::new(&backend, VideoCodec::Mpeg4);

        let result = transformer.transform(
            Path::new("src/bad.mp4"),
            Path::new("out/bad_rotate_30.mp4"),
            TransformVariant::Rotate { degrees: 30 },
        );
        assert!(matches!(result, Err(AugmentError::Video(_))));

        let clip = backend.written_clip("out/bad_rotate_30.mp4").unwrap();
        assert!(clip.finalized);
        assert_eq!(clip.frames.len(), 2);
    }

    #[test]
    fn test_augment_selected_entries_only() {
        let backend = MemoryBackend::new();
        backend.insert_clip("src/rare.mp4", metadata(), frames(3));

        let annotations: AnnotationMap = [
            ("common1".to_string(), 0),
            ("rare".to_string(), 1),
            ("common2".to_string(), 0),
        ]
        .into_iter()
        .collect();
        let labels = LabelMap::from([(0, "shoot".to_string()), (1, "block".to_string())]);

        let processor = AugmentationProcessor::new(config(), Box::new(backend.clone())).unwrap();
        let report = processor.augment(&annotations, &labels).unwrap();

        let keys: Vec<&str> = report.augmented.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["rare_rotate_30", "rare_rotate_330", "rare_translate_32_0", "rare_translate_-32_0"]
        );
        assert!(report.augmented.values().all(|&code| code == 1));
        assert_eq!(report.videos_considered, 3);
        assert_eq!(report.videos_augmented, 1);
        assert_eq!(report.derived_written, 4);
        assert_eq!(report.sources_skipped, 0);
        assert_eq!(backend.written_paths().len(), 4);
    }

    #[test]
    fn test_missing_source_still_records_entries() {
        let backend = MemoryBackend::new();
        let annotations: AnnotationMap = [("lost".to_string(), 3)].into_iter().collect();
        let labels = LabelMap::from([(3, "pass".to_string())]);

        let processor = AugmentationProcessor::new(config(), Box::new(backend.clone())).unwrap();
        let report = processor.augment(&annotations, &labels).unwrap();

        assert_eq!(report.augmented.len(), 4);
        assert_eq!(report.derived_written, 0);
        assert_eq!(report.sources_skipped, 1);
        assert!(backend.written_paths().is_empty());
    }

    #[test]
    fn test_sink_failure_is_fatal() {
        let backend = MemoryBackend::new();
        backend.insert_clip("src/rare.mp4", metadata(), frames(1));
        backend.reject_sinks();

        let annotations: AnnotationMap = [("rare".to_string(), 1)].into_iter().collect();
        let labels = LabelMap::from([(1, "block".to_string())]);

        let processor = AugmentationProcessor::new(config(), Box::new(backend)).unwrap();
        assert!(processor.augment(&annotations, &labels).is_err());
    }

    /// Reporter that keeps every callback for inspection
    #[derive(Default)]
    struct RecordingReporter {
        updates: Arc<Mutex<Vec<ProgressUpdate>>>,
        skips: Arc<Mutex<Vec<String>>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report_progress(&self, update: &ProgressUpdate) {
            self.updates.lock().unwrap().push(update.clone());
        }

        fn report_skip(&self, video_id: &str, _reason: &str) {
            self.skips.lock().unwrap().push(video_id.to_string());
        }

        fn report_completion(&self, _derived_written: usize, _sources_skipped: usize) {}
    }

    fn processor_backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.insert_clip("src/b.mp4", metadata(), frames(1));
        backend
    }

    #[test]
    fn test_progress_reported_after_every_entry() {
        let annotations: AnnotationMap = [("a", 0), ("b", 1), ("c", 0), ("d", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let labels = LabelMap::from([(0, "shoot".to_string()), (1, "block".to_string())]);

        let reporter = RecordingReporter::default();
        let updates = Arc::clone(&reporter.updates);
        let skips = Arc::clone(&reporter.skips);

        let mut config = config();
        config.threshold = 2;
        let processor = AugmentationProcessor::new(config, Box::new(processor_backend()))
            .unwrap()
            .with_progress_reporter(Box::new(reporter));
        assert_eq!(processor.config().threshold, 2);
        assert_eq!(processor.config().output_dir, PathBuf::from("out"));
        processor.augment(&annotations, &labels).unwrap();

        let fractions: Vec<f64> = updates.lock().unwrap().iter().map(ProgressUpdate::fraction).collect();
        assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0]);
        // Only "b" has a clip on disk
        assert_eq!(*skips.lock().unwrap(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_tracing_reporter_runs_through_augmentation() {
        let annotations: AnnotationMap = [("b".to_string(), 1)].into_iter().collect();
        let labels = LabelMap::from([(1, "block".to_string())]);

        let processor = AugmentationProcessor::new(config(), Box::new(processor_backend()))
            .unwrap()
            .with_progress_reporter(Box::new(TracingProgressReporter));
        let report = processor.augment(&annotations, &labels).unwrap();
        assert_eq!(report.derived_written, 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AugmentConfig::default();
        config.video_extension = String::new();
        assert!(AugmentationProcessor::new(config, Box::new(MemoryBackend::new())).is_err());
    }
}
