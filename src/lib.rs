#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # clipaug
//!
//! Rebalances a video action-classification dataset. Labels with few examples are
//! augmented by rotating and translating every frame of their clips, and annotation
//! mappings can be filtered down to the clips that actually exist on disk.
//!
//! ## Features
//!
//! - **Label selection**: per-name frequency counts with a configurable threshold
//! - **Augmentation**: four fixed variants per clip (`rotate_30`, `rotate_330`,
//!   `translate_32_0`, `translate_-32_0`) through one affine warp routine
//! - **Existence filter**: drops annotation entries without a video file
//! - **Pluggable video I/O**: FFmpeg backend (`video-support` feature) and an in-memory
//!   backend for tests
//! - **CLI Integration**: `clipaug` binary (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clipaug::{run_existence_filter, FilterConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = FilterConfig::builder()
//!     .annotation_file("dataset/annotation_dict.json")
//!     .video_dir("dataset/examples")
//!     .build()?;
//! let report = run_existence_filter(&config)?;
//! println!("kept {} entries", report.kept);
//! # Ok(())
//! # }
//! ```
//!
//! Augmentation takes any [`VideoBackend`]:
//!
//! ```rust,no_run
//! use clipaug::{run_augmentation, AugmentConfig, MemoryBackend};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = AugmentConfig::builder().threshold(500).build()?;
//! let report = run_augmentation(config, Box::new(MemoryBackend::new()))?;
//! println!("{} new entries", report.augmented.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress bar and tracing subscriber
//! - `video-support`: FFmpeg decode/encode through `ffmpeg-next` (needs system FFmpeg libraries)
//! - `tracing-json`: JSON log output

pub mod annotations;
pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod processor;
pub mod selection;
pub mod services;
pub mod tracing_config;
pub mod transform;

// Public API exports
pub use annotations::{AnnotationMap, LabelCode, LabelMap};
pub use backends::{
    FrameRate, MemoryBackend, VideoBackend, VideoCodec, VideoMetadata, VideoSink, VideoSource,
};
#[cfg(feature = "video-support")]
pub use backends::FFmpegBackend;
pub use config::{AugmentConfig, AugmentConfigBuilder, FilterConfig, FilterConfigBuilder};
pub use error::{AugmentError, Result};
pub use filter::{filter_by_existing_videos, run_existence_filter, FilterReport};
pub use processor::{
    run_augmentation, AugmentationProcessor, AugmentationReport, FrameTransformer,
    TransformOutcome,
};
pub use selection::{select_under_represented, LabelFrequencies, DEFAULT_THRESHOLD};
pub use services::{
    AnnotationIO, JsonStyle, NoOpProgressReporter, ProgressReporter, ProgressUpdate,
    TracingProgressReporter,
};
pub use transform::{AffineTransform, TransformVariant, AUGMENTATION_VARIANTS};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};
