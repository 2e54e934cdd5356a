//! Configuration conversion utilities for CLI arguments

use crate::backends::VideoCodec;
use crate::cli::main_impl::{AugmentArgs, FilterArgs, StatsArgs};
use crate::config::{AugmentConfig, FilterConfig};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Convert CLI arguments to library configuration, filling unset flags with defaults
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `AugmentConfig` from `augment` arguments
    pub(crate) fn augment_config(args: &AugmentArgs) -> Result<AugmentConfig> {
        let defaults = AugmentConfig::default();
        let codec = match &args.codec {
            Some(name) => name.parse::<VideoCodec>().context("Invalid --codec")?,
            None => defaults.codec,
        };

        AugmentConfig::builder()
            .annotation_file(args.annotation_file.clone().unwrap_or(defaults.annotation_file))
            .labels_file(args.labels_file.clone().unwrap_or(defaults.labels_file))
            .data_dir(args.data_dir.clone().unwrap_or(defaults.data_dir))
            .output_dir(args.output_dir.clone().unwrap_or(defaults.output_dir))
            .threshold(args.threshold.unwrap_or(defaults.threshold))
            .output_file(args.output_file.clone().unwrap_or(defaults.output_file))
            .video_extension(args.video_extension.clone().unwrap_or(defaults.video_extension))
            .codec(codec)
            .build()
            .context("Invalid configuration")
    }

    /// Build `FilterConfig` from `filter` arguments
    pub(crate) fn filter_config(args: &FilterArgs) -> Result<FilterConfig> {
        let defaults = FilterConfig::default();

        FilterConfig::builder()
            .annotation_file(args.annotation_file.clone().unwrap_or(defaults.annotation_file))
            .video_dir(args.video_dir.clone().unwrap_or(defaults.video_dir))
            .output_file(args.output_file.clone().unwrap_or(defaults.output_file))
            .video_extension(args.video_extension.clone().unwrap_or(defaults.video_extension))
            .build()
            .context("Invalid configuration")
    }

    /// Resolve the annotation file, label file and threshold for `stats`
    pub(crate) fn stats_inputs(args: &StatsArgs) -> (PathBuf, PathBuf, usize) {
        let defaults = AugmentConfig::default();
        (
            args.annotation_file.clone().unwrap_or(defaults.annotation_file),
            args.labels_file.clone().unwrap_or(defaults.labels_file),
            args.threshold.unwrap_or(defaults.threshold),
        )
    }
}
