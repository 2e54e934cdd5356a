//! Existence filter for annotation mappings
//!
//! Drops entries whose clip is not present on disk, so downstream training never
//! references a missing file.

use crate::{
    annotations::AnnotationMap,
    config::{video_path, FilterConfig},
    error::Result,
    services::{AnnotationIO, JsonStyle},
};
use std::path::Path;
use tracing::{debug, info};

/// Counts from an existence-filter run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterReport {
    pub kept: usize,
    pub removed: usize,
}

/// Keep the entries whose `video_dir/{id}.{extension}` exists, in input order
pub fn filter_by_existing_videos(
    annotations: &AnnotationMap,
    video_dir: &Path,
    extension: &str,
) -> AnnotationMap {
    annotations
        .iter()
        .filter(|(video_id, _)| {
            let exists = video_path(video_dir, video_id, extension).exists();
            if !exists {
                debug!(video_id = %video_id, "Dropping entry without video file");
            }
            exists
        })
        .map(|(video_id, &code)| (video_id.clone(), code))
        .collect()
}

/// Load the configured mapping, filter it and write it pretty-printed
pub fn run_existence_filter(config: &FilterConfig) -> Result<FilterReport> {
    config.validate()?;

    let annotations = AnnotationIO::load_annotations(&config.annotation_file)?;
    let filtered = filter_by_existing_videos(&annotations, &config.video_dir, &config.video_extension);
    AnnotationIO::save_annotations(&filtered, &config.output_file, JsonStyle::Pretty)?;

    let report = FilterReport {
        kept: filtered.len(),
        removed: annotations.len() - filtered.len(),
    };
    info!(
        kept = report.kept,
        removed = report.removed,
        "Filtered annotations saved to {}",
        config.output_file.display()
    );

    Ok(report)
}
