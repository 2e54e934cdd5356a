//! Annotation file I/O
//!
//! Keeps JSON reading and writing out of the selection and augmentation logic.

use crate::{
    annotations::{parse_label_keys, AnnotationMap, LabelMap},
    error::{AugmentError, Result},
};
use indexmap::IndexMap;
use std::path::Path;

/// Layout of written JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// Single line, no whitespace
    #[default]
    Compact,
    /// Two-space indentation
    Pretty,
}

/// Service for reading and writing annotation and label mappings
pub struct AnnotationIO;

impl AnnotationIO {
    /// Load a `{video_id: label_code}` mapping, keeping file order
    ///
    /// # Errors
    /// - File missing or unreadable
    /// - Content is not a JSON object of integers
    pub fn load_annotations<P: AsRef<Path>>(path: P) -> Result<AnnotationMap> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AugmentError::file_io_error("read annotation file", path, &e))?;
        let annotations: AnnotationMap = serde_json::from_str(&content)
            .map_err(|e| AugmentError::json_error("parse annotation file", path, &e))?;

        tracing::debug!(path = %path.display(), entries = annotations.len(), "Loaded annotations");
        Ok(annotations)
    }

    /// Load a `{"code": name}` mapping and parse its keys as integer codes
    pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<LabelMap> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AugmentError::file_io_error("read label file", path, &e))?;
        let raw: IndexMap<String, String> = serde_json::from_str(&content)
            .map_err(|e| AugmentError::json_error("parse label file", path, &e))?;

        let labels = parse_label_keys(raw)?;
        tracing::debug!(path = %path.display(), labels = labels.len(), "Loaded labels");
        Ok(labels)
    }

    /// Write a mapping, replacing any previous content and creating the parent directory
    pub fn save_annotations<P: AsRef<Path>>(
        annotations: &AnnotationMap,
        path: P,
        style: JsonStyle,
    ) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AugmentError::file_io_error("create output directory", parent, &e))?;
        }

        let serialized = match style {
            JsonStyle::Compact => serde_json::to_string(annotations),
            JsonStyle::Pretty => serde_json::to_string_pretty(annotations),
        }
        .map_err(|e| AugmentError::json_error("serialize annotations for", path, &e))?;

        std::fs::write(path, serialized)
            .map_err(|e| AugmentError::file_io_error("write annotation file", path, &e))?;

        tracing::debug!(path = %path.display(), entries = annotations.len(), "Saved annotations");
        Ok(())
    }
}
