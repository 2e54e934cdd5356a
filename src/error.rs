//! Error types for dataset augmentation and filtering

use crate::annotations::LabelCode;
use thiserror::Error;

/// Result type alias for augmentation operations
pub type Result<T> = std::result::Result<T, AugmentError>;

/// Error types for augmentation, filtering and video I/O
#[derive(Error, Debug)]
pub enum AugmentError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unwritable JSON mapping
    #[error("JSON error: {0}")]
    Json(String),

    /// Frame buffer errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Decode/encode failures reported by a video backend
    #[error("Video error: {0}")]
    Video(String),

    /// Source clip could not be opened for decoding
    #[error("Cannot open video source: {0}")]
    SourceUnavailable(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Annotation references a label code missing from the label mapping
    #[error("Unknown label code {code} for video '{video_id}'")]
    UnknownLabel { video_id: String, code: LabelCode },

    /// Label mapping key that is not an integer
    #[error("Invalid label key '{0}': expected an integer code")]
    InvalidLabelKey(String),
}

impl AugmentError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new video backend error
    pub fn video<S: Into<String>>(msg: S) -> Self {
        Self::Video(msg.into())
    }

    /// Create an unopenable-source error for `path`
    pub fn source_unavailable<P: AsRef<std::path::Path>>(path: P, reason: &str) -> Self {
        Self::SourceUnavailable(format!("'{}': {}", path.as_ref().display(), reason))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        Self::Io(std::io::Error::new(
            error.kind(),
            format!(
                "Failed to {} '{}': {}",
                operation,
                path.as_ref().display(),
                error
            ),
        ))
    }

    /// Create JSON error with operation context
    pub fn json_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &serde_json::Error,
    ) -> Self {
        Self::Json(format!(
            "Failed to {} '{}': {}",
            operation,
            path.as_ref().display(),
            error
        ))
    }

    /// Create video error naming the stage and the file involved
    pub fn video_stage_error<P: AsRef<std::path::Path>>(
        stage: &str,
        path: P,
        details: &str,
    ) -> Self {
        Self::Video(format!(
            "{} failed for '{}': {}",
            stage,
            path.as_ref().display(),
            details
        ))
    }
}
