//! Configuration types for augmentation and filtering runs
//!
//! Defaults reproduce the dataset layout the tool was first written for:
//! everything lives under `dataset/`.

use crate::backends::video::VideoCodec;
use crate::error::{AugmentError, Result};
use crate::selection::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Check that `extension` can be appended to a video id as `{id}.{extension}`
fn validate_extension(extension: &str) -> Result<()> {
    if extension.is_empty() {
        return Err(AugmentError::invalid_config("Video extension must not be empty"));
    }
    if extension.contains('.') || extension.contains('/') || extension.contains('\\') {
        return Err(AugmentError::invalid_config(format!(
            "Video extension '{extension}' must not contain '.' or path separators"
        )));
    }
    Ok(())
}

/// Path of the clip for `video_id` inside `dir`
pub fn video_path(dir: &Path, video_id: &str, extension: &str) -> PathBuf {
    dir.join(format!("{video_id}.{extension}"))
}

/// Configuration for an augmentation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Annotation mapping `{video_id: label_code}`
    pub annotation_file: PathBuf,
    /// Label mapping `{"code": name}`
    pub labels_file: PathBuf,
    /// Directory holding the source clips
    pub data_dir: PathBuf,
    /// Directory receiving the derived clips
    pub output_dir: PathBuf,
    /// Labels with at most this many videos are augmented
    pub threshold: usize,
    /// Where the new annotation entries are written
    pub output_file: PathBuf,
    /// Clip file extension, without the dot
    pub video_extension: String,
    /// Codec for derived clips
    pub codec: VideoCodec,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            annotation_file: PathBuf::from("dataset/annotation_dict.json"),
            labels_file: PathBuf::from("dataset/labels_dict.json"),
            data_dir: PathBuf::from("dataset/examples/"),
            output_dir: PathBuf::from("dataset/augmented-examples/"),
            threshold: DEFAULT_THRESHOLD,
            output_file: PathBuf::from("dataset/augmented_annotation_dict.json"),
            video_extension: "mp4".to_string(),
            codec: VideoCodec::default(),
        }
    }
}

impl AugmentConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> AugmentConfigBuilder {
        AugmentConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_extension(&self.video_extension)?;
        if self.output_file.as_os_str().is_empty() {
            return Err(AugmentError::invalid_config("Output file path must not be empty"));
        }
        Ok(())
    }

    /// Source clip path for `video_id`
    pub fn source_path(&self, video_id: &str) -> PathBuf {
        video_path(&self.data_dir, video_id, &self.video_extension)
    }

    /// Derived clip path for `derived_id`
    pub fn output_path(&self, derived_id: &str) -> PathBuf {
        video_path(&self.output_dir, derived_id, &self.video_extension)
    }
}

/// Builder for `AugmentConfig`
#[derive(Debug, Default)]
pub struct AugmentConfigBuilder {
    config: AugmentConfig,
}

impl AugmentConfigBuilder {
    #[must_use]
    pub fn annotation_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.annotation_file = path.into();
        self
    }

    #[must_use]
    pub fn labels_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.labels_file = path.into();
        self
    }

    #[must_use]
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.data_dir = path.into();
        self
    }

    #[must_use]
    pub fn output_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.output_dir = path.into();
        self
    }

    #[must_use]
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.config.threshold = threshold;
        self
    }

    #[must_use]
    pub fn output_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.output_file = path.into();
        self
    }

    #[must_use]
    pub fn video_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.config.video_extension = extension.into();
        self
    }

    #[must_use]
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.config.codec = codec;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AugmentConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for the existence filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Annotation mapping to filter
    pub annotation_file: PathBuf,
    /// Directory searched for `{video_id}.{video_extension}`
    pub video_dir: PathBuf,
    /// Where the filtered mapping is written
    pub output_file: PathBuf,
    /// Clip file extension, without the dot
    pub video_extension: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            annotation_file: PathBuf::from("dataset/annotation_dict.json"),
            video_dir: PathBuf::from("dataset/examples"),
            output_file: PathBuf::from("dataset/filtered_annotation.json"),
            video_extension: "mp4".to_string(),
        }
    }
}

impl FilterConfig {
    #[must_use]
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        validate_extension(&self.video_extension)
    }
}

/// Builder for `FilterConfig`
#[derive(Debug, Default)]
pub struct FilterConfigBuilder {
    config: FilterConfig,
}

impl FilterConfigBuilder {
    #[must_use]
    pub fn annotation_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.annotation_file = path.into();
        self
    }

    #[must_use]
    pub fn video_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.video_dir = path.into();
        self
    }

    #[must_use]
    pub fn output_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.output_file = path.into();
        self
    }

    #[must_use]
    pub fn video_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.config.video_extension = extension.into();
        self
    }

    pub fn build(self) -> Result<FilterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
