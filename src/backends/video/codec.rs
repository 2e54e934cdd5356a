//! Output codec selection
//!
//! Derived clips are written with MPEG-4 Part 2 (`mp4v`) by default, the codec of the
//! existing augmented `.mp4` files in the dataset.

use crate::error::{AugmentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Video codec enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// MPEG-4 Part 2, fourcc `mp4v`
    #[default]
    Mpeg4,
    /// H.264/AVC
    H264,
}

impl VideoCodec {
    /// Get FFmpeg codec name
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            Self::Mpeg4 => "mpeg4",
            Self::H264 => "libx264",
        }
    }

    /// Four-character code stored in the container
    pub fn fourcc(&self) -> &'static str {
        match self {
            Self::Mpeg4 => "mp4v",
            Self::H264 => "avc1",
        }
    }

    /// Get all supported codecs
    pub fn all() -> &'static [Self] {
        &[Self::Mpeg4, Self::H264]
    }
}

impl FromStr for VideoCodec {
    type Err = AugmentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mpeg4" | "mp4v" => Ok(Self::Mpeg4),
            "h264" | "libx264" | "avc" | "avc1" => Ok(Self::H264),
            _ => Err(AugmentError::invalid_config(format!(
                "Unsupported video codec: {s}"
            ))),
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fourcc())
    }
}
