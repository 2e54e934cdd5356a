//! Video decode/encode backend module
//!
//! Frames flow from a [`VideoSource`] to a [`VideoSink`] one at a time. Both are scoped
//! handles: a source is released when dropped, and a sink is finalized (buffered packets
//! flushed and the container trailer written) either by [`VideoSink::finish`] or, on any
//! early exit, when it is dropped.

#[cfg(feature = "video-support")]
pub mod ffmpeg;

pub mod codec;

#[cfg(feature = "video-support")]
pub use ffmpeg::FFmpegBackend;

pub use codec::VideoCodec;

use crate::error::Result;
use image::RgbImage;
use std::fmt;
use std::path::Path;

/// Container frame rate as a rational number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub numerator: i32,
    pub denominator: i32,
}

impl FrameRate {
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Frames per second; zero when the rate is unknown
    pub fn as_f64(&self) -> f64 {
        if self.denominator == 0 {
            0.0
        } else {
            f64::from(self.numerator) / f64::from(self.denominator)
        }
    }

    /// Whether the rate describes a usable positive frequency
    pub fn is_valid(&self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_f64())
    }
}

/// Stream properties read from the source container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMetadata {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Average frame rate
    pub frame_rate: FrameRate,
}

impl VideoMetadata {
    pub fn new(width: u32, height: u32, frame_rate: FrameRate) -> Self {
        Self {
            width,
            height,
            frame_rate,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Sequential, non-restartable frame decoder
pub trait VideoSource {
    /// Metadata of the opened stream
    fn metadata(&self) -> VideoMetadata;

    /// Decode the next frame, `None` at end of stream
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Frame encoder writing one output file
pub trait VideoSink {
    /// Encode a frame; frames are written in call order
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Flush the encoder and close the container. Calling it again is a no-op.
    fn finish(&mut self) -> Result<()>;

    /// Frames accepted so far
    fn frames_written(&self) -> u64;
}

/// Factory for sources and sinks
pub trait VideoBackend {
    /// Open a clip for decoding.
    ///
    /// Implementations report a missing or undecodable container as
    /// [`AugmentError::SourceUnavailable`](crate::AugmentError::SourceUnavailable) so callers
    /// can skip the clip.
    fn open_source(&self, path: &Path) -> Result<Box<dyn VideoSource>>;

    /// Create an encoder writing to `path` with the given geometry and rate
    fn create_sink(
        &self,
        path: &Path,
        metadata: &VideoMetadata,
        codec: VideoCodec,
    ) -> Result<Box<dyn VideoSink>>;

    /// Backend name used in logs
    fn name(&self) -> &'static str;
}
