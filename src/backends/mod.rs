//! Backend implementations for video decoding and encoding
//!
//! - FFmpeg backend (feature `video-support`, real containers on disk)
//! - Memory backend (clips held in memory, used by tests and dry runs)

pub mod mock;
pub mod video;

pub use self::mock::{MemoryBackend, WrittenClip};
pub use self::video::{
    FrameRate, VideoBackend, VideoCodec, VideoMetadata, VideoSink, VideoSource,
};

#[cfg(feature = "video-support")]
pub use self::video::FFmpegBackend;
