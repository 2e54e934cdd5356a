//! In-memory video backend for testing and dry runs
//!
//! Clips are registered under a path and decoded from memory. Every sink the backend
//! creates is recorded, together with whether it was finalized, so callers can inspect
//! what would have been written to disk.

use crate::backends::video::{VideoBackend, VideoCodec, VideoMetadata, VideoSink, VideoSource};
use crate::error::{AugmentError, Result};
use image::RgbImage;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone)]
struct MemoryClip {
    metadata: VideoMetadata,
    frames: Vec<RgbImage>,
    /// Decoding fails once this many frames have been returned
    fail_after: Option<usize>,
}

/// A clip written through a [`MemoryBackend`] sink
#[derive(Debug, Clone)]
pub struct WrittenClip {
    pub metadata: VideoMetadata,
    pub codec: VideoCodec,
    pub frames: Vec<RgbImage>,
    /// Set once the sink has been finished or dropped
    pub finalized: bool,
}

#[derive(Debug, Default)]
struct MemoryStore {
    clips: HashMap<PathBuf, MemoryClip>,
    written: BTreeMap<PathBuf, WrittenClip>,
    reject_sinks: bool,
}

/// Mock backend keeping clips in memory
///
/// Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Rc<RefCell<MemoryStore>>,
}

impl MemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip that decodes to `frames`
    pub fn insert_clip<P: Into<PathBuf>>(
        &self,
        path: P,
        metadata: VideoMetadata,
        frames: Vec<RgbImage>,
    ) {
        self.store.borrow_mut().clips.insert(
            path.into(),
            MemoryClip {
                metadata,
                frames,
                fail_after: None,
            },
        );
    }

    /// Register a clip whose decoding fails after `fail_after` frames
    pub fn insert_corrupt_clip<P: Into<PathBuf>>(
        &self,
        path: P,
        metadata: VideoMetadata,
        frames: Vec<RgbImage>,
        fail_after: usize,
    ) {
        self.store.borrow_mut().clips.insert(
            path.into(),
            MemoryClip {
                metadata,
                frames,
                fail_after: Some(fail_after),
            },
        );
    }

    /// Make every later `create_sink` call fail
    pub fn reject_sinks(&self) {
        self.store.borrow_mut().reject_sinks = true;
    }

    /// Paths of all sinks created so far, sorted
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.store.borrow().written.keys().cloned().collect()
    }

    /// Snapshot of the clip written to `path`
    pub fn written_clip<P: AsRef<Path>>(&self, path: P) -> Option<WrittenClip> {
        self.store.borrow().written.get(path.as_ref()).cloned()
    }
}

impl VideoBackend for MemoryBackend {
    fn open_source(&self, path: &Path) -> Result<Box<dyn VideoSource>> {
        let clip = self
            .store
            .borrow()
            .clips
            .get(path)
            .cloned()
            .ok_or_else(|| AugmentError::source_unavailable(path, "no such clip"))?;

        Ok(Box::new(MemorySource {
            path: path.to_path_buf(),
            clip,
            position: 0,
        }))
    }

    fn create_sink(
        &self,
        path: &Path,
        metadata: &VideoMetadata,
        codec: VideoCodec,
    ) -> Result<Box<dyn VideoSink>> {
        let mut store = self.store.borrow_mut();
        if store.reject_sinks {
            return Err(AugmentError::video_stage_error(
                "create container",
                path,
                "sink creation rejected",
            ));
        }

        store.written.insert(
            path.to_path_buf(),
            WrittenClip {
                metadata: *metadata,
                codec,
                frames: Vec::new(),
                finalized: false,
            },
        );

        Ok(Box::new(MemorySink {
            store: Rc::clone(&self.store),
            path: path.to_path_buf(),
            dimensions: metadata.dimensions(),
            frames_written: 0,
            finished: false,
        }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct MemorySource {
    path: PathBuf,
    clip: MemoryClip,
    position: usize,
}

impl VideoSource for MemorySource {
    fn metadata(&self) -> VideoMetadata {
        self.clip.metadata
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.clip.fail_after == Some(self.position) {
            return Err(AugmentError::video_stage_error(
                "decode frame",
                &self.path,
                "corrupt packet",
            ));
        }

        let frame = self.clip.frames.get(self.position).cloned();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }
}

struct MemorySink {
    store: Rc<RefCell<MemoryStore>>,
    path: PathBuf,
    dimensions: (u32, u32),
    frames_written: u64,
    finished: bool,
}

impl MemorySink {
    fn mark_finalized(&mut self) {
        self.finished = true;
        if let Some(clip) = self.store.borrow_mut().written.get_mut(&self.path) {
            clip.finalized = true;
        }
    }
}

impl VideoSink for MemorySink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if self.finished {
            return Err(AugmentError::video("Cannot write to a finished sink"));
        }
        if frame.dimensions() != self.dimensions {
            return Err(AugmentError::video(format!(
                "Frame is {}x{}, sink expects {}x{}",
                frame.width(),
                frame.height(),
                self.dimensions.0,
                self.dimensions.1
            )));
        }

        if let Some(clip) = self.store.borrow_mut().written.get_mut(&self.path) {
            clip.frames.push(frame.clone());
        }
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.finished {
            self.mark_finalized();
        }
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl Drop for MemorySink {
    fn drop(&mut self) {
        if !self.finished {
            self.mark_finalized();
        }
    }
}
