//! Progress reporting service
//!
//! Separates progress display from the augmentation loop so the CLI can draw a bar while
//! library callers stay silent.

/// Progress after one annotation entry has been handled
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Entries handled so far
    pub completed: usize,
    /// Total entries in the annotation mapping
    pub total: usize,
    /// Identifier of the entry just handled
    pub video_id: String,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new<S: Into<String>>(completed: usize, total: usize, video_id: S) -> Self {
        Self {
            completed,
            total,
            video_id: video_id.into(),
        }
    }

    /// Completed share in `[0, 1]`; an empty run counts as done
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Trait for reporting progress during augmentation
pub trait ProgressReporter: Send + Sync {
    /// Report that one more entry has been handled
    fn report_progress(&self, update: &ProgressUpdate);

    /// Report a source clip that was skipped
    fn report_skip(&self, video_id: &str, reason: &str);

    /// Report the end of the run
    fn report_completion(&self, derived_written: usize, sources_skipped: usize);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: &ProgressUpdate) {}

    fn report_skip(&self, _video_id: &str, _reason: &str) {}

    fn report_completion(&self, _derived_written: usize, _sources_skipped: usize) {}
}

/// Reporter that emits progress as tracing events
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn report_progress(&self, update: &ProgressUpdate) {
        tracing::info!(
            video_id = %update.video_id,
            "Percentage {}",
            update.fraction()
        );
    }

    fn report_skip(&self, video_id: &str, reason: &str) {
        tracing::warn!(video_id = %video_id, reason = %reason, "Skipped source clip");
    }

    fn report_completion(&self, derived_written: usize, sources_skipped: usize) {
        tracing::info!(derived_written, sources_skipped, "Augmentation completed");
    }
}

/// Terminal progress bar for the CLI
#[cfg(feature = "cli")]
pub struct ConsoleProgressReporter {
    bar: indicatif::ProgressBar,
}

#[cfg(feature = "cli")]
impl ConsoleProgressReporter {
    /// Create a bar; its length is taken from the first update
    #[must_use]
    pub fn new() -> Self {
        let bar = indicatif::ProgressBar::new(0);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

#[cfg(feature = "cli")]
impl Default for ConsoleProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cli")]
impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: &ProgressUpdate) {
        self.bar.set_length(update.total as u64);
        self.bar.set_position(update.completed as u64);
        self.bar.set_message(format!("Percentage {:.4}", update.fraction()));
    }

    fn report_skip(&self, video_id: &str, reason: &str) {
        self.bar.println(format!("skipped {video_id}: {reason}"));
    }

    fn report_completion(&self, derived_written: usize, sources_skipped: usize) {
        self.bar.finish_with_message(format!(
            "{derived_written} clips written, {sources_skipped} sources skipped"
        ));
    }
}
