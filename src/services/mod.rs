//! Service layer separating file I/O and progress display from business logic

pub mod io;
pub mod progress;

pub use io::{AnnotationIO, JsonStyle};
#[cfg(feature = "cli")]
pub use progress::ConsoleProgressReporter;
pub use progress::{
    NoOpProgressReporter, ProgressReporter, ProgressUpdate, TracingProgressReporter,
};
