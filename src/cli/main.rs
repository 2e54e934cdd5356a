//! clipaug CLI tool
//!
//! Command-line interface for augmenting under-represented classes and filtering
//! annotation mappings.

use super::config::CliConfigBuilder;
use crate::{
    backends::VideoBackend,
    filter::run_existence_filter,
    processor::AugmentationProcessor,
    selection::LabelFrequencies,
    services::{AnnotationIO, ConsoleProgressReporter, ProgressReporter, TracingProgressReporter},
    tracing_config::{init_cli_tracing, spans, TracingFormat},
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

/// Video dataset augmentation tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "clipaug")]
pub struct Cli {
    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Tracing filter directive, overrides -v (e.g. "clipaug=debug")
    #[arg(long, value_name = "FILTER", global = true)]
    pub log_filter: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console, global = true)]
    pub log_format: CliLogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    /// Colored single-line events
    Console,
    /// Plain single-line events for CI logs
    Compact,
    /// One JSON object per event
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => Self::Console,
            CliLogFormat::Compact => Self::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => Self::Json,
        }
    }
}

/// How augmentation progress is shown
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum ProgressMode {
    /// Redrawn terminal bar
    Bar,
    /// One log event per entry, for redirected output
    Log,
}

impl ProgressMode {
    fn for_stderr(is_terminal: bool) -> Self {
        if is_terminal {
            Self::Bar
        } else {
            Self::Log
        }
    }

    fn reporter(self) -> Box<dyn ProgressReporter> {
        match self {
            Self::Bar => Box::new(ConsoleProgressReporter::new()),
            Self::Log => Box::new(TracingProgressReporter),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate rotated and translated clips for under-represented labels
    /// (needs a build with the `video-support` feature for FFmpeg)
    Augment(AugmentArgs),
    /// Drop annotation entries whose video file does not exist
    Filter(FilterArgs),
    /// Print label frequencies in ascending order
    Stats(StatsArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Augment(_) => "augment",
            Self::Filter(_) => "filter",
            Self::Stats(_) => "stats",
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct AugmentArgs {
    /// Annotation mapping [default: dataset/annotation_dict.json]
    #[arg(long, value_name = "PATH")]
    pub annotation_file: Option<PathBuf>,

    /// Label mapping [default: dataset/labels_dict.json]
    #[arg(long, value_name = "PATH")]
    pub labels_file: Option<PathBuf>,

    /// Directory with the source clips [default: dataset/examples/]
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for derived clips [default: dataset/augmented-examples/]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Augment labels with at most this many videos [default: 2000]
    #[arg(short, long)]
    pub threshold: Option<usize>,

    /// Where new annotation entries are written [default: dataset/augmented_annotation_dict.json]
    #[arg(short, long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Clip file extension [default: mp4]
    #[arg(long, value_name = "EXT")]
    pub video_extension: Option<String>,

    /// Output codec (mp4v, h264) [default: mp4v]
    #[arg(long)]
    pub codec: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Annotation mapping to filter [default: dataset/annotation_dict.json]
    #[arg(long, value_name = "PATH")]
    pub annotation_file: Option<PathBuf>,

    /// Directory searched for clips [default: dataset/examples]
    #[arg(long, value_name = "DIR")]
    pub video_dir: Option<PathBuf>,

    /// Where the filtered mapping is written [default: dataset/filtered_annotation.json]
    #[arg(short, long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Clip file extension [default: mp4]
    #[arg(long, value_name = "EXT")]
    pub video_extension: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Annotation mapping [default: dataset/annotation_dict.json]
    #[arg(long, value_name = "PATH")]
    pub annotation_file: Option<PathBuf>,

    /// Label mapping [default: dataset/labels_dict.json]
    #[arg(long, value_name = "PATH")]
    pub labels_file: Option<PathBuf>,

    /// Mark labels with at most this many videos [default: 2000]
    #[arg(short, long)]
    pub threshold: Option<usize>,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = init_cli_tracing(cli.verbose, cli.log_format.into(), cli.log_filter.as_deref())
        .context("Failed to initialize tracing")?;
    let _session = spans::session(&session_id, cli.command.name()).entered();

    match &cli.command {
        Command::Augment(args) => augment(args),
        Command::Filter(args) => filter(args),
        Command::Stats(args) => stats(args),
    }
}

fn augment(args: &AugmentArgs) -> Result<()> {
    let config = CliConfigBuilder::augment_config(args)?;
    let backend = create_video_backend()?;
    let backend_name = backend.name();
    let progress = ProgressMode::for_stderr(std::io::stderr().is_terminal());

    let processor = AugmentationProcessor::new(config, backend)
        .context("Invalid augmentation configuration")?
        .with_progress_reporter(progress.reporter());
    info!(
        backend = backend_name,
        data_dir = %processor.config().data_dir.display(),
        output_dir = %processor.config().output_dir.display(),
        threshold = processor.config().threshold,
        "Starting augmentation"
    );

    let report = processor.run().context("Augmentation failed")?;

    println!(
        "Augmented {} of {} videos: {} clips written, {} sources skipped, {} new entries",
        report.videos_augmented,
        report.videos_considered,
        report.derived_written,
        report.sources_skipped,
        report.augmented.len()
    );
    Ok(())
}

#[cfg(feature = "video-support")]
fn create_video_backend() -> Result<Box<dyn VideoBackend>> {
    let backend = crate::backends::FFmpegBackend::new().context("Failed to initialize FFmpeg")?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "video-support"))]
fn create_video_backend() -> Result<Box<dyn VideoBackend>> {
    anyhow::bail!("Video processing is not available. Rebuild with --features video-support")
}

fn filter(args: &FilterArgs) -> Result<()> {
    let config = CliConfigBuilder::filter_config(args)?;
    let report = run_existence_filter(&config).context("Existence filter failed")?;

    println!(
        "Kept {} entries, removed {}. Filtered annotations saved to {}",
        report.kept,
        report.removed,
        config.output_file.display()
    );
    Ok(())
}

fn stats(args: &StatsArgs) -> Result<()> {
    let (annotation_file, labels_file, threshold) = CliConfigBuilder::stats_inputs(args);

    let annotations = AnnotationIO::load_annotations(&annotation_file)?;
    let labels = AnnotationIO::load_labels(&labels_file)?;
    let frequencies = LabelFrequencies::count(&annotations, &labels)?;

    let table = format_frequency_table(&frequencies, threshold);
    print!("{table}");
    Ok(())
}

/// Render the ascending frequency table, marking labels selected for augmentation
fn format_frequency_table(frequencies: &LabelFrequencies, threshold: usize) -> String {
    let rows = frequencies.sorted_ascending();
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(5).max(5);

    let mut out = format!("  {:<width$}  {:>8}\n", "label", "videos");
    for (name, count) in &rows {
        let marker = if *count <= threshold { '*' } else { ' ' };
        out.push_str(&format!("{marker} {name:<width$}  {count:>8}\n"));
    }
    let selected = rows.iter().filter(|(_, count)| *count <= threshold).count();
    out.push_str(&format!(
        "{selected} of {} labels at or below threshold {threshold}\n",
        rows.len()
    ));
    out
}
