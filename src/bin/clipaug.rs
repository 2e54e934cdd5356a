//! clipaug CLI Tool
//!
//! Command-line interface for augmenting and filtering video action datasets.

#[cfg(feature = "cli")]
use clipaug::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
