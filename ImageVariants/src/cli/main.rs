//! variant-batch - derive WebP variants for images already on disk
//!
//! Scans the configured image directories (or those given on the command
//! line) and writes every missing variant next to its source. Safe to run
//! repeatedly.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use image_variants::{BatchProcessor, FsStore, Settings, VariantGenerator};

#[derive(Debug, Parser)]
#[command(name = "variant-batch", version, about)]
struct Args {
    /// Directories to scan instead of the configured ones
    dirs: Vec<PathBuf>,

    /// Exit with a failure status when any file or variant failed
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize logging")?;

    let settings = Settings::from_env();
    let dirs = if args.dirs.is_empty() {
        settings.scan_dirs.clone()
    } else {
        args.dirs
    };

    tracing::info!("Generating variants in {} director(ies)", dirs.len());

    let processor = BatchProcessor::new(VariantGenerator::new(FsStore));
    let report = processor.process_all(&dirs);

    print!("{report}");

    if args.strict && !report.is_clean() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
