//! splash2xdmf: create XDMF files for libSplash HDF5 output.
//!
//! The XDMF file references the datasets in place, so the HDF5 files can be
//! loaded into XDMF-aware visualization tools such as ParaView or VisIt.

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use splash_reader::{silence_hdf5_errors, SplashFile};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use args::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG takes precedence over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    silence_hdf5_errors();

    let options = args.options()?;
    let report = splash_xdmf::convert(&args.input, &options, SplashFile::open_container)
        .with_context(|| format!("Conversion of '{}' failed", args.input.display()))?;

    let diagnostics = report.diagnostics().count();
    info!(
        files = report.summaries.len(),
        skipped_files = report.skipped.len(),
        skipped_datasets = diagnostics,
        outputs = ?report.outputs,
        "Conversion complete"
    );

    Ok(())
}
