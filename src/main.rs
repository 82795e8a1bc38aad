use anyhow::Result;
use clap::Parser;
use taintpatch::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let report = cli::run(cli)?;

    println!(
        "{}: {} applied, {} already present, {} skipped, {} file(s) failed",
        report.category,
        report.applied,
        report.already_applied,
        report.skipped,
        report.failed_files
    );
    Ok(())
}
