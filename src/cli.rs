use crate::adapters::diagnostics::log::TracingDiagnostics;
use crate::adapters::fs::store::FileSourceStore;
use crate::adapters::ingest::codeql::{
    newest_csv_in, read_location_records, requests_for, results_dir_name,
};
use crate::app::dto::BatchReport;
use crate::app::engine::{BatchEngine, EngineOptions};
use crate::domain::category::Category;
use crate::domain::patcher::PatchConfig;
use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    PathTraversal,
    CommandInjection,
    SqlInjection,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::PathTraversal => Category::PathTraversal,
            CategoryArg::CommandInjection => Category::CommandInjection,
            CategoryArg::SqlInjection => Category::SqlInjection,
        }
    }
}

/// Insert taint-tracking probes into Java sources at the locations reported
/// by a static analyzer.
#[derive(Debug, Parser)]
#[command(name = "taintpatch", version)]
pub struct Cli {
    /// Defect category to instrument.
    #[arg(long, value_enum)]
    pub category: CategoryArg,

    /// Root of the Java source tree to patch.
    #[arg(long)]
    pub root: PathBuf,

    /// Directory holding the per-category analyzer result folders
    /// (cwe-022/, cwe-078/, cwe-089/).
    #[arg(long)]
    pub results: PathBuf,

    /// Strip previously inserted blocks before re-inserting, so changed
    /// templates replace stale renderings.
    #[arg(long)]
    pub refresh: bool,

    /// Apply everything in memory, write nothing, print the report.
    #[arg(long)]
    pub dry_run: bool,

    /// Write the JSON batch report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Neighborhood radius (in lines) searched around analyzer line hints.
    #[arg(long, default_value_t = 30)]
    pub radius: usize,
}

pub fn run(cli: Cli) -> Result<BatchReport> {
    let category: Category = cli.category.into();

    let results_dir = cli.results.join(results_dir_name(category));
    let csv_path = newest_csv_in(&results_dir)?;
    tracing::info!(csv = %csv_path.display(), %category, "reading analyzer results");

    let records = read_location_records(&csv_path)?;
    let requests = requests_for(&records, category);
    tracing::info!(
        records = records.len(),
        requests = requests.len(),
        "expanded location records"
    );

    let config = PatchConfig {
        anchor_radius: cli.radius,
        ..PatchConfig::default()
    };
    let engine = BatchEngine::new(
        Arc::new(FileSourceStore::new(&cli.root)),
        Arc::new(TracingDiagnostics::new()),
        &config,
        EngineOptions {
            refresh: cli.refresh,
            dry_run: cli.dry_run,
        },
    );

    let report = engine.run(category, requests);

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    }
    Ok(report)
}
