//! Ingestion of analyzer result tables.
//!
//! Each CSV row is one reported flow: eight positional columns, source half
//! then sink half (`class, context, expression, line` for each). A row
//! yields a sink-check request for the sink class's file, plus a
//! source-tagging request when the flow starts and ends in the same file —
//! cross-file sources are tagged where the shared helper reads the
//! parameter, which is outside this tool's insertion scope.

use crate::domain::category::Category;
use crate::domain::request::InjectionRequest;
use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern"));

/// One raw CSV row, positionally deserialized. Header and malformed rows
/// fail deserialization and are skipped.
#[derive(Debug, Deserialize)]
struct RawRow(
    String, // source class
    String, // source context
    String, // source expression
    String, // source line
    String, // sink class
    String, // sink context
    String, // sink expression / variable
    String, // sink line
);

/// A cleaned-up location record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRecord {
    pub source_class: String,
    pub source_var: String,
    pub source_line: Option<usize>,
    pub sink_class: String,
    pub sink_var: String,
    pub sink_line: Option<usize>,
}

impl LocationRecord {
    pub fn same_file(&self) -> bool {
        self.source_class == self.sink_class
    }
}

/// Results subdirectory per category, matching the analyzer's layout.
pub fn results_dir_name(category: Category) -> &'static str {
    match category {
        Category::PathTraversal => "cwe-022",
        Category::CommandInjection => "cwe-078",
        Category::SqlInjection => "cwe-089",
    }
}

/// Newest `.csv` in `dir` by modification time; analyzer runs accumulate
/// several result files and only the latest is authoritative.
pub fn newest_csv_in(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list results directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "csv") {
            let mtime = entry.metadata()?.modified()?;
            candidates.push((mtime, path));
        }
    }
    let Some((_, newest)) = candidates.into_iter().max_by_key(|(t, _)| *t) else {
        bail!("No .csv result file in {}", dir.display());
    };
    Ok(newest)
}

/// Parse the result table, dropping header rows and rows that do not carry
/// all eight columns.
pub fn read_location_records(path: &Path) -> Result<Vec<LocationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open result table: {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("Malformed CSV in {}", path.display()))?;
        if row.get(0).is_some_and(|c| c.trim().eq_ignore_ascii_case("col0")) {
            continue;
        }
        let Ok(raw) = row.deserialize::<RawRow>(None) else {
            continue;
        };
        records.push(LocationRecord {
            source_class: raw.0.trim().to_string(),
            source_var: head_identifier(&raw.2),
            source_line: parse_line(&raw.3),
            sink_class: raw.4.trim().to_string(),
            sink_var: sanitize_var(&raw.6),
            sink_line: parse_line(&raw.7),
        });
    }
    Ok(records)
}

/// Expand records into per-file injection requests.
pub fn requests_for(records: &[LocationRecord], category: Category) -> Vec<InjectionRequest> {
    let mut requests = Vec::new();
    for rec in records {
        if let Some(file) = class_file_name(&rec.sink_class) {
            requests.push(InjectionRequest::sink(
                category,
                &file,
                &rec.sink_var,
                rec.sink_line,
            ));
            if rec.same_file() {
                requests.push(InjectionRequest::source(
                    category,
                    &file,
                    &rec.source_var,
                    rec.source_line,
                ));
            }
        }
    }
    requests
}

/// `org.example.BenchmarkTest00042` -> `BenchmarkTest00042.java`.
fn class_file_name(qualified: &str) -> Option<String> {
    let short = qualified.rsplit('.').next()?.trim();
    if short.is_empty() {
        return None;
    }
    Some(format!("{short}.java"))
}

/// `param(...)` -> `param`; anything that is not an identifier falls back to
/// the corpus's parameter name.
fn head_identifier(expr: &str) -> String {
    let head = expr.split('(').next().unwrap_or_default().trim();
    sanitize_var(head)
}

fn sanitize_var(raw: &str) -> String {
    let v = raw.trim();
    if IDENTIFIER.is_match(v) {
        v.to_string()
    } else {
        "param".to_string()
    }
}

fn parse_line(raw: &str) -> Option<usize> {
    raw.trim().parse().ok()
}
