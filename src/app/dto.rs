use crate::domain::category::Category;
use crate::domain::patcher::SkipEvent;
use serde::{Deserialize, Serialize};

/// Result of one batch run, suitable for `--report` JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub category: Category,
    pub files: Vec<FileOutcome>,
    pub applied: usize,
    pub already_applied: usize,
    pub skipped: usize,
    pub failed_files: usize,
}

/// Per-file outcome. A file-level `error` (unlocatable, unreadable) never
/// aborts the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub file: String,
    pub path: Option<String>,
    pub applied: usize,
    pub already_applied: usize,
    pub removed: usize,
    pub skips: Vec<SkipEvent>,
    pub written: bool,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn failed(file: &str, error: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            path: None,
            applied: 0,
            already_applied: 0,
            removed: 0,
            skips: Vec::new(),
            written: false,
            error: Some(error.into()),
        }
    }
}
