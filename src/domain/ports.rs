use crate::domain::document::SourceDocument;
use crate::domain::patcher::SkipEvent;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Source file access port (implemented by Infrastructure).
///
/// The engine reads a file once, mutates it in memory, and writes it back
/// once; no streaming, no partial writes.
pub trait SourceStore: Send + Sync {
    /// Locate a file by bare name under the store's root.
    fn locate(&self, file_name: &str) -> Result<Option<PathBuf>>;

    fn load(&self, path: &Path) -> Result<SourceDocument>;

    fn persist(&self, path: &Path, doc: &SourceDocument) -> Result<()>;
}

/// Structured reporting port. Every skipped request goes through here; the
/// engine itself produces no other output.
pub trait DiagnosticsSink: Send + Sync {
    fn skip(&self, event: &SkipEvent);
}
