use crate::domain::document::SourceDocument;
use crate::domain::ports::SourceStore;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File system store rooted at the instrumented project's source directory.
pub struct FileSourceStore {
    root: PathBuf,
}

impl FileSourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceStore for FileSourceStore {
    fn locate(&self, file_name: &str) -> Result<Option<PathBuf>> {
        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|e| {
            // Skip hidden directories below the root itself.
            if e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !(e.file_type().is_dir() && name.starts_with('.'))
        });

        for entry in walker.filter_map(std::result::Result::ok) {
            if entry.file_type().is_file() && entry.file_name().to_string_lossy() == file_name {
                return Ok(Some(entry.into_path()));
            }
        }
        Ok(None)
    }

    fn load(&self, path: &Path) -> Result<SourceDocument> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        Ok(SourceDocument::from_text(&text))
    }

    fn persist(&self, path: &Path, doc: &SourceDocument) -> Result<()> {
        std::fs::write(path, doc.to_text())
            .with_context(|| format!("Failed to write source file: {}", path.display()))
    }
}
