//! Batch orchestration: one pass over all files named by a request batch.
//!
//! Each file is exclusively owned by the worker processing it — loaded once,
//! mutated in memory across all of its requests, written back once. There is
//! no cross-file state, so files fan out across the rayon pool, and one
//! file's failure never touches the rest of the batch.

use crate::app::dto::{BatchReport, FileOutcome};
use crate::domain::category::{Category, required_imports};
use crate::domain::imports::ensure_imports;
use crate::domain::patcher::{PatchConfig, Patcher, SkipEvent, SkipReason};
use crate::domain::ports::{DiagnosticsSink, SourceStore};
use crate::domain::request::InjectionRequest;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Strip previously inserted blocks by marker before re-inserting, so a
    /// changed template replaces the stale rendering instead of being
    /// skipped as already applied.
    pub refresh: bool,
    /// Apply everything in memory but persist nothing.
    pub dry_run: bool,
}

pub struct BatchEngine {
    store: Arc<dyn SourceStore>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    patcher: Patcher,
    imports: Vec<String>,
    options: EngineOptions,
}

impl BatchEngine {
    pub fn new(
        store: Arc<dyn SourceStore>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        config: &PatchConfig,
        options: EngineOptions,
    ) -> Self {
        Self {
            store,
            diagnostics,
            patcher: Patcher::new(config),
            imports: required_imports(),
            options,
        }
    }

    /// Apply every request, grouped per target file. Request order within a
    /// file follows the line hints in descending order so earlier splices
    /// cannot shift the sites of later ones; hintless requests run last
    /// against the document's current state.
    pub fn run(&self, category: Category, requests: Vec<InjectionRequest>) -> BatchReport {
        let mut by_file: BTreeMap<String, Vec<InjectionRequest>> = BTreeMap::new();
        for req in requests {
            by_file.entry(req.file.clone()).or_default().push(req);
        }

        let files: Vec<FileOutcome> = by_file
            .into_par_iter()
            .map(|(file, reqs)| self.process_file(&file, reqs))
            .collect();

        let mut report = BatchReport {
            category,
            applied: 0,
            already_applied: 0,
            skipped: 0,
            failed_files: 0,
            files: Vec::new(),
        };
        for outcome in files {
            report.applied += outcome.applied;
            report.already_applied += outcome.already_applied;
            report.skipped += outcome.skips.len();
            if outcome.error.is_some() {
                report.failed_files += 1;
            }
            report.files.push(outcome);
        }
        report
    }

    fn process_file(&self, file: &str, mut requests: Vec<InjectionRequest>) -> FileOutcome {
        let path = match self.store.locate(file) {
            Ok(Some(path)) => path,
            Ok(None) => return FileOutcome::failed(file, "file not found under source root"),
            Err(e) => return FileOutcome::failed(file, format!("{e:#}")),
        };
        let mut doc = match self.store.load(&path) {
            Ok(doc) => doc,
            Err(e) => return FileOutcome::failed(file, format!("{e:#}")),
        };

        let mut outcome = FileOutcome {
            file: file.to_string(),
            path: Some(path.display().to_string()),
            applied: 0,
            already_applied: 0,
            removed: 0,
            skips: Vec::new(),
            written: false,
            error: None,
        };

        let mut changed = ensure_imports(&mut doc, &self.imports);

        if self.options.refresh {
            let mut seen_markers = Vec::new();
            for req in &requests {
                if seen_markers.contains(&req.marker.text) {
                    continue;
                }
                seen_markers.push(req.marker.text.clone());
                match self.patcher.remove(&mut doc, req) {
                    Ok(n) => {
                        outcome.removed += n;
                        changed |= n > 0;
                    }
                    Err(reason) => self.record_skip(&mut outcome, req, reason),
                }
            }
        }

        // Descending hints first, then anchor-only requests.
        requests.sort_by_key(|r| std::cmp::Reverse(r.line_hint.unwrap_or(0)));

        for req in &requests {
            match self.patcher.apply(&mut doc, req) {
                Ok(()) => {
                    outcome.applied += 1;
                    changed = true;
                }
                Err(SkipReason::AlreadyApplied) => {
                    outcome.already_applied += 1;
                    self.diagnostics
                        .skip(&SkipEvent::new(req, &SkipReason::AlreadyApplied));
                }
                Err(reason) => self.record_skip(&mut outcome, req, reason),
            }
        }

        if changed && !self.options.dry_run {
            match self.store.persist(&path, &doc) {
                Ok(()) => outcome.written = true,
                Err(e) => outcome.error = Some(format!("{e:#}")),
            }
        }
        outcome
    }

    fn record_skip(&self, outcome: &mut FileOutcome, req: &InjectionRequest, reason: SkipReason) {
        let event = SkipEvent::new(req, &reason);
        self.diagnostics.skip(&event);
        outcome.skips.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::diagnostics::log::CollectingDiagnostics;
    use crate::domain::document::SourceDocument;
    use anyhow::Result;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// In-memory store over a fixed set of named files.
    struct MemStore {
        files: Mutex<BTreeMap<String, String>>,
    }

    impl MemStore {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                files: Mutex::new(
                    files
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
            }
        }

        fn text(&self, name: &str) -> String {
            self.files.lock().unwrap().get(name).cloned().unwrap()
        }
    }

    impl SourceStore for MemStore {
        fn locate(&self, file_name: &str) -> Result<Option<PathBuf>> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .contains_key(file_name)
                .then(|| PathBuf::from(file_name)))
        }

        fn load(&self, path: &Path) -> Result<SourceDocument> {
            let name = path.to_string_lossy();
            Ok(SourceDocument::from_text(
                self.files.lock().unwrap().get(name.as_ref()).unwrap(),
            ))
        }

        fn persist(&self, path: &Path, doc: &SourceDocument) -> Result<()> {
            let name = path.to_string_lossy().into_owned();
            self.files.lock().unwrap().insert(name, doc.to_text());
            Ok(())
        }
    }

    const SIMPLE: &str = "package p;\nclass T {\n    void f(String sql) {\n        stmt.executeQuery(sql);\n    }\n}\n";

    fn engine(store: Arc<MemStore>, diag: Arc<CollectingDiagnostics>) -> BatchEngine {
        BatchEngine::new(store, diag, &PatchConfig::default(), EngineOptions::default())
    }

    #[test]
    fn test_run_patches_file_and_reports() {
        let store = Arc::new(MemStore::new(&[("T.java", SIMPLE)]));
        let diag = Arc::new(CollectingDiagnostics::new());
        let e = engine(store.clone(), diag.clone());

        let reqs = vec![InjectionRequest::sink(
            Category::SqlInjection,
            "T.java",
            "sql",
            Some(4),
        )];
        let report = e.run(Category::SqlInjection, reqs);

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed_files, 0);
        assert!(report.files[0].written);

        let text = store.text("T.java");
        assert!(text.contains("import edu.neu.ccs.prl.galette.internal.runtime.Tag;"));
        assert!(text.contains("// [TAINTPATCH: SQL_SINK]"));
        assert!(diag.events().is_empty());
    }

    #[test]
    fn test_missing_file_is_isolated() {
        let store = Arc::new(MemStore::new(&[("T.java", SIMPLE)]));
        let diag = Arc::new(CollectingDiagnostics::new());
        let e = engine(store.clone(), diag);

        let reqs = vec![
            InjectionRequest::sink(Category::SqlInjection, "Missing.java", "sql", None),
            InjectionRequest::sink(Category::SqlInjection, "T.java", "sql", Some(4)),
        ];
        let report = e.run(Category::SqlInjection, reqs);

        assert_eq!(report.failed_files, 1);
        assert_eq!(report.applied, 1);
        assert!(store.text("T.java").contains("[TAINTPATCH: SQL_SINK]"));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let store = Arc::new(MemStore::new(&[("T.java", SIMPLE)]));
        let diag = Arc::new(CollectingDiagnostics::new());
        let e = engine(store.clone(), diag.clone());

        let reqs = || {
            vec![InjectionRequest::sink(
                Category::SqlInjection,
                "T.java",
                "sql",
                Some(4),
            )]
        };
        e.run(Category::SqlInjection, reqs());
        let after_first = store.text("T.java");

        let second = e.run(Category::SqlInjection, reqs());
        assert_eq!(second.applied, 0);
        assert_eq!(second.already_applied, 1);
        assert_eq!(store.text("T.java"), after_first);
        // The benign skip is still reported to diagnostics.
        assert_eq!(diag.events().len(), 1);
        assert!(diag.events()[0].reason.contains("already present"));
    }

    #[test]
    fn test_dry_run_persists_nothing() {
        let store = Arc::new(MemStore::new(&[("T.java", SIMPLE)]));
        let diag = Arc::new(CollectingDiagnostics::new());
        let e = BatchEngine::new(
            store.clone(),
            diag,
            &PatchConfig::default(),
            EngineOptions {
                dry_run: true,
                refresh: false,
            },
        );

        let report = e.run(
            Category::SqlInjection,
            vec![InjectionRequest::sink(
                Category::SqlInjection,
                "T.java",
                "sql",
                Some(4),
            )],
        );
        assert_eq!(report.applied, 1);
        assert!(!report.files[0].written);
        assert_eq!(store.text("T.java"), SIMPLE);
    }

    #[test]
    fn test_refresh_removes_then_reinserts() {
        let store = Arc::new(MemStore::new(&[("T.java", SIMPLE)]));
        let diag = Arc::new(CollectingDiagnostics::new());
        let plain = engine(store.clone(), diag.clone());
        let reqs = || {
            vec![InjectionRequest::sink(
                Category::SqlInjection,
                "T.java",
                "sql",
                Some(4),
            )]
        };
        plain.run(Category::SqlInjection, reqs());
        let after_first = store.text("T.java");

        let refresher = BatchEngine::new(
            store.clone(),
            diag,
            &PatchConfig::default(),
            EngineOptions {
                refresh: true,
                dry_run: false,
            },
        );
        let report = refresher.run(Category::SqlInjection, reqs());
        assert_eq!(report.files[0].removed, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(store.text("T.java"), after_first);
    }
}
