//! The patch orchestrator: resolve, vet, guard, render, splice.
//!
//! `apply` is the engine's single entry point per request. Every failure
//! mode is a recoverable skip — a syntactically broken source file is
//! strictly worse than a missed instrumentation point, so the patcher never
//! inserts at a site it cannot vouch for.

use crate::domain::anchor::AnchorResolver;
use crate::domain::boundary::BoundaryScanner;
use crate::domain::category::Category;
use crate::domain::document::SourceDocument;
use crate::domain::guard::{self, Removal};
use crate::domain::request::InjectionRequest;
use crate::domain::snippet::{indent_block, render};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a request was not (re-)applied. `AlreadyApplied` is a benign no-op;
/// the rest mean the snippet is missing and the batch report says so.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no anchor pattern matched")]
    AnchorNotFound,
    #[error("enclosing block header never closed near line {line}")]
    AmbiguousBoundary { line: usize },
    #[error("snippet already present")]
    AlreadyApplied,
    #[error("marked block for {marker} never closed")]
    MarkerRemovalFailed { marker: String },
}

impl SkipReason {
    /// Reason slug used in structured diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::AnchorNotFound => "anchor-not-found",
            SkipReason::AmbiguousBoundary { .. } => "ambiguous-boundary",
            SkipReason::AlreadyApplied => "already-applied",
            SkipReason::MarkerRemovalFailed { .. } => "marker-removal-failed",
        }
    }
}

/// Structured skip event handed to the diagnostics sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipEvent {
    pub file: String,
    pub category: Category,
    pub reason: String,
}

impl SkipEvent {
    pub fn new(req: &InjectionRequest, reason: &SkipReason) -> Self {
        Self {
            file: req.file.clone(),
            category: req.category,
            reason: reason.to_string(),
        }
    }
}

/// Tunables threaded into the engine entry point. Defaults match the code
/// corpus the anchor chains were tuned on.
#[derive(Debug, Clone)]
pub struct PatchConfig {
    /// Neighborhood searched around a line hint before the full-file scan.
    pub anchor_radius: usize,
    /// Backward bound of the header keyword scan.
    pub header_lookback: usize,
    /// Forward bound of the header delimiter scan.
    pub header_lookforward: usize,
    /// Keyword opening the resource-acquisition construct.
    pub header_keyword: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            anchor_radius: 30,
            header_lookback: 120,
            header_lookforward: 400,
            header_keyword: "try".to_string(),
        }
    }
}

pub struct Patcher {
    resolver: AnchorResolver,
    scanner: BoundaryScanner,
}

impl Default for Patcher {
    fn default() -> Self {
        Self::new(&PatchConfig::default())
    }
}

impl Patcher {
    pub fn new(config: &PatchConfig) -> Self {
        Self {
            resolver: AnchorResolver::new(config.anchor_radius),
            scanner: BoundaryScanner::new(
                &config.header_keyword,
                config.header_lookback,
                config.header_lookforward,
            ),
        }
    }

    /// Guarantee the request's snippet exists exactly once in `doc`.
    ///
    /// Resolve the anchor, compute the safe insertion point, bail if the
    /// snippet is already there, then splice the indented block. Applying
    /// the same request again returns `Err(AlreadyApplied)` and leaves the
    /// document untouched.
    pub fn apply(
        &self,
        doc: &mut SourceDocument,
        req: &InjectionRequest,
    ) -> Result<(), SkipReason> {
        let anchor = self
            .resolver
            .resolve(doc, &req.anchors, req.line_hint)
            .ok_or(SkipReason::AnchorNotFound)?;

        let placement = req.anchors[anchor.rule_index].placement;
        let point = self
            .scanner
            .safe_point(doc, anchor.line, placement)
            .ok_or(SkipReason::AmbiguousBoundary { line: anchor.line })?;

        if guard::already_applied(doc, &req.marker, point.line) {
            return Err(SkipReason::AlreadyApplied);
        }

        let block = indent_block(&render(req.template, &req.params), &point.indent);
        doc.insert_block(point.splice_index(), &block);
        Ok(())
    }

    /// Remove a previously applied snippet so it can be regenerated.
    /// Missing markers are fine (`Ok` with nothing removed); an unbalanced
    /// block is a skip and leaves the document unchanged.
    pub fn remove(
        &self,
        doc: &mut SourceDocument,
        req: &InjectionRequest,
    ) -> Result<usize, SkipReason> {
        match guard::remove_marked_blocks(doc, &req.marker.text) {
            Removal::Removed(n) => Ok(n),
            Removal::Unbalanced => Err(SkipReason::MarkerRemovalFailed {
                marker: req.marker.text.clone(),
            }),
        }
    }
}
