//! Injection requests: one per snippet the engine should guarantee exists.

use crate::domain::anchor::AnchorRule;
use crate::domain::category::Category;
use crate::domain::guard::{Marker, MarkerScope};
use crate::domain::snippet::{SnippetParams, TemplateId};

/// Which half of a reported flow a request instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRole {
    Source,
    Sink,
}

/// A fully-specified insertion job for one file. Immutable once built; the
/// ingestion layer constructs these from analyzer location records via the
/// category table.
#[derive(Debug, Clone)]
pub struct InjectionRequest {
    /// File name the request targets, e.g. `BenchmarkTest00042.java`. Also
    /// used verbatim in printed probe diagnostics.
    pub file: String,
    pub category: Category,
    pub role: ProbeRole,
    pub template: TemplateId,
    pub params: SnippetParams,
    /// Anchor fallback chain, highest priority first.
    pub anchors: Vec<AnchorRule>,
    /// Analyzer-reported line (1-based). May be absent or wrong; anchors are
    /// authoritative, the hint only biases the search.
    pub line_hint: Option<usize>,
    pub marker: Marker,
}

impl InjectionRequest {
    /// Build the sink-check request for one reported sink.
    pub fn sink(category: Category, file: &str, var: &str, line_hint: Option<usize>) -> Self {
        let spec = category.spec();
        let marker = Marker::new(spec.sink_marker, MarkerScope::WholeFile)
            .with_probe(format!("{} at {}", category.label(), file));
        Self {
            file: file.to_string(),
            category,
            role: ProbeRole::Sink,
            template: spec.sink_template,
            params: SnippetParams {
                var: var.to_string(),
                tag_var: spec.sink_tag_var.to_string(),
                display_file: file.to_string(),
                label: category.label().to_string(),
                marker: spec.sink_marker.to_string(),
            },
            anchors: spec.sink_anchors().to_vec(),
            line_hint,
            marker,
        }
    }

    /// Build the source-tagging request for a source reported in the same
    /// file as its sink.
    pub fn source(category: Category, file: &str, var: &str, line_hint: Option<usize>) -> Self {
        let spec = category.spec();
        // The probe mirrors the diagnostic text the chosen template prints.
        let probe = match spec.source_template {
            TemplateId::TagSource => format!("Tag set at source {file}"),
            _ => format!("SOURCE: {file}"),
        };
        let marker = Marker::new(spec.source_marker, MarkerScope::WholeFile).with_probe(probe);
        Self {
            file: file.to_string(),
            category,
            role: ProbeRole::Source,
            template: spec.source_template,
            params: SnippetParams {
                var: var.to_string(),
                tag_var: spec.source_tag_var.to_string(),
                display_file: file.to_string(),
                label: category.label().to_string(),
                marker: spec.source_marker.to_string(),
            },
            anchors: spec.source_anchors().to_vec(),
            line_hint,
            marker,
        }
    }
}
