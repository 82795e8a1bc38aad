//! Idempotency guard: detect previously inserted snippets and remove them by
//! marker when a caller wants to regenerate.
//!
//! Every rendered block starts with a marker comment. The guard recognizes a
//! prior application either by that marker or by a characteristic substring
//! of the rendered text (the probe), so files instrumented by builds that
//! predate the marker scheme are still recognized.

use crate::domain::document::SourceDocument;

/// How far a prior-application check looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerScope {
    /// Only the given number of lines on either side of the candidate
    /// insertion point.
    Window(usize),
    /// Anywhere in the document. Used for snippets that must exist at most
    /// once per file regardless of where a later anchor resolves.
    WholeFile,
}

/// Stable identity of one inserted snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// The marker comment line, e.g. `// [TAINTPATCH: SQL_SINK]`.
    pub text: String,
    /// Optional characteristic substring of the rendered block.
    pub probe: Option<String>,
    pub scope: MarkerScope,
}

impl Marker {
    pub fn new(text: impl Into<String>, scope: MarkerScope) -> Self {
        Self {
            text: text.into(),
            probe: None,
            scope,
        }
    }

    pub fn with_probe(mut self, probe: impl Into<String>) -> Self {
        self.probe = Some(probe.into());
        self
    }

    fn hits(&self, line: &str) -> bool {
        line.contains(&self.text) || self.probe.as_deref().is_some_and(|p| line.contains(p))
    }
}

/// Outcome of a marker-scoped removal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Number of blocks removed (possibly zero: marker absent).
    Removed(usize),
    /// A marker was found but its block's delimiters never balanced within
    /// the file; the document was left unchanged.
    Unbalanced,
}

/// True if the snippet identified by `marker` already exists near line `at`
/// (or anywhere, for whole-file scoped markers).
pub fn already_applied(doc: &SourceDocument, marker: &Marker, at: usize) -> bool {
    match marker.scope {
        MarkerScope::WholeFile => doc.lines().any(|l| marker.hits(l)),
        MarkerScope::Window(w) => {
            let start = at.saturating_sub(w);
            let end = (at + w).min(doc.len());
            (start..end).any(|i| doc.line(i).is_some_and(|l| marker.hits(l)))
        }
    }
}

/// Delete every block introduced by `marker_text`.
///
/// Each block is the marker line plus the span through the line on which the
/// block's braces balance: scanning forward from the marker, depth counts
/// `{`/`}` per line, starting once the first `{` appears. If any marker's
/// scan reaches the end of the file without balancing, nothing at all is
/// removed and [Removal::Unbalanced] is returned.
pub fn remove_marked_blocks(doc: &mut SourceDocument, marker_text: &str) -> Removal {
    // Plan all spans first so a late unbalanced block cannot leave the
    // document half-stripped.
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;
    while i < doc.len() {
        if !doc.line(i).is_some_and(|l| l.contains(marker_text)) {
            i += 1;
            continue;
        }
        match marked_span_end(doc, i) {
            Some(end) => {
                spans.push((i, end));
                i = end;
            }
            None => return Removal::Unbalanced,
        }
    }

    for &(start, end) in spans.iter().rev() {
        doc.remove_span(start, end);
    }
    Removal::Removed(spans.len())
}

/// Exclusive end index of the block whose marker sits at `marker_idx`, or
/// `None` if its braces never balance.
fn marked_span_end(doc: &SourceDocument, marker_idx: usize) -> Option<usize> {
    let mut depth: i64 = 0;
    let mut started = false;
    for i in (marker_idx + 1)..doc.len() {
        let line = doc.line(i)?;
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    started = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if started && depth <= 0 {
            return Some(i + 1);
        }
    }
    None
}
