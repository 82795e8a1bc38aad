//! Defect categories and their per-category configuration.
//!
//! One generic engine serves every category; everything category-specific —
//! anchor fallback chains, snippet templates, marker strings — lives in the
//! table below. Extending coverage to new code shapes means editing a chain,
//! not the engine.
//!
//! Chains are ordered from precise line-semantics anchors down to last-resort
//! generic anchors (the `try` keyword), because the resolver gives earlier
//! entries strict priority over later ones.

use crate::domain::anchor::{AnchorPattern, AnchorRule, Placement};
use crate::domain::snippet::TemplateId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Unsanitized value reaches a filesystem path.
    PathTraversal,
    /// Unsanitized value reaches a process argument vector.
    CommandInjection,
    /// Unsanitized value reaches a query string.
    SqlInjection,
}

impl Category {
    pub fn all() -> [Category; 3] {
        [
            Category::PathTraversal,
            Category::CommandInjection,
            Category::SqlInjection,
        ]
    }

    /// Label used inside printed probe diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Category::PathTraversal => "Path Traversal",
            Category::CommandInjection => "Command Injection",
            Category::SqlInjection => "SQL Injection",
        }
    }

    pub fn spec(self) -> &'static CategorySpec {
        match self {
            Category::PathTraversal => &PATH_TRAVERSAL,
            Category::CommandInjection => &COMMAND_INJECTION,
            Category::SqlInjection => &SQL_INJECTION,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Category::PathTraversal => "path-traversal",
            Category::CommandInjection => "command-injection",
            Category::SqlInjection => "sql-injection",
        };
        f.write_str(slug)
    }
}

/// Everything the engine needs to know about one category.
pub struct CategorySpec {
    pub sink_template: TemplateId,
    pub source_template: TemplateId,
    pub sink_tag_var: &'static str,
    pub source_tag_var: &'static str,
    pub sink_marker: &'static str,
    pub source_marker: &'static str,
    sink_anchors: &'static LazyLock<Vec<AnchorRule>>,
    source_anchors: &'static LazyLock<Vec<AnchorRule>>,
}

impl CategorySpec {
    pub fn sink_anchors(&self) -> &[AnchorRule] {
        self.sink_anchors
    }

    pub fn source_anchors(&self) -> &[AnchorRule] {
        self.source_anchors
    }
}

/// Declarations the inserted probes depend on; ensured once per file.
pub fn required_imports() -> Vec<String> {
    vec![
        "import edu.neu.ccs.prl.galette.internal.runtime.Tag;".to_string(),
        "import edu.neu.ccs.prl.galette.internal.runtime.Tainter;".to_string(),
    ]
}

/// Source-side chains are shared: the benchmark corpus derives the tainted
/// local (`bar`) from the request parameter (`param`), so the tag goes in
/// front of the derivation when one exists, otherwise right after the
/// parameter is read or decoded.
static SOURCE_ANCHORS: LazyLock<Vec<AnchorRule>> = LazyLock::new(|| {
    vec![
        AnchorRule::before(AnchorPattern::literal("String bar")),
        AnchorRule::after(AnchorPattern::literal("java.net.URLDecoder.decode(param")),
        AnchorRule::after(AnchorPattern::regex(r"^\s*String\s+param\s*=")),
        AnchorRule::after(AnchorPattern::regex(r"^\s*param\s*=")),
    ]
});

static PATH_SINK_ANCHORS: LazyLock<Vec<AnchorRule>> = LazyLock::new(|| {
    vec![
        AnchorRule::after(AnchorPattern::literal("java.io.File fileTarget =")),
        AnchorRule::after(AnchorPattern::literal("java.io.FileOutputStream fos = null;")),
        AnchorRule::after(AnchorPattern::regex(r"^\s*(?:[\w.<>\[\]\s]+\s+)?fileName\s*=")),
        AnchorRule::after(AnchorPattern::literal("java.io.FileInputStream fis = null;")),
        AnchorRule::after(AnchorPattern::regex(r"^\s*(?:java\.nio\.file\.)?Path\s+\w+\s*=")),
        AnchorRule::before(AnchorPattern::literal("response.getWriter()")),
        AnchorRule::before(AnchorPattern::literal("try")),
    ]
});

static CMD_SINK_ANCHORS: LazyLock<Vec<AnchorRule>> = LazyLock::new(|| {
    vec![
        AnchorRule::before(AnchorPattern::literal("String[] args = {")),
        AnchorRule::before(AnchorPattern::literal("args = new String[]")),
        AnchorRule::before(AnchorPattern::regex(r"^\s*argList\.add\(")),
        AnchorRule::before(AnchorPattern::literal("String[] argsEnv = {")),
        AnchorRule::before(AnchorPattern::regex(r"cmd\s*\+\s*(?:param|bar)")),
        AnchorRule::before(AnchorPattern::literal("try")),
    ]
});

static SQL_SINK_ANCHORS: LazyLock<Vec<AnchorRule>> = LazyLock::new(|| {
    vec![
        AnchorRule::new(
            AnchorPattern::literal("String sql"),
            Placement::AfterStatementEnd,
        ),
        AnchorRule::before(AnchorPattern::regex(
            r"^\s*(?:java\.sql\.)?(?:Prepared|Callable)Statement\b.*=",
        )),
        AnchorRule::before(AnchorPattern::regex(r"^\s*(?:java\.sql\.)?Statement\b.*=")),
        AnchorRule::before(AnchorPattern::regex(r"^\s*\w+\s*=\s*\w+\.prepare(?:Statement|Call)\(")),
        AnchorRule::before(AnchorPattern::regex(r"^\s*\w+\.execute(?:Update|Query|Batch)?\(")),
        AnchorRule::before(AnchorPattern::literal("try")),
    ]
});

static PATH_TRAVERSAL: CategorySpec = CategorySpec {
    sink_template: TemplateId::CheckSinkIndexed,
    source_template: TemplateId::TagSourceIndexed,
    sink_tag_var: "cTag",
    source_tag_var: "tag",
    sink_marker: "// [TAINTPATCH: PATH_SINK]",
    source_marker: "// [TAINTPATCH: PATH_SOURCE]",
    sink_anchors: &PATH_SINK_ANCHORS,
    source_anchors: &SOURCE_ANCHORS,
};

static COMMAND_INJECTION: CategorySpec = CategorySpec {
    sink_template: TemplateId::CheckSinkIndexed,
    source_template: TemplateId::TagSourceIndexed,
    sink_tag_var: "cTag",
    source_tag_var: "tag",
    sink_marker: "// [TAINTPATCH: CMD_SINK]",
    source_marker: "// [TAINTPATCH: CMD_SOURCE]",
    sink_anchors: &CMD_SINK_ANCHORS,
    source_anchors: &SOURCE_ANCHORS,
};

static SQL_INJECTION: CategorySpec = CategorySpec {
    sink_template: TemplateId::CheckSink,
    source_template: TemplateId::TagSource,
    sink_tag_var: "tagCheck",
    source_tag_var: "tag",
    sink_marker: "// [TAINTPATCH: SQL_SINK]",
    source_marker: "// [TAINTPATCH: SQL_SOURCE]",
    sink_anchors: &SQL_SINK_ANCHORS,
    source_anchors: &SOURCE_ANCHORS,
};
