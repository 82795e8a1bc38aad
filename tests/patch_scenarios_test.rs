//! Scenario tests for the patch engine: anchor fallback, header safety,
//! idempotence, and the order/indentation invariants.

mod common;

use common::fixtures::{CMDI_FILE, PT_HEADER_FILE, SQLI_SAME_FILE};
use taintpatch::domain::anchor::{AnchorPattern, AnchorRule};
use taintpatch::domain::category::Category;
use taintpatch::domain::document::SourceDocument;
use taintpatch::domain::guard::remove_marked_blocks;
use taintpatch::domain::imports::ensure_imports;
use taintpatch::domain::patcher::{Patcher, SkipReason};
use taintpatch::domain::request::InjectionRequest;

/// Scenario A: a chain of ["decode(", assign-to-param] with a hint on the
/// decode line inserts immediately after that line, via pattern 1.
#[test]
fn test_decode_anchor_wins_over_param_assignment() {
    let mut doc = SourceDocument::from_text(SQLI_SAME_FILE);
    let patcher = Patcher::default();

    let mut req = InjectionRequest::source(
        Category::SqlInjection,
        "BenchmarkTest01234.java",
        "param",
        Some(8),
    );
    req.anchors = vec![
        AnchorRule::after(AnchorPattern::literal("decode(")),
        AnchorRule::after(AnchorPattern::regex(r"^\s*param\s*=")),
    ];

    patcher.apply(&mut doc, &req).unwrap();

    let decode_line = doc.find_line("URLDecoder.decode").unwrap();
    let marker_line = doc.find_line("[TAINTPATCH: SQL_SOURCE]").unwrap();
    assert_eq!(marker_line, decode_line + 1);
}

/// Scenario B: a sink anchor inside a try-with-resources header relocates to
/// the header's first line; nothing ever lands inside the header span.
#[test]
fn test_header_sink_relocates_to_construct_start() {
    let mut doc = SourceDocument::from_text(PT_HEADER_FILE);
    let patcher = Patcher::default();

    let mut req = InjectionRequest::sink(
        Category::PathTraversal,
        "BenchmarkTest05678.java",
        "fileName",
        Some(9),
    );
    req.anchors = vec![AnchorRule::before(AnchorPattern::literal(
        "new java.io.FileInputStream(fileName)",
    ))];

    patcher.apply(&mut doc, &req).unwrap();

    let marker_line = doc.find_line("[TAINTPATCH: PATH_SINK]").unwrap();
    let try_line = doc.find_line("try (").unwrap();
    assert!(
        marker_line < try_line,
        "block at {marker_line} must precede the header at {try_line}"
    );
    // The header span itself is contiguous and unchanged.
    let close = (0..doc.len())
        .find(|&i| doc.line(i).unwrap().trim() == ") {")
        .unwrap();
    assert!(doc.line(close - 1).unwrap().contains("FileInputStream"));
}

/// Scenario C at the patcher level: re-applying every request is a no-op.
#[test]
fn test_reapplying_full_request_set_changes_nothing() {
    let mut doc = SourceDocument::from_text(SQLI_SAME_FILE);
    let patcher = Patcher::default();
    let file = "BenchmarkTest01234.java";

    let requests = [
        InjectionRequest::sink(Category::SqlInjection, file, "sql", Some(14)),
        InjectionRequest::source(Category::SqlInjection, file, "param", Some(8)),
    ];

    for req in &requests {
        patcher.apply(&mut doc, req).unwrap();
    }
    let after_first = doc.clone();

    for req in &requests {
        assert_eq!(patcher.apply(&mut doc, req), Err(SkipReason::AlreadyApplied));
    }
    assert_eq!(doc, after_first);
}

/// Scenario D: import ensuring on a file already carrying the declarations
/// is byte-identical.
#[test]
fn test_import_ensure_is_byte_identical_when_present() {
    let decls = taintpatch::domain::category::required_imports();
    let with_imports = format!(
        "package p;\n{}\n{}\nclass A {{}}\n",
        decls[0], decls[1]
    );
    let mut doc = SourceDocument::from_text(&with_imports);
    assert!(!ensure_imports(&mut doc, &decls));
    assert_eq!(doc.to_text(), with_imports);
}

/// Indentation invariant: every inserted line shares the anchor statement's
/// leading whitespace prefix.
#[test]
fn test_inserted_block_shares_anchor_indentation() {
    let mut doc = SourceDocument::from_text(CMDI_FILE);
    let patcher = Patcher::default();
    let req = InjectionRequest::sink(
        Category::CommandInjection,
        "BenchmarkTest09999.java",
        "bar",
        Some(7),
    );

    let before_len = doc.len();
    patcher.apply(&mut doc, &req).unwrap();
    let inserted = doc.len() - before_len;

    let marker_line = doc.find_line("[TAINTPATCH: CMD_SINK]").unwrap();
    let anchor_indent = doc.indent_of(doc.find_line("String[] args").unwrap());
    assert_eq!(anchor_indent, "        ");
    for i in marker_line..marker_line + inserted {
        let line = doc.line(i).unwrap();
        assert!(
            line.starts_with(anchor_indent),
            "line {i} lost the anchor indent: {line:?}"
        );
    }
}

/// Order invariant: removing every inserted span by marker reproduces the
/// original document exactly.
#[test]
fn test_removing_all_marked_spans_restores_original() {
    // Start from a fixture that already carries the imports so the only
    // mutations are marker-tracked blocks.
    let decls = taintpatch::domain::category::required_imports();
    let mut base = SourceDocument::from_text(CMDI_FILE);
    ensure_imports(&mut base, &decls);
    let original = base.to_text();

    let patcher = Patcher::default();
    let file = "BenchmarkTest09999.java";
    let requests = [
        InjectionRequest::sink(Category::CommandInjection, file, "bar", Some(7)),
        InjectionRequest::source(Category::CommandInjection, file, "param", Some(6)),
    ];
    for req in &requests {
        patcher.apply(&mut base, req).unwrap();
    }
    assert!(base.to_text() != original);

    for req in &requests {
        remove_marked_blocks(&mut base, &req.marker.text);
    }
    assert_eq!(base.to_text(), original);
}

/// The engine favors skipping over guessing: an anchor that only matches
/// inside an unterminated header yields a skip and an untouched document.
#[test]
fn test_unterminated_header_skips_without_mutation() {
    let truncated = "try (\n    Reader r = open();\n    use(r);\n";
    let mut doc = SourceDocument::from_text(truncated);
    let before = doc.clone();
    let patcher = Patcher::default();

    let mut req = InjectionRequest::sink(Category::SqlInjection, "T.java", "r", None);
    req.anchors = vec![AnchorRule::before(AnchorPattern::literal("use(r)"))];

    assert!(matches!(
        patcher.apply(&mut doc, &req),
        Err(SkipReason::AmbiguousBoundary { .. })
    ));
    assert_eq!(doc, before);
}
