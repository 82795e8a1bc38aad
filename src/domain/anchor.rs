//! Anchor resolution: find the line a snippet should be inserted relative to.
//!
//! An anchor chain is an ordered list of fallback rules. Earlier rules are
//! strictly higher priority than later ones, even when a later rule would
//! match closer to the analyzer's line hint — callers order chains from
//! precise line-semantics patterns down to last-resort generic anchors.

use crate::domain::document::SourceDocument;
use regex::Regex;

/// One way of recognizing an anchor line.
#[derive(Debug, Clone)]
pub enum AnchorPattern {
    /// Substring match anywhere in the line.
    Literal(String),
    /// Structural match for anchors a literal cannot pin down
    /// (declaration shapes, assignment heads).
    Pattern(Regex),
}

impl AnchorPattern {
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    /// Panics on an invalid pattern; chains are built from static tables, so
    /// a bad pattern is a programming error, not an input error.
    pub fn regex(s: &str) -> Self {
        Self::Pattern(Regex::new(s).unwrap_or_else(|e| panic!("invalid anchor pattern {s:?}: {e}")))
    }

    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Literal(needle) => line.contains(needle),
            Self::Pattern(re) => re.is_match(line),
        }
    }
}

/// Where the rendered snippet goes relative to a matched anchor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before the start of the statement containing the anchor.
    BeforeStatement,
    /// Directly after the anchor line.
    AfterLine,
    /// After the last line of the (possibly multi-line) statement that
    /// begins at the anchor.
    AfterStatementEnd,
}

/// An anchor pattern plus the placement that applies when it wins.
#[derive(Debug, Clone)]
pub struct AnchorRule {
    pub pattern: AnchorPattern,
    pub placement: Placement,
}

impl AnchorRule {
    pub fn new(pattern: AnchorPattern, placement: Placement) -> Self {
        Self { pattern, placement }
    }

    pub fn before(pattern: AnchorPattern) -> Self {
        Self::new(pattern, Placement::BeforeStatement)
    }

    pub fn after(pattern: AnchorPattern) -> Self {
        Self::new(pattern, Placement::AfterLine)
    }
}

/// A resolved anchor: the matched line and which rule matched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    pub line: usize,
    pub rule_index: usize,
}

/// Resolves anchor chains against a document, preferring lines near the
/// analyzer's hint before falling back to a whole-file scan.
#[derive(Debug, Clone, Copy)]
pub struct AnchorResolver {
    radius: usize,
}

impl AnchorResolver {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }

    /// First match across the chain wins; within one rule, the hint
    /// neighborhood is searched outward (exact line, then ±1, ±2, …) before
    /// the full file is scanned top to bottom.
    pub fn resolve(
        &self,
        doc: &SourceDocument,
        rules: &[AnchorRule],
        hint_1based: Option<usize>,
    ) -> Option<AnchorMatch> {
        for (rule_index, rule) in rules.iter().enumerate() {
            if let Some(line) = self.resolve_one(doc, &rule.pattern, hint_1based) {
                return Some(AnchorMatch { line, rule_index });
            }
        }
        None
    }

    fn resolve_one(
        &self,
        doc: &SourceDocument,
        pattern: &AnchorPattern,
        hint_1based: Option<usize>,
    ) -> Option<usize> {
        if doc.is_empty() {
            return None;
        }

        if let Some(hint) = hint_1based {
            let center = doc.clamp_hint(hint);
            if let Some(line) = self.search_neighborhood(doc, pattern, center) {
                return Some(line);
            }
        }

        (0..doc.len()).find(|&i| pattern.matches(doc.line(i).unwrap_or_default()))
    }

    fn search_neighborhood(
        &self,
        doc: &SourceDocument,
        pattern: &AnchorPattern,
        center: usize,
    ) -> Option<usize> {
        let check = |i: usize| doc.line(i).is_some_and(|l| pattern.matches(l));

        if check(center) {
            return Some(center);
        }
        for d in 1..=self.radius {
            if let Some(up) = center.checked_sub(d)
                && check(up)
            {
                return Some(up);
            }
            let down = center + d;
            if down < doc.len() && check(down) {
                return Some(down);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> SourceDocument {
        SourceDocument::from_text(&lines.join("\n"))
    }

    fn rules(patterns: &[AnchorPattern]) -> Vec<AnchorRule> {
        patterns.iter().cloned().map(AnchorRule::before).collect()
    }

    #[test]
    fn test_literal_match_at_hint() {
        let d = doc(&["a", "b", "target here", "c"]);
        let r = AnchorResolver::new(3);
        let m = r
            .resolve(&d, &rules(&[AnchorPattern::literal("target")]), Some(3))
            .unwrap();
        assert_eq!(m.line, 2);
        assert_eq!(m.rule_index, 0);
    }

    #[test]
    fn test_neighborhood_prefers_closer_line() {
        // Pattern occurs at distance 1 above and distance 2 below the hint;
        // the nearer one wins.
        let d = doc(&["x", "hit", "center", "x", "hit"]);
        let r = AnchorResolver::new(5);
        let m = r
            .resolve(&d, &rules(&[AnchorPattern::literal("hit")]), Some(3))
            .unwrap();
        assert_eq!(m.line, 1);
    }

    #[test]
    fn test_full_file_fallback_when_hint_misses() {
        let d = doc(&["hit", "x", "x", "x", "x", "x", "x", "x"]);
        let r = AnchorResolver::new(2);
        let m = r
            .resolve(&d, &rules(&[AnchorPattern::literal("hit")]), Some(8))
            .unwrap();
        assert_eq!(m.line, 0);
    }

    #[test]
    fn test_earlier_rule_beats_closer_later_rule() {
        // Rule 1 matches far from the hint, rule 2 matches at the hint;
        // rule 1 still wins.
        let d = doc(&["primary", "x", "x", "x", "secondary"]);
        let r = AnchorResolver::new(1);
        let m = r
            .resolve(
                &d,
                &rules(&[
                    AnchorPattern::literal("primary"),
                    AnchorPattern::literal("secondary"),
                ]),
                Some(5),
            )
            .unwrap();
        assert_eq!(m.line, 0);
        assert_eq!(m.rule_index, 0);
    }

    #[test]
    fn test_regex_pattern() {
        let d = doc(&["int x;", "  fileName = foo;", "y"]);
        let r = AnchorResolver::new(2);
        let m = r
            .resolve(
                &d,
                &rules(&[AnchorPattern::regex(r"^\s*(?:[\w.<>\[\]\s]+\s+)?fileName\s*=")]),
                None,
            )
            .unwrap();
        assert_eq!(m.line, 1);
    }

    #[test]
    fn test_no_match_returns_none() {
        let d = doc(&["a", "b"]);
        let r = AnchorResolver::new(2);
        assert!(
            r.resolve(&d, &rules(&[AnchorPattern::literal("missing")]), Some(1))
                .is_none()
        );
    }

    #[test]
    fn test_out_of_range_hint_is_clamped() {
        let d = doc(&["a", "hit"]);
        let r = AnchorResolver::new(1);
        let m = r
            .resolve(&d, &rules(&[AnchorPattern::literal("hit")]), Some(500))
            .unwrap();
        assert_eq!(m.line, 1);
    }
}
