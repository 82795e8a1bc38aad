//! Boundary scanning: turn a raw anchor index into a syntactically safe
//! insertion index.
//!
//! Two independent checks feed the final [SafeInsertionPoint]:
//!
//! 1. `statement_start` walks backward to the first line of the statement
//!    containing the anchor, so a block is never spliced into the middle of
//!    a wrapped expression.
//! 2. `header_scan` detects resource-acquisition headers — `try ( ... )`
//!    constructs whose parenthesized section may legally contain only
//!    resource declarations. Inserting any statement inside such a header is
//!    a hard syntax error, so when the anchor lies inside one the insertion
//!    point is relocated to the header's first line. Detection counts
//!    grouping delimiters across lines while ignoring comment text; it never
//!    builds a syntax tree.

use crate::domain::anchor::Placement;
use crate::domain::document::SourceDocument;
use regex::Regex;
use std::sync::LazyLock;

/// Lines ending in one of these are complete: the next line starts a new
/// statement.
static STATEMENT_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;{}]\s*$").expect("terminator pattern"));

/// How the rendered block relates to the line index of a safe point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionMode {
    /// Insert in front of the line.
    BeforeStatement,
    /// Insert behind the line.
    AfterLine,
}

/// A vetted insertion site: line index, the indentation every inserted line
/// must carry, and whether the block goes before or after that line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeInsertionPoint {
    pub line: usize,
    pub indent: String,
    pub mode: InsertionMode,
}

impl SafeInsertionPoint {
    /// The buffer index a block must be spliced at to honor `mode`.
    pub fn splice_index(&self) -> usize {
        match self.mode {
            InsertionMode::BeforeStatement => self.line,
            InsertionMode::AfterLine => self.line + 1,
        }
    }
}

/// Result of probing an index against enclosing block headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderScan {
    /// Not inside any header; the raw index is usable.
    Outside,
    /// Inside the header spanning `[start, end]`; relocate to `start`.
    Inside { start: usize, end: usize },
    /// A header opened at or before the index but its delimiters never
    /// balanced within the scan bounds. The caller must skip, not guess.
    Ambiguous,
}

#[derive(Debug, Clone)]
pub struct BoundaryScanner {
    header_keyword: Regex,
    lookback: usize,
    lookforward: usize,
}

impl Default for BoundaryScanner {
    fn default() -> Self {
        Self::new("try", 120, 400)
    }
}

impl BoundaryScanner {
    /// `keyword` opens the guarded construct (`try` for Java's
    /// try-with-resources); `lookback`/`lookforward` bound the scan in lines.
    pub fn new(keyword: &str, lookback: usize, lookforward: usize) -> Self {
        let header_keyword = Regex::new(&format!(r"\b{}\b", regex::escape(keyword)))
            .expect("header keyword pattern");
        Self {
            header_keyword,
            lookback,
            lookforward,
        }
    }

    /// First line of the statement containing `idx`: walk backward while the
    /// previous line is neither blank nor terminated.
    pub fn statement_start(&self, doc: &SourceDocument, idx: usize) -> usize {
        let mut i = idx.min(doc.len().saturating_sub(1));
        while i > 0 {
            let prev = doc.line(i - 1).unwrap_or_default().trim_end();
            if prev.is_empty() || STATEMENT_TERMINATOR.is_match(prev) {
                break;
            }
            i -= 1;
        }
        i
    }

    /// Probe whether `idx` lies inside an open resource-acquisition header.
    ///
    /// Scans backward up to `lookback` lines for the header keyword, then
    /// counts parentheses forward from it (comment text ignored) until they
    /// balance. Conservative by contract: a header that opens but never
    /// balances within `lookforward` lines is reported [HeaderScan::Ambiguous]
    /// rather than assumed closed, and the delimiters may open on any line
    /// after the keyword, so a bare block whose body balances its first
    /// parentheses at or after `idx` is treated as enclosing too.
    pub fn header_scan(&self, doc: &SourceDocument, idx: usize) -> HeaderScan {
        if doc.is_empty() {
            return HeaderScan::Outside;
        }
        let idx = idx.min(doc.len() - 1);
        let min_j = idx.saturating_sub(self.lookback);

        for j in (min_j..=idx).rev() {
            let (stripped, _) = strip_comments(doc.line(j).unwrap_or_default(), false);
            let Some(keyword) = self.header_keyword.find(&stripped) else {
                continue;
            };

            let mut depth: i64 = 0;
            let mut saw_open = false;
            count_delims(&stripped[keyword.end()..], &mut depth, &mut saw_open);

            let mut end = if saw_open && depth == 0 { Some(j) } else { None };

            if end.is_none() {
                let mut in_block_comment = false;
                let last = (j + self.lookforward).min(doc.len() - 1);
                for k in (j + 1)..=last {
                    let (s, next_state) =
                        strip_comments(doc.line(k).unwrap_or_default(), in_block_comment);
                    in_block_comment = next_state;
                    count_delims(&s, &mut depth, &mut saw_open);
                    if saw_open && depth == 0 {
                        end = Some(k);
                        break;
                    }
                }
                if saw_open && end.is_none() {
                    // The header is open at idx for all we can tell.
                    return HeaderScan::Ambiguous;
                }
            }

            // No grouping delimiters anywhere in the window: not a header.
            let Some(end) = end else { continue };
            if j <= idx && idx <= end {
                return HeaderScan::Inside { start: j, end };
            }
        }
        HeaderScan::Outside
    }

    /// Combine the statement walk, the header probe, and the requested
    /// placement into a [SafeInsertionPoint]. Returns `None` when the header
    /// probe is ambiguous.
    pub fn safe_point(
        &self,
        doc: &SourceDocument,
        anchor: usize,
        placement: Placement,
    ) -> Option<SafeInsertionPoint> {
        // The header invariant applies to every placement: a point derived
        // from an anchor inside an open header must move to the header start.
        match self.header_scan(doc, anchor) {
            HeaderScan::Ambiguous => return None,
            HeaderScan::Inside { start, .. } => {
                return Some(SafeInsertionPoint {
                    line: start,
                    indent: doc.indent_of(start).to_string(),
                    mode: InsertionMode::BeforeStatement,
                });
            }
            HeaderScan::Outside => {}
        }

        let point = match placement {
            Placement::BeforeStatement => {
                let start = self.statement_start(doc, anchor);
                SafeInsertionPoint {
                    line: start,
                    indent: doc.indent_of(start).to_string(),
                    mode: InsertionMode::BeforeStatement,
                }
            }
            Placement::AfterLine => SafeInsertionPoint {
                line: anchor,
                indent: doc.indent_of(anchor).to_string(),
                mode: InsertionMode::AfterLine,
            },
            Placement::AfterStatementEnd => {
                let end = self.statement_end(doc, anchor);
                SafeInsertionPoint {
                    line: end,
                    indent: doc.indent_of(end).to_string(),
                    mode: InsertionMode::AfterLine,
                }
            }
        };
        Some(point)
    }

    /// Last line of the statement beginning at `idx`: the first line at or
    /// after it carrying a terminator. Falls back to `idx` so a malformed
    /// tail degrades to after-line placement.
    fn statement_end(&self, doc: &SourceDocument, idx: usize) -> usize {
        let last = doc.len().saturating_sub(1);
        for i in idx..=last.min(idx + self.lookforward) {
            if doc.line(i).is_some_and(|l| l.contains(';')) {
                return i;
            }
        }
        idx
    }
}

fn count_delims(s: &str, depth: &mut i64, saw_open: &mut bool) {
    for ch in s.chars() {
        match ch {
            '(' => {
                *depth += 1;
                *saw_open = true;
            }
            ')' => *depth = (*depth - 1).max(0),
            _ => {}
        }
    }
}

/// Drop comment text from one line. `in_block` carries `/* ... */` state
/// across lines; `//` kills the rest of the line. String literals are not
/// interpreted, matching the lexical model the anchor chains are tuned for.
fn strip_comments(line: &str, mut in_block: bool) -> (String, bool) {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < bytes.len() {
        if !in_block && i + 1 < bytes.len() && bytes[i] == b'/' && bytes[i + 1] == b'*' {
            in_block = true;
            i += 2;
            continue;
        }
        if in_block && i + 1 < bytes.len() && bytes[i] == b'*' && bytes[i + 1] == b'/' {
            in_block = false;
            i += 2;
            continue;
        }
        if !in_block && i + 1 < bytes.len() && bytes[i] == b'/' && bytes[i + 1] == b'/' {
            break;
        }
        if !in_block {
            // Safe: we only split at ASCII delimiters checked above.
            let ch_len = utf8_len(bytes[i]);
            out.push_str(&line[i..i + ch_len]);
            i += ch_len;
            continue;
        }
        i += utf8_len(bytes[i]);
    }
    (out, in_block)
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b >> 5 == 0b110 => 2,
        b if b >> 4 == 0b1110 => 3,
        _ => 4,
    }
}
