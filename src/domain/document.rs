/// In-memory line buffer for exactly one source file.
///
/// The engine mutates a `SourceDocument` through contiguous block insertions
/// and marker-scoped removals only; the caller is responsible for loading the
/// text and writing it back (see [crate::domain::ports::SourceStore]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    lines: Vec<String>,
}

impl SourceDocument {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(String::from).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Serialize back to file text. Every line, including the last, is
    /// newline-terminated.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// True if any single line contains `needle`. All idempotency probes and
    /// import checks are line-local, so this is the only containment query
    /// the engine needs.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// Index of the first line in `needle`'s haystack role: the first line
    /// containing the given substring.
    pub fn find_line(&self, needle: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.contains(needle))
    }

    /// Index of the `package` declaration line, if any.
    pub fn package_line(&self) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| l.trim_start().starts_with("package "))
    }

    /// Leading whitespace of the given line; empty for out-of-range indices.
    pub fn indent_of(&self, idx: usize) -> &str {
        match self.lines.get(idx) {
            Some(line) => {
                let trimmed = line.trim_start();
                &line[..line.len() - trimmed.len()]
            }
            None => "",
        }
    }

    /// Clamp a 1-based line hint into a valid 0-based index.
    pub fn clamp_hint(&self, hint_1based: usize) -> usize {
        hint_1based
            .saturating_sub(1)
            .min(self.lines.len().saturating_sub(1))
    }

    /// Splice a contiguous block in front of line `idx`. An index equal to
    /// `len()` appends at the end of the file.
    pub fn insert_block(&mut self, idx: usize, block: &[String]) {
        let at = idx.min(self.lines.len());
        self.lines.splice(at..at, block.iter().cloned());
    }

    /// Remove the half-open span `[start, end)`.
    pub fn remove_span(&mut self, start: usize, end: usize) {
        let start = start.min(self.lines.len());
        let end = end.clamp(start, self.lines.len());
        self.lines.drain(start..end);
    }
}
