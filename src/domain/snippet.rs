//! Snippet rendering: turn a template id plus substitution parameters into
//! the lines of an instrumentation block.
//!
//! Every rendered block has the same outer shape: the marker comment, then
//! one braced Java block holding the probe body. The braces scope the
//! probe's locals (so two probes can land in one method without colliding)
//! and give marker-scoped removal a balanced delimiter span to delete.
//!
//! Rendered lines carry no absolute indentation — only the relative nesting
//! inside the block. The patcher prefixes every line with the anchor
//! statement's indentation, so the whole block shares the anchor's leading
//! whitespace exactly.

/// The four probe shapes the engine can insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    /// Tag the suspect value where it enters, as one string-level tag.
    TagSource,
    /// Tag the suspect value character by character, each tag carrying the
    /// character's index.
    TagSourceIndexed,
    /// Fetch the value's tag at the use site and print whether taint
    /// survived.
    CheckSink,
    /// Check each character of the value at the use site.
    CheckSinkIndexed,
}

/// Substitutions for one rendered block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetParams {
    /// The tainted variable at the insertion site.
    pub var: String,
    /// Name for the freshly declared tag local.
    pub tag_var: String,
    /// File name used in printed diagnostics, e.g. `BenchmarkTest00042.java`.
    pub display_file: String,
    /// Category label used in printed diagnostics, e.g. `SQL Injection`.
    pub label: String,
    /// Marker comment line; always the first rendered line.
    pub marker: String,
}

pub fn render(template: TemplateId, p: &SnippetParams) -> Vec<String> {
    let body = match template {
        TemplateId::TagSource => vec![
            format!("Tag {} = Tag.of(\"source: Tainted\");", p.tag_var),
            format!("{} = Tainter.setTag({}, {});", p.var, p.var, p.tag_var),
            format!(
                "System.out.println(\"\\u2705 [TAINT] Tag set at source {}! Tag = \" + {});",
                p.display_file, p.tag_var
            ),
        ],
        TemplateId::TagSourceIndexed => vec![
            format!("char[] chars = {}.toCharArray();", p.var),
            "char[] newChars = new char[chars.length];".to_string(),
            "for (int l = 0; l < chars.length; l++) {".to_string(),
            format!(
                "    newChars[l] = Tainter.setTag(chars[l], Tag.of(\"SOURCE: {} {} at index \" + l));",
                p.display_file, p.var
            ),
            "}".to_string(),
            format!(
                "{} = Tainter.setTag(new String(newChars), Tag.of(\"SOURCE: {}\"));",
                p.var, p.display_file
            ),
        ],
        TemplateId::CheckSink => vec![
            format!("Tag {} = Tainter.getTag({});", p.tag_var, p.var),
            format!("if ({} != null) {{", p.tag_var),
            format!(
                "    System.out.println(\"\\ud83d\\udd25 [TAINT] {} at {} carries tag: \" + {});",
                p.label, p.display_file, p.tag_var
            ),
            "} else {".to_string(),
            format!(
                "    System.out.println(\"\\u274c [TAINT] No taint detected at sink {}.\");",
                p.display_file
            ),
            "}".to_string(),
        ],
        TemplateId::CheckSinkIndexed => vec![
            format!("for (char c : {}.toCharArray()) {{", p.var),
            format!("    Tag {} = Tainter.getTag(c);", p.tag_var),
            format!("    if ({} != null) {{", p.tag_var),
            format!(
                "        System.out.println(\"\\ud83d\\udd25 [TAINT] {} at {} char '\" + c + \"' carries tag: \" + {});",
                p.label, p.display_file, p.tag_var
            ),
            "    }".to_string(),
            "}".to_string(),
        ],
    };

    let mut lines = Vec::with_capacity(body.len() + 3);
    lines.push(p.marker.clone());
    lines.push("{".to_string());
    for line in body {
        lines.push(format!("    {line}"));
    }
    lines.push("}".to_string());
    lines
}

/// Prefix every rendered line with `indent`. Kept separate from [render] so
/// tests can assert the unindented shape.
pub fn indent_block(lines: &[String], indent: &str) -> Vec<String> {
    lines
        .iter()
        .map(|l| {
            if l.is_empty() {
                l.clone()
            } else {
                format!("{indent}{l}")
            }
        })
        .collect()
}
