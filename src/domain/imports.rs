//! Import ensuring: guarantee a fixed set of declarations exists once,
//! directly after the package declaration.

use crate::domain::document::SourceDocument;

/// Insert whichever of `required` are missing, as one contiguous block after
/// the `package` line (or at the top of the file when there is none).
/// Declarations already present anywhere are never duplicated, and the
/// relative order of `required` is preserved. Returns true if the document
/// changed.
pub fn ensure_imports(doc: &mut SourceDocument, required: &[String]) -> bool {
    let missing: Vec<String> = required
        .iter()
        .filter(|decl| !doc.contains(decl.as_str()))
        .cloned()
        .collect();
    if missing.is_empty() {
        return false;
    }

    let at = match doc.package_line() {
        Some(pkg) => pkg + 1,
        None => 0,
    };
    doc.insert_block(at, &missing);
    true
}
