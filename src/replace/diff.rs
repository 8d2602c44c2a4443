//! Unified diff rendering for `str_replace` responses.

use similar::{Algorithm, TextDiff};

/// Render a unified diff between old and new content, with `context` lines
/// around each hunk.
///
/// Patience keeps hunks aligned to unique lines, which reads better for
/// source files.
pub fn unified_diff(file_name: &str, old: &str, new: &str, context: usize) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(old, new);

    diff.unified_diff()
        .context_radius(context)
        .header(&format!("a/{file_name}"), &format!("b/{file_name}"))
        .to_string()
}
