//! Exact-substring replacement with a uniqueness guard.
//!
//! The whole file is read and every check runs against the full text before
//! anything is written:
//! 1. empty search text → [`ToolError::InvalidArgument`]
//! 2. missing file → [`ToolError::FileNotFound`]
//! 3. zero occurrences → [`ToolError::NoMatch`]
//! 4. more than one occurrence without `replace_all` →
//!    [`ToolError::AmbiguousMatch`]
//! 5. otherwise the new content is written in a single atomic write
//!
//! Occurrences are counted non-overlapping, left to right.

pub mod diff;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ToolError, ToolResult};
use crate::util::atomic::atomic_write;
use crate::util::fs::read_text;

/// One requested replacement as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementSpec {
    pub path: String,
    #[serde(alias = "oldText")]
    pub search_text: String,
    /// Empty means delete the search text.
    #[serde(default, alias = "newText")]
    pub replacement_text: String,
    #[serde(default)]
    pub replace_all: bool,
}

impl ReplacementSpec {
    pub fn substitution(&self) -> Substitution<'_> {
        Substitution {
            search: &self.search_text,
            replacement: &self.replacement_text,
            replace_all: self.replace_all,
        }
    }
}

/// Borrowed view of what to replace, independent of where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution<'a> {
    pub search: &'a str,
    pub replacement: &'a str,
    pub replace_all: bool,
}

/// Result of one replacement as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementOutcome {
    pub path: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences_replaced: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplacementOutcome {
    pub fn from_result(path: &str, result: ToolResult<Applied>) -> Self {
        match result {
            Ok(applied) => Self {
                path: path.to_owned(),
                success: true,
                occurrences_replaced: Some(applied.occurrences),
                error: None,
            },
            Err(e) => Self::failed(path, &e),
        }
    }

    pub fn failed(path: &str, err: &ToolError) -> Self {
        Self {
            path: path.to_owned(),
            success: false,
            occurrences_replaced: None,
            error: Some(err.to_string()),
        }
    }
}

/// Validated new content, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planned {
    pub content: String,
    pub occurrences: usize,
}

/// A replacement that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub occurrences: usize,
    pub before: String,
    pub after: String,
}

/// Count non-overlapping occurrences of `needle`, left to right.
pub fn count_occurrences(text: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    text.matches(needle).count()
}

/// Compute the new content for `text` without touching the filesystem.
///
/// `path` is only used in error messages.
pub fn plan_replacement(path: &Path, text: &str, sub: &Substitution<'_>) -> ToolResult<Planned> {
    if sub.search.is_empty() {
        return Err(ToolError::InvalidArgument(
            "search text must not be empty".to_owned(),
        ));
    }

    let occurrences = count_occurrences(text, sub.search);
    match occurrences {
        0 => Err(ToolError::NoMatch {
            path: path.to_path_buf(),
        }),
        n if n > 1 && !sub.replace_all => Err(ToolError::AmbiguousMatch {
            path: path.to_path_buf(),
            count: n,
        }),
        n => {
            let content = if sub.replace_all {
                text.replace(sub.search, sub.replacement)
            } else {
                text.replacen(sub.search, sub.replacement, 1)
            };
            Ok(Planned {
                content,
                occurrences: n,
            })
        }
    }
}

/// Read `path`, validate the substitution against its full content, and
/// write the result back atomically. Nothing is written on any error.
pub fn apply_replacement(path: &Path, sub: &Substitution<'_>) -> ToolResult<Applied> {
    if sub.search.is_empty() {
        return Err(ToolError::InvalidArgument(
            "search text must not be empty".to_owned(),
        ));
    }
    if !path.exists() {
        return Err(ToolError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let before = read_text(path)?;
    let planned = plan_replacement(path, &before, sub)?;
    atomic_write(path, &planned.content)?;

    debug!(
        path = %path.display(),
        occurrences = planned.occurrences,
        replace_all = sub.replace_all,
        "replacement written"
    );

    Ok(Applied {
        occurrences: planned.occurrences,
        before,
        after: planned.content,
    })
}
