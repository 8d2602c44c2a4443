//! Line-oriented text search: literal, regex and fuzzy.
//!
//! # Layers
//!
//! 1. [`distance`]: Levenshtein distance and similarity ratio
//! 2. [`fuzzy`]: sliding-window approximate matcher over a single line
//! 3. [`scanner`]: per-line scan of a whole file with context windows and a
//!    match cap, producing a [`SearchOutcome`]

pub mod distance;
pub mod fuzzy;
pub mod scanner;

use serde::Serialize;

use crate::error::{ToolError, ToolResult};

pub use fuzzy::DEFAULT_FUZZY_THRESHOLD;
pub use scanner::{scan_text, search_file};

/// Default cap on match records per file.
pub const DEFAULT_MAX_MATCHES: usize = 100;

/// A neighbouring line returned around a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextLine {
    pub line_number: usize,
    pub line_text: String,
}

/// One reported match. Exact/regex searches report one record per matching
/// line; fuzzy searches one record per accepted window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// 1-based.
    pub line_number: usize,
    pub line_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_substring: Option<String>,
    pub context_before: Vec<ContextLine>,
    pub context_after: Vec<ContextLine>,
}

/// Flags controlling a single search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Treat the pattern as a regex instead of a literal.
    pub is_regex: bool,
    /// Use the fuzzy window matcher instead of the regex engine.
    pub is_fuzzy: bool,
    pub case_sensitive: bool,
    /// Lines of context on each side of a match.
    pub context_lines: usize,
    pub max_matches: usize,
    /// Minimum similarity for a fuzzy window, in `[0, 1]`.
    pub fuzzy_threshold: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            is_regex: false,
            is_fuzzy: false,
            case_sensitive: true,
            context_lines: 0,
            max_matches: DEFAULT_MAX_MATCHES,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl SearchOptions {
    /// Reject option combinations the scanner cannot honour.
    pub fn validate(&self) -> ToolResult<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ToolError::InvalidArgument(format!(
                "fuzzyThreshold must be between 0 and 1, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.max_matches == 0 {
            return Err(ToolError::InvalidArgument(
                "maxMatches must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Result of scanning one text.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub total_lines: usize,
    pub matches: Vec<MatchRecord>,
    /// The match cap was hit before the whole text was examined.
    pub truncated: bool,
}

/// Per-file search result as returned to the caller.
///
/// Either `matches` (with `totalLines`, `matchCount`, `truncated`) or
/// `error` is populated, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub path: String,
    pub pattern: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutcome {
    pub fn from_result(path: &str, pattern: &str, result: ToolResult<ScanReport>) -> Self {
        match result {
            Ok(report) => Self {
                path: path.to_owned(),
                pattern: pattern.to_owned(),
                success: true,
                total_lines: Some(report.total_lines),
                match_count: Some(report.matches.len()),
                truncated: Some(report.truncated),
                matches: Some(report.matches),
                error: None,
            },
            Err(e) => Self::failed(path, pattern, &e),
        }
    }

    pub fn failed(path: &str, pattern: &str, err: &ToolError) -> Self {
        Self {
            path: path.to_owned(),
            pattern: pattern.to_owned(),
            success: false,
            total_lines: None,
            match_count: None,
            truncated: None,
            matches: None,
            error: Some(err.to_string()),
        }
    }
}
