//! Error types for the toolhost crate.

use std::path::PathBuf;

/// Errors produced by the search and replace engines and the tool layer.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The regex (or escaped literal) failed to compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// An argument was outside its accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// File not found at the specified path.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File exists but could not be read as text.
    #[error("cannot read {path}: {reason}")]
    FileUnreadable { path: PathBuf, reason: String },

    /// The search text does not occur in the file.
    #[error("no match found for the search text in {path}")]
    NoMatch { path: PathBuf },

    /// The search text occurs more than once and `replaceAll` was not set.
    #[error(
        "ambiguous match: search text occurs {count} times in {path}; \
         add surrounding context to make it unique or set replaceAll"
    )]
    AmbiguousMatch { path: PathBuf, count: usize },

    /// Writing the new content failed; the original file is untouched.
    #[error("failed to write {path}: {reason}")]
    WriteFailure { path: PathBuf, reason: String },

    /// The requested path resolves outside the workspace.
    #[error("path escapes workspace boundary: {0}")]
    PathOutsideWorkspace(String),

    /// MCP protocol error.
    #[error("MCP protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for toolhost operations.
pub type ToolResult<T> = Result<T, ToolError>;
