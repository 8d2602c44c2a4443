//! Search tools: `search_in_file` and `batch_search_in_files`.
//!
//! Both resolve every path against the workspace, then hand the file to the
//! line scanner. Batch items run in parallel; a bad path or pattern in one
//! item only fails that item.

use serde::Deserialize;

use super::{parse_args, validate_path};
use crate::batch::{self, BatchResponse};
use crate::config::ToolConfig;
use crate::error::{ToolError, ToolResult};
use crate::search::{SearchOptions, SearchOutcome, search_file};
use crate::server::{ToolCallResult, ToolDefinition};

const fn default_true() -> bool {
    true
}

/// Parameters for `search_in_file`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInFileParams {
    pub path: String,
    pub pattern: String,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub context_lines: Option<usize>,
    #[serde(default)]
    pub max_matches: Option<usize>,
}

/// One `{path, pattern}` pair in a batch search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchTarget {
    pub path: String,
    pub pattern: String,
}

/// Parameters for `batch_search_in_files`. Flags apply to every item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSearchParams {
    pub searches: Vec<SearchTarget>,
    #[serde(default)]
    pub is_regex: bool,
    #[serde(default)]
    pub is_fuzzy: bool,
    #[serde(default)]
    pub fuzzy_threshold: Option<f64>,
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub context_lines: Option<usize>,
    #[serde(default)]
    pub max_matches_per_file: Option<usize>,
}

pub fn search_in_file_definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_in_file".to_owned(),
        description: "Search one file line by line for a literal string or regex. \
            Returns matching lines with line numbers and optional context lines."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File to search (relative to workspace or absolute)"
                },
                "pattern": {
                    "type": "string",
                    "description": "Text or regex to search for"
                },
                "isRegex": {
                    "type": "boolean",
                    "description": "Treat pattern as a regular expression (default: false)",
                    "default": false
                },
                "caseSensitive": {
                    "type": "boolean",
                    "description": "Case-sensitive matching (default: true)",
                    "default": true
                },
                "contextLines": {
                    "type": "integer",
                    "description": "Lines of context before and after each match (default: 0)",
                    "minimum": 0
                },
                "maxMatches": {
                    "type": "integer",
                    "description": "Maximum matches to return (default: 100)",
                    "minimum": 1
                }
            },
            "required": ["path", "pattern"]
        }),
    }
}

pub fn batch_search_definition() -> ToolDefinition {
    ToolDefinition {
        name: "batch_search_in_files".to_owned(),
        description: "Run several file searches in parallel. Supports literal, regex and \
            fuzzy (edit-distance) matching. Returns a summary and one result per search, \
            in request order."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "searches": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "path": { "type": "string" },
                            "pattern": { "type": "string" }
                        },
                        "required": ["path", "pattern"]
                    }
                },
                "isRegex": {
                    "type": "boolean",
                    "description": "Treat patterns as regular expressions (default: false)",
                    "default": false
                },
                "isFuzzy": {
                    "type": "boolean",
                    "description": "Approximate matching by similarity (default: false)",
                    "default": false
                },
                "fuzzyThreshold": {
                    "type": "number",
                    "description": "Minimum similarity for fuzzy matches, 0 to 1 (default: 0.7)",
                    "minimum": 0,
                    "maximum": 1
                },
                "caseSensitive": {
                    "type": "boolean",
                    "description": "Case-sensitive matching (default: true)",
                    "default": true
                },
                "contextLines": {
                    "type": "integer",
                    "description": "Lines of context before and after each match (default: 0)",
                    "minimum": 0
                },
                "maxMatchesPerFile": {
                    "type": "integer",
                    "description": "Maximum matches per file (default: 100)",
                    "minimum": 1
                }
            },
            "required": ["searches"]
        }),
    }
}

/// Execute `search_in_file`. `isError` mirrors the outcome's `success`.
pub fn execute_single(config: &ToolConfig, arguments: serde_json::Value) -> ToolResult<ToolCallResult> {
    let params: SearchInFileParams = parse_args("search_in_file", arguments)?;

    let defaults = config.search.options();
    let options = SearchOptions {
        is_regex: params.is_regex,
        case_sensitive: params.case_sensitive,
        context_lines: params.context_lines.unwrap_or(defaults.context_lines),
        max_matches: params.max_matches.unwrap_or(defaults.max_matches),
        ..defaults
    };

    let target = SearchTarget {
        path: params.path,
        pattern: params.pattern,
    };
    let outcome = search_one(config, &target, &options);
    ToolCallResult::json(&outcome, !outcome.success)
}

/// Execute `batch_search_in_files`. `isError` only when every item failed.
pub fn execute_batch(config: &ToolConfig, arguments: serde_json::Value) -> ToolResult<ToolCallResult> {
    let params: BatchSearchParams = parse_args("batch_search_in_files", arguments)?;
    if params.searches.is_empty() {
        return Err(ToolError::InvalidArgument(
            "searches must contain at least one item".to_owned(),
        ));
    }

    let defaults = config.search.options();
    let options = SearchOptions {
        is_regex: params.is_regex,
        is_fuzzy: params.is_fuzzy,
        case_sensitive: params.case_sensitive,
        context_lines: params.context_lines.unwrap_or(defaults.context_lines),
        max_matches: params.max_matches_per_file.unwrap_or(defaults.max_matches),
        fuzzy_threshold: params.fuzzy_threshold.unwrap_or(defaults.fuzzy_threshold),
    };
    // Shared flags are checked once so a bad threshold fails the call, not
    // every item.
    options.validate()?;

    let response: BatchResponse<SearchOutcome> =
        batch::run_parallel(&params.searches, |target| search_one(config, target, &options));
    ToolCallResult::json(&response, response.all_failed())
}

fn search_one(config: &ToolConfig, target: &SearchTarget, options: &SearchOptions) -> SearchOutcome {
    let result = validate_path(&config.workspace, &target.path)
        .and_then(|path| search_file(&path, &target.pattern, options));
    SearchOutcome::from_result(&target.path, &target.pattern, result)
}
