//! Replace tools: `str_replace` and `batch_str_replace`.
//!
//! `str_replace` only ever replaces a unique occurrence. The batch variant
//! accepts `replaceAll` per item and runs items in request order.

use serde::{Deserialize, Serialize};

use super::{parse_args, validate_path};
use crate::batch::{self, BatchResponse};
use crate::config::ToolConfig;
use crate::error::{ToolError, ToolResult};
use crate::replace::{
    ReplacementOutcome, ReplacementSpec, Substitution, apply_replacement, diff::unified_diff,
};
use crate::server::{ToolCallResult, ToolDefinition};

/// Context radius of the diff shown after a successful `str_replace`.
const DIFF_CONTEXT_LINES: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrReplaceParams {
    pub path: String,
    pub old_text: String,
    /// Omitted means delete `old_text`.
    #[serde(default)]
    pub new_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStrReplaceParams {
    pub replacements: Vec<ReplacementSpec>,
    #[serde(default)]
    pub stop_on_error: bool,
}

/// Body of a `str_replace` response.
#[derive(Debug, Serialize)]
pub struct StrReplaceResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

pub fn str_replace_definition() -> ToolDefinition {
    ToolDefinition {
        name: "str_replace".to_owned(),
        description: "Replace a unique occurrence of oldText with newText in a file. \
            Fails without modifying the file if oldText is missing or occurs more than once; \
            include more surrounding text to make it unique."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File to edit (relative to workspace or absolute)"
                },
                "oldText": {
                    "type": "string",
                    "description": "Exact text to replace; must occur exactly once"
                },
                "newText": {
                    "type": "string",
                    "description": "Replacement text (default: empty, deletes oldText)",
                    "default": ""
                }
            },
            "required": ["path", "oldText"]
        }),
    }
}

pub fn batch_str_replace_definition() -> ToolDefinition {
    ToolDefinition {
        name: "batch_str_replace".to_owned(),
        description: "Apply several exact-text replacements one after another, in order. \
            Each item fails on its own if its text is missing or ambiguous; set stopOnError \
            to halt at the first failure."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "replacements": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "path": { "type": "string" },
                            "searchText": { "type": "string", "minLength": 1 },
                            "replacementText": { "type": "string", "default": "" },
                            "replaceAll": { "type": "boolean", "default": false }
                        },
                        "required": ["path", "searchText"]
                    }
                },
                "stopOnError": {
                    "type": "boolean",
                    "description": "Stop at the first failing item (default: false)",
                    "default": false
                }
            },
            "required": ["replacements"]
        }),
    }
}

/// Execute `str_replace`.
pub fn execute_single(config: &ToolConfig, arguments: serde_json::Value) -> ToolResult<ToolCallResult> {
    let params: StrReplaceParams = parse_args("str_replace", arguments)?;
    let sub = Substitution {
        search: &params.old_text,
        replacement: &params.new_text,
        replace_all: false,
    };

    let result = validate_path(&config.workspace, &params.path)
        .and_then(|path| apply_replacement(&path, &sub));

    let body = match result {
        Ok(applied) => StrReplaceResponse {
            success: true,
            message: format!("Replaced 1 occurrence in {}", params.path),
            diff: Some(unified_diff(
                &params.path,
                &applied.before,
                &applied.after,
                DIFF_CONTEXT_LINES,
            )),
        },
        Err(e) => StrReplaceResponse {
            success: false,
            message: e.to_string(),
            diff: None,
        },
    };
    ToolCallResult::json(&body, !body.success)
}

/// Execute `batch_str_replace`. `isError` whenever any item failed.
pub fn execute_batch(config: &ToolConfig, arguments: serde_json::Value) -> ToolResult<ToolCallResult> {
    let params: BatchStrReplaceParams = parse_args("batch_str_replace", arguments)?;
    if params.replacements.is_empty() {
        return Err(ToolError::InvalidArgument(
            "replacements must contain at least one item".to_owned(),
        ));
    }

    let response: BatchResponse<ReplacementOutcome> =
        batch::run_sequential(&params.replacements, params.stop_on_error, |spec| {
            let result = validate_path(&config.workspace, &spec.path)
                .and_then(|path| apply_replacement(&path, &spec.substitution()));
            ReplacementOutcome::from_result(&spec.path, result)
        });
    ToolCallResult::json(&response, response.any_failed())
}
