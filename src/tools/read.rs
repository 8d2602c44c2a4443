//! Read tool: numbered file contents with offset/limit and binary detection.

use std::io::Read as _;

use serde::Deserialize;

use super::{parse_args, validate_path};
use crate::config::ToolConfig;
use crate::error::{ToolError, ToolResult};
use crate::server::{ToolCallResult, ToolDefinition};
use crate::util::fs::read_text;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadParams {
    pub path: String,
    /// Starting line number (1-based).
    #[serde(default = "default_offset")]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

const fn default_offset() -> usize {
    1
}
const fn default_limit() -> usize {
    2000
}

/// Bytes sniffed for NUL before treating a file as binary.
const BINARY_CHECK_BYTES: u64 = 8192;

/// Longer lines are cut at a char boundary.
const MAX_LINE_LENGTH: usize = 2000;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "read_file".to_owned(),
        description: "Read a text file with line numbers. Supports offset and limit for \
            large files. Binary files are rejected."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File to read (relative to workspace or absolute)"
                },
                "offset": {
                    "type": "integer",
                    "description": "Starting line number (1-based, default: 1)",
                    "default": 1,
                    "minimum": 1
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of lines to return (default: 2000)",
                    "default": 2000,
                    "minimum": 1
                }
            },
            "required": ["path"]
        }),
    }
}

pub fn execute(config: &ToolConfig, arguments: serde_json::Value) -> ToolResult<ToolCallResult> {
    let params: ReadParams = parse_args("read_file", arguments)?;
    let file_path = validate_path(&config.workspace, &params.path)?;

    if looks_binary(&file_path)? {
        return Ok(ToolCallResult::error(format!(
            "binary file cannot be read as text: {}",
            params.path
        )));
    }

    let content = read_text(&file_path)?;
    let lines: Vec<&str> = content.lines().collect();
    let total_lines = lines.len();

    let start = params.offset.saturating_sub(1).min(total_lines);
    let end = start.saturating_add(params.limit).min(total_lines);
    let width = end.to_string().len();

    let mut output = String::new();
    for (i, line) in lines[start..end].iter().enumerate() {
        output.push_str(&format!("{:>width$}\t{}\n", start + i + 1, clip(line)));
    }

    if end < total_lines {
        output.push_str(&format!(
            "\n... ({} more lines, {total_lines} total)\n",
            total_lines - end
        ));
    }

    Ok(ToolCallResult::text(output, false))
}

fn looks_binary(path: &std::path::Path) -> ToolResult<bool> {
    let unreadable = |e: std::io::Error| match e.kind() {
        std::io::ErrorKind::NotFound => ToolError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ToolError::FileUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    };

    if !path.is_file() {
        // Let read_text produce the precise error.
        return Ok(false);
    }

    let file = std::fs::File::open(path).map_err(unreadable)?;
    let mut head = Vec::new();
    file.take(BINARY_CHECK_BYTES)
        .read_to_end(&mut head)
        .map_err(unreadable)?;
    Ok(head.contains(&0))
}

fn clip(line: &str) -> &str {
    if line.len() <= MAX_LINE_LENGTH {
        return line;
    }
    let mut end = MAX_LINE_LENGTH;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
