//! Write tool: whole-file create/overwrite with parent directory creation.

use serde::Deserialize;

use super::{parse_args, validate_path};
use crate::config::ToolConfig;
use crate::error::ToolResult;
use crate::server::{ToolCallResult, ToolDefinition};
use crate::util::atomic::atomic_write;

#[derive(Debug, Deserialize)]
pub struct WriteParams {
    pub path: String,
    pub content: String,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "write_file".to_owned(),
        description: "Write content to a file, replacing it entirely. Creates the file and \
            any missing parent directories."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File to write (relative to workspace or absolute)"
                },
                "content": {
                    "type": "string",
                    "description": "Full file content"
                }
            },
            "required": ["path", "content"]
        }),
    }
}

pub fn execute(config: &ToolConfig, arguments: serde_json::Value) -> ToolResult<ToolCallResult> {
    let params: WriteParams = parse_args("write_file", arguments)?;
    let file_path = validate_path(&config.workspace, &params.path)?;

    let existed = file_path.exists();
    atomic_write(&file_path, &params.content)?;

    let action = if existed { "Updated" } else { "Created" };
    let line_count = params.content.lines().count();

    Ok(ToolCallResult::text(
        format!("{action} {}: {line_count} lines written", params.path),
        false,
    ))
}
