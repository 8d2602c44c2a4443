//! Tool router: registers and dispatches MCP tool calls.
//!
//! Each tool module exposes `tool_definition()` and an `execute` function
//! taking decoded JSON arguments. The router owns the configuration and the
//! audit sink; every call is audited after its result is final.

pub mod read;
pub mod replace;
pub mod search;
pub mod write;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::audit::{AuditEvent, AuditSink, TracingAuditSink};
use crate::config::ToolConfig;
use crate::error::{ToolError, ToolResult};
use crate::server::{ToolCallResult, ToolDefinition};

/// Resolve and validate a file path, ensuring it stays within the workspace.
///
/// Rejects empty paths, null bytes, `..` traversal escapes, and symlinks that
/// resolve outside the workspace boundary. Paths that do not exist yet are
/// resolved through their deepest existing ancestor.
pub fn validate_path(workspace: &Path, file_path: &str) -> ToolResult<PathBuf> {
    if file_path.is_empty() {
        return Err(ToolError::InvalidArgument("path must not be empty".to_owned()));
    }
    if file_path.contains('\0') {
        return Err(ToolError::InvalidArgument("path contains null byte".to_owned()));
    }

    let raw_path = if Path::new(file_path).is_absolute() {
        PathBuf::from(file_path)
    } else {
        workspace.join(file_path)
    };

    let canonical_workspace = workspace
        .canonicalize()
        .unwrap_or_else(|_| workspace.to_path_buf());

    let resolved = resolve_through_ancestors(&raw_path)
        .ok_or_else(|| ToolError::PathOutsideWorkspace(file_path.to_owned()))?;

    if !resolved.starts_with(&canonical_workspace) {
        return Err(ToolError::PathOutsideWorkspace(file_path.to_owned()));
    }

    Ok(resolved)
}

/// Canonicalize `path`, or its deepest existing ancestor with the missing
/// components re-appended. Returns `None` when a missing component is `..`
/// (it cannot be resolved without the directory existing).
fn resolve_through_ancestors(path: &Path) -> Option<PathBuf> {
    if path.exists() {
        return path.canonicalize().ok();
    }

    let mut ancestor = path.to_path_buf();
    let mut missing = Vec::new();
    while !ancestor.exists() {
        let name = ancestor.file_name()?.to_os_string();
        let parent = ancestor.parent()?.to_path_buf();
        missing.push(name);
        ancestor = parent;
    }

    let mut resolved = ancestor.canonicalize().ok()?;
    for part in missing.iter().rev() {
        resolved.push(part);
    }
    Some(resolved)
}

/// Decode tool arguments, naming the tool in the error.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, arguments: serde_json::Value) -> ToolResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidArgument(format!("invalid {tool} parameters: {e}")))
}

/// Tool router that dispatches MCP tool calls to implementations.
pub struct ToolRouter {
    config: ToolConfig,
    audit: Arc<dyn AuditSink>,
}

impl ToolRouter {
    /// Create a router that audits through `tracing`.
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            audit: Arc::new(TracingAuditSink),
        }
    }

    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// List all available tools with their JSON Schema definitions.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        vec![
            search::search_in_file_definition(),
            search::batch_search_definition(),
            replace::str_replace_definition(),
            replace::batch_str_replace_definition(),
            read::tool_definition(),
            write::tool_definition(),
        ]
    }

    /// Call a tool by name. Failures are reported through
    /// [`ToolCallResult::is_error`], never as a Rust error.
    pub fn call_tool(&self, name: &str, arguments: serde_json::Value) -> ToolCallResult {
        debug!(tool = name, "dispatching tool call");
        let started = Instant::now();
        let input = arguments.clone();

        let outcome = match name {
            "search_in_file" => search::execute_single(&self.config, arguments),
            "batch_search_in_files" => search::execute_batch(&self.config, arguments),
            "str_replace" => replace::execute_single(&self.config, arguments),
            "batch_str_replace" => replace::execute_batch(&self.config, arguments),
            "read_file" => read::execute(&self.config, arguments),
            "write_file" => write::execute(&self.config, arguments),
            _ => Ok(ToolCallResult::text(format!("Unknown tool: {name}"), true)),
        };

        let result = outcome.unwrap_or_else(|e| {
            warn!(tool = name, error = %e, "tool call failed");
            ToolCallResult::error(e)
        });

        self.emit_audit(name, input, &result, started);
        result
    }

    fn emit_audit(&self, tool: &str, input: serde_json::Value, result: &ToolCallResult, started: Instant) {
        let text = result.joined_text();
        let (output, error) = if result.is_error {
            (None, Some(text))
        } else {
            (Some(text), None)
        };
        let event = AuditEvent {
            timestamp: Utc::now(),
            tool: tool.to_owned(),
            input,
            output,
            error,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        if let Err(e) = self.audit.record(&event) {
            warn!(tool, error = %e, "audit sink failed");
        }
    }
}
