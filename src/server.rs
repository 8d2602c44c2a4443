//! MCP server: JSON-RPC 2.0 over newline-delimited stdio.
//!
//! One request per line in, one response per line out. Supported methods:
//! `initialize`, `notifications/initialized`, `tools/list`, `tools/call`,
//! `ping`. Notifications (requests without an `id`) never get a response.
//! The loop ends cleanly when the input reaches EOF.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::audit::{AuditSink, JsonlAuditSink, TracingAuditSink};
use crate::config::ToolConfig;
use crate::error::ToolResult;
use crate::tools::ToolRouter;

/// Maximum size of a single JSON-RPC line (10 MiB).
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

const PROTOCOL_VERSION: &str = "2025-06-18";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 types
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    fn success(id: Option<serde_json::Value>, result: &impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(v) => Self {
                jsonrpc: "2.0".to_owned(),
                id,
                result: Some(v),
                error: None,
            },
            Err(e) => {
                error!(error = %e, "failed to serialize success response");
                Self::failure(
                    id,
                    INTERNAL_ERROR,
                    format!("internal error: failed to serialize result: {e}"),
                )
            }
        }
    }

    fn failure(id: Option<serde_json::Value>, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_owned(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MCP protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ServerInfo {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolsCapability {
    list_changed: bool,
}

#[derive(Debug, Serialize)]
struct ServerCapabilities {
    tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitializeResult {
    protocol_version: &'static str,
    capabilities: ServerCapabilities,
    server_info: ServerInfo,
}

/// MCP tool definition for tools/list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolsListResult {
    tools: Vec<ToolDefinition>,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// MCP content item in tools/call response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// MCP tools/call result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Single text item.
    pub fn text(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            content: vec![ContentItem {
                content_type: "text".to_owned(),
                text: text.into(),
            }],
            is_error,
        }
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::text(format!("Error: {message}"), true)
    }

    /// Pretty-printed JSON body as a single text item.
    pub fn json(body: &impl Serialize, is_error: bool) -> ToolResult<Self> {
        Ok(Self::text(serde_json::to_string_pretty(body)?, is_error))
    }

    /// Concatenated text of all content items.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Server loop
// ---------------------------------------------------------------------------

/// Run the MCP server on stdin/stdout until stdin closes.
///
/// # Errors
///
/// Returns an error if the audit log cannot be opened or stdio fails.
pub fn run_mcp_server(config: ToolConfig) -> Result<()> {
    info!(
        workspace = %config.workspace.display(),
        audit_log = ?config.audit_log,
        "toolhost MCP server starting"
    );

    let sink: Arc<dyn AuditSink> = match &config.audit_log {
        Some(path) => {
            let jsonl = JsonlAuditSink::open(path)?;
            info!(path = %jsonl.path().display(), "audit log opened");
            Arc::new(jsonl)
        }
        None => Arc::new(TracingAuditSink),
    };
    let router = ToolRouter::new(config).with_audit_sink(sink);

    let stdin = std::io::stdin();
    let reader = std::io::BufReader::new(stdin.lock());
    let stdout = std::io::stdout().lock();
    serve(&router, reader, stdout)?;

    info!("toolhost MCP server stopped");
    Ok(())
}

/// Serve requests from `reader` and write responses to `writer` until EOF.
pub fn serve(router: &ToolRouter, mut reader: impl BufRead, mut writer: impl Write) -> Result<()> {
    let mut line_buf = String::new();

    loop {
        line_buf.clear();
        let bytes_read = match read_line_limited(&mut reader, &mut line_buf, MAX_LINE_BYTES) {
            Ok(n) => n,
            Err(LineError::TooLong) => {
                warn!(max = MAX_LINE_BYTES, "oversized request discarded");
                let resp = JsonRpcResponse::failure(
                    None,
                    INVALID_REQUEST,
                    format!("request exceeds maximum size ({MAX_LINE_BYTES} bytes)"),
                );
                write_response(&mut writer, &resp)?;
                continue;
            }
            Err(LineError::Io(e)) => return Err(e),
        };

        if bytes_read == 0 {
            info!("input closed, shutting down");
            return Ok(());
        }

        if let Some(resp) = handle_line(router, line_buf.trim()) {
            write_response(&mut writer, &resp)?;
        }
    }
}

/// Handle one raw request line; `None` means nothing should be written.
pub fn handle_line(router: &ToolRouter, line: &str) -> Option<JsonRpcResponse> {
    if line.is_empty() {
        return None;
    }
    debug!(raw = line, "received request");

    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "invalid JSON-RPC request");
            return Some(JsonRpcResponse::failure(
                None,
                PARSE_ERROR,
                format!("parse error: {e}"),
            ));
        }
    };

    if request.jsonrpc != "2.0" {
        warn!(version = %request.jsonrpc, "invalid JSON-RPC version");
        return Some(JsonRpcResponse::failure(
            request.id,
            INVALID_REQUEST,
            format!(
                "invalid request: jsonrpc version must be \"2.0\", got \"{}\"",
                request.jsonrpc
            ),
        ));
    }

    let response = dispatch(router, &request);
    if request.id.is_none() {
        debug!(method = %request.method, "notification handled");
        return None;
    }
    response
}

fn dispatch(router: &ToolRouter, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = req.id.clone();
    match req.method.as_str() {
        "initialize" => Some(JsonRpcResponse::success(id, &initialize_result())),
        "notifications/initialized" => {
            info!("client initialized");
            None
        }
        "tools/list" => Some(JsonRpcResponse::success(
            id,
            &ToolsListResult {
                tools: router.list_tools(),
            },
        )),
        "tools/call" => Some(handle_tools_call(router, id, &req.params)),
        "ping" => Some(JsonRpcResponse::success(id, &serde_json::json!({}))),
        other => {
            warn!(method = other, "unknown method");
            Some(JsonRpcResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            ))
        }
    }
}

const fn initialize_result() -> InitializeResult {
    InitializeResult {
        protocol_version: PROTOCOL_VERSION,
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: false,
            },
        },
        server_info: ServerInfo {
            name: "toolhost",
            version: env!("CARGO_PKG_VERSION"),
        },
    }
}

fn handle_tools_call(
    router: &ToolRouter,
    id: Option<serde_json::Value>,
    params: &serde_json::Value,
) -> JsonRpcResponse {
    match ToolCallParams::deserialize(params) {
        Ok(call) => JsonRpcResponse::success(id, &router.call_tool(&call.name, call.arguments)),
        Err(e) => JsonRpcResponse::failure(
            id,
            INVALID_PARAMS,
            format!("invalid tools/call params: {e}"),
        ),
    }
}

// ---------------------------------------------------------------------------
// Line I/O
// ---------------------------------------------------------------------------

fn write_response(out: &mut impl Write, resp: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(resp).context("failed to serialize response")?;
    debug!(response = %json, "sending response");
    out.write_all(json.as_bytes())
        .context("failed to write response")?;
    out.write_all(b"\n").context("failed to write newline")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

#[derive(Debug)]
enum LineError {
    /// The line was longer than the limit; it has been consumed and dropped.
    TooLong,
    Io(anyhow::Error),
}

/// Read one line into `buf`, returning the number of bytes consumed (0 at
/// EOF). Oversized lines are drained up to their newline and reported as
/// [`LineError::TooLong`] so the caller can keep serving.
fn read_line_limited(
    reader: &mut impl BufRead,
    buf: &mut String,
    max_bytes: usize,
) -> std::result::Result<usize, LineError> {
    let mut raw = Vec::new();
    let mut total = 0usize;
    let mut overflow = false;

    loop {
        let available = reader
            .fill_buf()
            .context("input fill_buf failed")
            .map_err(LineError::Io)?;
        if available.is_empty() {
            break;
        }
        let (take, done) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        total += take;
        if total > max_bytes {
            overflow = true;
        } else {
            raw.extend_from_slice(&available[..take]);
        }
        reader.consume(take);
        if done {
            break;
        }
    }

    if overflow {
        return Err(LineError::TooLong);
    }
    let text = std::str::from_utf8(&raw)
        .context("non-UTF-8 data on input")
        .map_err(LineError::Io)?;
    buf.push_str(text);
    Ok(total)
}

/// Reject a config that cannot serve requests.
pub fn check_workspace(config: &ToolConfig) -> Result<()> {
    if !config.workspace.is_dir() {
        bail!("workspace is not a directory: {}", config.workspace.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn router() -> ToolRouter {
        ToolRouter::new(ToolConfig::new(std::env::temp_dir()))
    }

    fn run(input: &str) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        serve(&router(), Cursor::new(input.as_bytes().to_vec()), &mut out).expect("serve");
        String::from_utf8(out)
            .expect("utf8")
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect()
    }

    #[test]
    fn test_initialize_and_ping() {
        let responses = run(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
        ));
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "toolhost");
        assert_eq!(responses[1]["id"], 2);
    }

    #[test]
    fn test_parse_error_and_bad_version() {
        let responses = run("not json\n{\"jsonrpc\":\"1.0\",\"id\":7,\"method\":\"ping\"}\n");
        assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(responses[1]["error"]["code"], INVALID_REQUEST);
        assert_eq!(responses[1]["id"], 7);
    }

    #[test]
    fn test_unknown_method_and_bad_params() {
        let responses = run(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"arguments":{}}}"#,
            "\n",
        ));
        assert_eq!(responses[0]["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(responses[1]["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let responses = run("\n   \n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}");
        assert_eq!(responses.len(), 1);
    }

    #[test]
    fn test_oversized_line_is_dropped_and_serving_continues() {
        let mut reader = Cursor::new(b"0123456789\nok\n".to_vec());
        let mut buf = String::new();
        let err = read_line_limited(&mut reader, &mut buf, 5).expect_err("too long");
        assert!(matches!(err, LineError::TooLong));
        let n = read_line_limited(&mut reader, &mut buf, 5).expect("next line");
        assert_eq!(n, 3);
        assert_eq!(buf, "ok\n");
    }

    #[test]
    fn test_check_workspace() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(check_workspace(&ToolConfig::new(dir.path().to_path_buf())).is_ok());
        assert!(check_workspace(&ToolConfig::new(dir.path().join("missing"))).is_err());
    }
}
