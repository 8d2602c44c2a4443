//! `toolhost`, an MCP tool server for line search and safe string replacement.
//!
//! Exposes file search and edit tools to an agent over the Model Context
//! Protocol (stdio, JSON-RPC 2.0, newline-delimited).
//!
//! # Tools
//!
//! - `search_in_file`: literal/regex line search with context lines
//! - `batch_search_in_files`: parallel literal/regex/fuzzy search over many files
//! - `str_replace`: replace a unique occurrence, with a unified diff
//! - `batch_str_replace`: ordered replacements with optional stop-on-error
//! - `read_file` / `write_file`: whole-file access inside the workspace
//!
//! # Architecture
//!
//! ```text
//! stdin (JSON-RPC) → server → ToolRouter → tools::* → search / replace engines
//!                                  ↓                        ↓
//!                             AuditSink                  batch (rayon)
//! stdout (JSON-RPC) ←──────────────┘
//! ```

pub mod audit;
pub mod batch;
pub mod config;
pub mod error;
pub mod replace;
pub mod search;
pub mod server;
pub mod tools;
pub mod util;

pub use config::ToolConfig;
pub use error::{ToolError, ToolResult};
pub use server::run_mcp_server;
