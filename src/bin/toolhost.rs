//! toolhost -- standalone MCP tool server.
//!
//! Usage: toolhost [--workspace <path>] [--audit-log <file>]
//!                 [--max-matches <n>] [--context-lines <n>] [--fuzzy-threshold <f>]

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = toolhost::ToolConfig::from_args(std::env::args().skip(1))?;
    toolhost::server::check_workspace(&config)?;
    config.workspace = config.workspace.canonicalize()?;

    toolhost::run_mcp_server(config)
}
