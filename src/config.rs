//! Server configuration, built once at start-up and passed by reference.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::search::{DEFAULT_FUZZY_THRESHOLD, DEFAULT_MAX_MATCHES, SearchOptions};

/// Defaults applied when a search request leaves a flag unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchDefaults {
    pub context_lines: usize,
    pub max_matches: usize,
    pub fuzzy_threshold: f64,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            context_lines: 0,
            max_matches: DEFAULT_MAX_MATCHES,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl SearchDefaults {
    /// Base options for a request, before per-request flags are applied.
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            context_lines: self.context_lines,
            max_matches: self.max_matches,
            fuzzy_threshold: self.fuzzy_threshold,
            ..SearchOptions::default()
        }
    }
}

/// Configuration for the tool server.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Root directory; tool paths may not resolve outside it.
    pub workspace: PathBuf,
    pub search: SearchDefaults,
    /// Append audit events as JSON lines here; `None` logs them via tracing.
    pub audit_log: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            search: SearchDefaults::default(),
            audit_log: None,
        }
    }
}

impl ToolConfig {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            ..Self::default()
        }
    }

    /// Parse command-line flags (without the program name).
    ///
    /// Recognised: `--workspace <dir>`, `--audit-log <file>`,
    /// `--max-matches <n>`, `--context-lines <n>`, `--fuzzy-threshold <f>`.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            let value = args
                .next()
                .with_context(|| format!("missing value for {flag}"))?;
            match flag.as_str() {
                "--workspace" => config.workspace = PathBuf::from(value),
                "--audit-log" => config.audit_log = Some(PathBuf::from(value)),
                "--max-matches" => {
                    config.search.max_matches = value
                        .parse()
                        .with_context(|| format!("invalid --max-matches: {value}"))?;
                }
                "--context-lines" => {
                    config.search.context_lines = value
                        .parse()
                        .with_context(|| format!("invalid --context-lines: {value}"))?;
                }
                "--fuzzy-threshold" => {
                    config.search.fuzzy_threshold = value
                        .parse()
                        .with_context(|| format!("invalid --fuzzy-threshold: {value}"))?;
                }
                _ => bail!("unknown flag: {flag}"),
            }
        }

        config
            .search
            .options()
            .validate()
            .context("invalid search defaults")?;
        Ok(config)
    }
}
