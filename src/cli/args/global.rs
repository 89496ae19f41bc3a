//! Global CLI options shared across all commands
//!
//! This module provides a centralized struct for global CLI options so that
//! handlers take one argument instead of every flag.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.rabbitop/config.yaml)
    pub config: Option<String>,

    /// Gateway URL override
    pub api_url: Option<String>,

    /// Bearer token override
    pub token: Option<String>,

    /// Cluster override (bypasses default_cluster)
    pub cluster: Option<String>,

    /// Never serve from the cache
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_url: cli.api_url.clone(),
            token: cli.token.clone(),
            cluster: cli.cluster.clone(),
            no_cache: cli.no_cache,
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn cluster_ref(&self) -> Option<&str> {
        self.cluster.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from([
            "rabbitop",
            "--format",
            "json",
            "--cluster",
            "prod",
            "--no-cache",
            "list",
            "queues",
        ]);
        let opts = GlobalOptions::from_cli(&cli);

        assert_eq!(opts.format, OutputFormat::Json);
        assert_eq!(opts.cluster_ref(), Some("prod"));
        assert!(opts.no_cache);
        assert_eq!(opts.config_ref(), None);
    }
}
