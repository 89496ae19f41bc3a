//! CLI command definitions and handlers

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod audit;
pub mod completions;
pub mod context;
pub mod handlers;
pub mod init;
pub mod list;
pub mod status;
pub mod watch;

pub use args::{
    AuditFilterArgs, BrokerResource, GlobalOptions, OutputFormat, PaginationArgs,
    ResourceFilterArgs,
};
pub use context::CommandContext;

/// RabbitOp CLI - terminal companion for the RabbitMQ admin console
#[derive(Parser, Debug)]
#[command(name = "rabbitop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "RABBITOP_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "RABBITOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Gateway base URL
    #[arg(long, global = true, env = "RABBITOP_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Bearer token for the gateway
    #[arg(long, global = true, env = "RABBITOP_TOKEN", hide_env = true)]
    pub token: Option<String>,

    /// Cluster to query (overrides default_cluster)
    #[arg(long, short = 'c', global = true, env = "RABBITOP_CLUSTER", hide_env = true)]
    pub cluster: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "RABBITOP_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass cache, fetch fresh data from the gateway
    #[arg(long, global = true, env = "RABBITOP_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize RabbitOp configuration
    Init,

    /// Show configuration and cache settings
    Status,

    /// Display version information
    Version,

    /// List broker resources of a cluster
    List(ListArgs),

    /// Follow a broker resource, refreshing in the background
    Watch(WatchArgs),

    /// View the console audit trail
    Audit(AuditArgs),

    /// Generate shell completions
    #[command(alias = "completions")]
    #[command(after_help = "\
Examples:
  bash:   rabbitop completion bash > /etc/bash_completion.d/rabbitop
  zsh:    rabbitop completion zsh > \"${fpath[1]}/_rabbitop\"
  fish:   rabbitop completion fish > ~/.config/fish/completions/rabbitop.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Resource type to list
    #[arg(value_enum)]
    pub resource: BrokerResource,

    #[command(flatten)]
    pub filter: ResourceFilterArgs,

    #[command(flatten)]
    pub pagination: PaginationArgs,

    /// Fetch every page, not just the requested one
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Resource type to follow
    #[arg(value_enum)]
    pub resource: BrokerResource,

    #[command(flatten)]
    pub filter: ResourceFilterArgs,

    #[command(flatten)]
    pub pagination: PaginationArgs,

    /// Background refresh period in seconds (overrides refresh.auto_refresh_secs)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Show cache statistics below the listing
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(flatten)]
    pub filter: AuditFilterArgs,

    #[command(flatten)]
    pub pagination: PaginationArgs,

    /// Fetch every page, not just the requested one
    #[arg(long)]
    pub all: bool,
}
