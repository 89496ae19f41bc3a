//! Command execution context
//!
//! The composition root for gateway commands: loads config, merges the
//! CLI overrides, then builds the gateway client and the cache registry that
//! every controller of the process shares.

use colored::Colorize;
use std::sync::Arc;

use crate::cache::{CacheRegistry, CachedResource};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::GatewayClient;
use crate::config::Config;
use crate::error::Result;
use crate::refresh::{ResourceController, SessionExpiredHook};

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    /// Loaded configuration with CLI overrides applied
    pub config: Config,
    /// Gateway fetcher shared by all controllers
    pub fetcher: Arc<GatewayClient>,
    /// Per-resource caches for this process
    pub registry: Arc<CacheRegistry>,
    /// Resolved cluster id
    pub cluster: String,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded, no token or cluster is
    /// available, or the gateway URL is invalid.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_or_default(opts.config_ref())?;

        if let Some(ref url) = opts.api_url {
            config.api_url = url.clone();
        }
        if let Some(ref token) = opts.token {
            config.token = Some(token.clone());
        }

        let token = config.validate_auth()?.to_string();
        let cluster = config.resolve_cluster(opts.cluster_ref())?;

        let fetcher = Arc::new(GatewayClient::new(
            &config.api_url,
            Some(token),
            config.request_timeout(),
        )?);

        // --no-cache keeps the cache in the pipeline with every TTL at zero
        let registry = if opts.no_cache {
            log::debug!("Cache disabled for this run");
            CacheRegistry::disabled()
        } else {
            CacheRegistry::new(config.cache.max_size, &config.cache.ttl_overrides())
        };

        log::debug!("Using gateway {} for cluster {}", fetcher.base_url(), cluster);

        Ok(Self {
            config,
            fetcher,
            registry: Arc::new(registry),
            cluster,
            format: opts.format,
        })
    }

    /// A controller for `R` bound to the shared fetcher and caches.
    pub fn controller<R: CachedResource>(&self) -> Arc<ResourceController<R, GatewayClient>> {
        Arc::new(
            ResourceController::new(self.fetcher.clone(), &self.registry)
                .with_session_expired(session_expired_hint()),
        )
    }

    pub fn page_size(&self) -> usize {
        self.config.preferences.page_size
    }
}

fn session_expired_hint() -> SessionExpiredHook {
    Arc::new(|_| {
        eprintln!(
            "{} Session expired. Run {} to sign in again.",
            "⚠".yellow(),
            "rabbitop init".cyan()
        );
    })
}
