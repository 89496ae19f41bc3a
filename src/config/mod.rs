//! Configuration management for RabbitOp

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_MAX_SIZE;
use crate::client::gateway::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::client::{DEFAULT_PAGE_SIZE, ResourceType};
use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the admin console gateway
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Opaque bearer token issued by the gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Cluster used when `--cluster` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_cluster: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub refresh: RefreshSettings,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// Cache sizing and TTLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Entry cap per resource cache
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Period of the expired-entry sweep
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// TTL in seconds per resource type, replacing the built-in defaults
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ttl_overrides: BTreeMap<ResourceType, u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            cleanup_interval_secs: default_cleanup_interval(),
            ttl_overrides: BTreeMap::new(),
        }
    }
}

impl CacheSettings {
    pub fn ttl_overrides(&self) -> HashMap<ResourceType, Duration> {
        self.ttl_overrides
            .iter()
            .map(|(rt, secs)| (*rt, Duration::from_secs(*secs)))
            .collect()
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Timers used by `watch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshSettings {
    #[serde(default = "default_stale_time")]
    pub stale_time_secs: u64,

    #[serde(default = "default_stale_check_interval")]
    pub stale_check_interval_secs: u64,

    /// Background refresh period; 0 disables it
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh_secs: u64,

    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            stale_time_secs: default_stale_time(),
            stale_check_interval_secs: default_stale_check_interval(),
            auto_refresh_secs: default_auto_refresh(),
            stats_interval_secs: default_stats_interval(),
        }
    }
}

impl RefreshSettings {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn stale_check_interval(&self) -> Duration {
        Duration::from_secs(self.stale_check_interval_secs)
    }

    pub fn auto_refresh(&self) -> Option<Duration> {
        (self.auto_refresh_secs > 0).then(|| Duration::from_secs(self.auto_refresh_secs))
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Default page size for gateway requests
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_max_size() -> usize {
    DEFAULT_MAX_SIZE
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_stale_time() -> u64 {
    30
}

fn default_stale_check_interval() -> u64 {
    5
}

fn default_auto_refresh() -> u64 {
    15
}

fn default_stats_interval() -> u64 {
    5
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            default_cluster: None,
            request_timeout_secs: default_request_timeout(),
            cache: CacheSettings::default(),
            refresh: RefreshSettings::default(),
            preferences: Preferences::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".rabbitop").join("config.yaml"))
    }

    /// Resolve an explicit path or fall back to the default one
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Load from `path` (or the default), treating a missing file as defaults
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        match Self::load_from(&path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, contents)?;

        // Set file permissions to 600 on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Reject values that would make timers spin or caches unusable
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_size == 0 {
            return Err(ConfigError::Invalid("cache.max_size must be at least 1".into()).into());
        }
        if self.cache.cleanup_interval_secs == 0 {
            return Err(
                ConfigError::Invalid("cache.cleanup_interval_secs must be positive".into()).into(),
            );
        }
        if self.refresh.stale_check_interval_secs == 0 || self.refresh.stats_interval_secs == 0 {
            return Err(ConfigError::Invalid("refresh intervals must be positive".into()).into());
        }
        if self.preferences.page_size == 0 {
            return Err(
                ConfigError::Invalid("preferences.page_size must be at least 1".into()).into(),
            );
        }
        Ok(())
    }

    /// Validate that a token is present
    pub fn validate_auth(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingToken.into())
    }

    /// Pick the explicit cluster, else the configured default
    pub fn resolve_cluster(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .or(self.default_cluster.as_deref())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingCluster.into())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
