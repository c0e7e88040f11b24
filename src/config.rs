//! Configuration Module
//!
//! Cache construction options and the server configuration loaded from
//! environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Cache Config ==
/// Options recognised when constructing a [`RefreshingCache`](crate::cache::RefreshingCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Freshness window of an entry after a successful fetch
    pub ttl: Duration,
    /// Evict the entry when a refresh fails instead of serving it stale
    pub force_update: bool,
    /// Interval of the background reaper, None = no reaper
    pub clean_interval: Option<Duration>,
}

impl CacheConfig {
    /// Creates a config with the given TTL, serve-stale policy and no reaper.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            force_update: false,
            clean_interval: None,
        }
    }

    /// Set the failure policy.
    pub fn with_force_update(mut self, force_update: bool) -> Self {
        self.force_update = force_update;
        self
    }

    /// Enable the background reaper.
    pub fn with_clean_interval(mut self, interval: Duration) -> Self {
        self.clean_interval = Some(interval);
        self
    }

    /// Checks the invariants that must hold before a cache is built.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "ttl must be greater than zero".to_string(),
            ));
        }
        if matches!(self.clean_interval, Some(interval) if interval.is_zero()) {
            return Err(CacheError::InvalidConfiguration(
                "clean interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(30_000))
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL values are fetched from
    pub upstream_url: String,
    /// Timeout applied by the HTTP client to each upstream request
    pub upstream_timeout: Duration,
    /// Treat an upstream 404 as an empty value
    pub missing_as_empty: bool,
    /// Value served when the upstream has nothing for a key
    pub default_value: Option<String>,
    /// Cache options
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds (default: 30000)
    /// - `FORCE_UPDATE` - Evict on failed refresh (default: false)
    /// - `CLEAN_INTERVAL_MS` - Reaper interval in milliseconds (default: unset)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Origin base URL (default: http://127.0.0.1:8080)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream request timeout (default: 2000)
    /// - `MISSING_AS_EMPTY` - Cache upstream 404 as "" (default: false)
    /// - `DEFAULT_VALUE` - Fallback value for missing keys (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut cache = CacheConfig::new(
            parse_var::<u64>("CACHE_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.cache.ttl),
        )
        .with_force_update(parse_var("FORCE_UPDATE").unwrap_or(false));
        if let Some(ms) = parse_var::<u64>("CLEAN_INTERVAL_MS") {
            cache = cache.with_clean_interval(Duration::from_millis(ms));
        }

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            upstream_timeout: parse_var::<u64>("UPSTREAM_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.upstream_timeout),
            missing_as_empty: parse_var("MISSING_AS_EMPTY").unwrap_or(false),
            default_value: env::var("DEFAULT_VALUE").ok(),
            cache,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            upstream_url: "http://127.0.0.1:8080".to_string(),
            upstream_timeout: Duration::from_millis(2000),
            missing_as_empty: false,
            default_value: None,
            cache: CacheConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
