//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{Lookup, StatsSnapshot};
use crate::tasks::ReaperState;

/// Response body for GET /values/:key
#[derive(Debug, Clone, Serialize)]
pub struct ValueResponse {
    /// The requested key
    pub key: String,
    /// The cached or freshly fetched value
    pub value: String,
    /// True when the refresh failed and an outdated value was served
    pub stale: bool,
    /// Why the refresh failed, only present for stale values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ValueResponse {
    /// Creates a ValueResponse from a cache lookup
    pub fn from_lookup(key: impl Into<String>, lookup: Lookup<String>) -> Self {
        let key = key.into();
        match lookup {
            Lookup::Fresh(value) => Self {
                key,
                value,
                stale: false,
                warning: None,
            },
            Lookup::Stale { value, cause } => Self {
                key,
                value,
                stale: true,
                warning: Some(cause.to_string()),
            },
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: StatsSnapshot,
    /// Current number of entries in cache, fresh or not
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a statistics snapshot
    pub fn new(counters: StatsSnapshot, total_entries: usize) -> Self {
        Self {
            hit_rate: counters.hit_rate(),
            counters,
            total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Lifecycle state of the background reaper
    pub reaper: ReaperState,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(reaper: ReaperState) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            reaper,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
