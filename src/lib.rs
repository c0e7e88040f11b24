//! Refresh Cache - A self-refreshing value cache
//!
//! Fronts an unreliable or expensive data source with TTL expiry, default
//! fallback, stale serving on failure and an optional background reaper.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Lookup, RefreshingCache};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, FetchError, FetchErrorKind};
pub use fetcher::{DefaultValueFetcher, HttpValueFetcher, ValueFetcher};
pub use tasks::ReaperState;
