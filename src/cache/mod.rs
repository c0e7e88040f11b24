//! Cache Module
//!
//! Self-refreshing in-memory cache with TTL expiry, default fallback and
//! stale serving.

mod entry;
mod refreshing;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use refreshing::{Lookup, RefreshingCache};
pub use stats::{RefreshStats, StatsSnapshot};
pub use store::CacheStore;
