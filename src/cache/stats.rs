//! Cache Statistics Module
//!
//! Tracks how reads were answered: hits, refreshes, fallbacks and stale serves.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Refresh Stats ==
/// Lock-free counters updated by the refreshing cache and its reaper.
#[derive(Debug, Default)]
pub struct RefreshStats {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    fetch_failures: AtomicU64,
    defaults_used: AtomicU64,
    stale_served: AtomicU64,
    invalidations: AtomicU64,
    reaped: AtomicU64,
}

impl RefreshStats {
    // == Constructor ==
    /// Creates a new RefreshStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read answered from a fresh entry.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Read that had to go to the fetcher.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Successful fetch written to the store.
    pub fn record_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_default_used(&self) {
        self.defaults_used.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_served(&self) {
        self.stale_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Entry deleted by a failed refresh under force-update.
    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// Entries removed by one reaper sweep.
    pub fn record_reaped(&self, count: usize) {
        self.reaped.fetch_add(count as u64, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            defaults_used: self.defaults_used.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            reaped: self.reaped.load(Ordering::Relaxed),
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of [`RefreshStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Reads answered from a fresh entry
    pub hits: u64,
    /// Reads that triggered a fetch
    pub misses: u64,
    /// Fetches (or defaults) that were stored
    pub refreshes: u64,
    /// Refreshes that ended in an error
    pub fetch_failures: u64,
    /// Times the default-value fallback was consulted
    pub defaults_used: u64,
    /// Reads answered with an outdated value
    pub stale_served: u64,
    /// Entries deleted by a failed refresh
    pub invalidations: u64,
    /// Entries removed by the reaper
    pub reaped: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
