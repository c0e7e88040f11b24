//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

/// Roughly 30 years; stands in for "never" when `now + ttl` overflows.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

// == Cache Entry ==
/// A fetched value together with the instant it stops being fresh.
///
/// Entries are replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The fetched value
    pub value: T,
    /// Instant after which the value is no longer served as fresh
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry for a fetch that completed just now.
    ///
    /// A ttl too large to represent saturates to a far-future expiry.
    pub fn new(value: T, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self::at(value, expires_at)
    }

    /// Creates an entry with an explicit expiry instant.
    pub fn at(value: T, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    // == Freshness ==
    /// Fresh while the expiry instant lies strictly in the future.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        self.expires_at > now
    }

    /// Expired once the expiry instant lies strictly in the past.
    ///
    /// At exactly `expires_at` an entry is neither fresh nor reapable.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at < now
    }
}
