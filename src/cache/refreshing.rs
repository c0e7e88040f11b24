//! Refreshing Cache Module
//!
//! Get-or-refresh orchestration in front of a [`ValueFetcher`]: serve fresh
//! entries from the store, refresh expired ones, fall back to a default value
//! when the fetcher asks for it, and either serve stale or evict on failure.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStore, RefreshStats, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::fetcher::ValueFetcher;
use crate::tasks::{Reaper, ReaperState};

// == Lookup ==
/// Outcome of a successful [`RefreshingCache::get_value`].
#[derive(Debug)]
pub enum Lookup<T> {
    /// Value from a fresh entry or a fetch that just completed
    Fresh(T),
    /// Refresh failed and the last known value was served instead
    Stale {
        value: T,
        /// Why the refresh failed
        cause: CacheError,
    },
}

impl<T> Lookup<T> {
    pub fn value(&self) -> &T {
        match self {
            Lookup::Fresh(value) | Lookup::Stale { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Lookup::Fresh(value) | Lookup::Stale { value, .. } => value,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Lookup::Stale { .. })
    }

    /// The refresh error behind a stale value.
    pub fn stale_cause(&self) -> Option<&CacheError> {
        match self {
            Lookup::Fresh(_) => None,
            Lookup::Stale { cause, .. } => Some(cause),
        }
    }
}

// == Refreshing Cache ==
/// Self-refreshing cache of values produced by a fetcher.
///
/// The whole key space sits behind one `RwLock`. The fetch itself never runs
/// under the lock, so a slow fetch never blocks readers of other keys.
///
/// Concurrent callers on the same expired key each fetch independently and
/// the last fetch to complete wins the store write. Whether hot keys should
/// get single-flight de-duplication (fetchers with side effects or real cost
/// would benefit) is still undecided; duplicate fetches are accepted for now.
pub struct RefreshingCache<F: ValueFetcher> {
    fetcher: F,
    store: Arc<RwLock<CacheStore<F::Value>>>,
    config: CacheConfig,
    stats: Arc<RefreshStats>,
    reaper: Option<Reaper>,
}

impl<F: ValueFetcher> RefreshingCache<F> {
    // == Constructor ==
    /// Builds a cache, starting the reaper if a clean interval is configured.
    ///
    /// Fails with [`CacheError::InvalidConfiguration`] for a zero TTL, a zero
    /// clean interval, or a reaper requested outside a Tokio runtime.
    pub fn new(fetcher: F, config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(RwLock::new(CacheStore::new()));
        let stats = Arc::new(RefreshStats::new());
        let reaper = config
            .clean_interval
            .map(|interval| Reaper::spawn(store.clone(), interval, stats.clone()))
            .transpose()?;

        Ok(Self {
            fetcher,
            store,
            config,
            stats,
            reaper,
        })
    }

    // == Get Value ==
    /// Returns the value for `args`, refreshing it through the fetcher when
    /// missing or expired.
    ///
    /// At most one fetch is made per call and it is never retried. The cache
    /// sets no deadline; wrap the call in `tokio::time::timeout` or let the
    /// fetcher enforce one. Dropping the future mid-fetch leaves the store
    /// untouched.
    pub async fn get_value(&self, args: &F::Args) -> Result<Lookup<F::Value>> {
        let key = self.fetcher.key(args);

        {
            let store = self.store.read().await;
            if let Some(value) = store.get_fresh(&key, Instant::now()) {
                self.stats.record_hit();
                debug!("Cache hit: {}", key);
                return Ok(Lookup::Fresh(value.clone()));
            }
        }
        self.stats.record_miss();
        debug!("Cache miss: {}, refreshing", key);

        match self.fetch(&key, args).await {
            Ok(value) => {
                let entry = CacheEntry::new(value.clone(), self.config.ttl);
                self.store.write().await.insert(key, entry);
                self.stats.record_refresh();
                Ok(Lookup::Fresh(value))
            }
            Err(err) => {
                self.stats.record_fetch_failure();
                if self.config.force_update {
                    return Err(self.invalidate(&key, err).await);
                }
                self.serve_stale(&key, err).await
            }
        }
    }

    // == Fetch ==
    /// Calls the fetcher, substituting the default value on the use-default signal.
    async fn fetch(&self, key: &str, args: &F::Args) -> Result<F::Value> {
        match self.fetcher.fetch_value(args).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_use_default() => match self.fetcher.default_fetcher() {
                Some(fallback) => {
                    self.stats.record_default_used();
                    debug!("Using default value for {}", key);
                    Ok(fallback.default_value(args).await?)
                }
                None => Err(CacheError::DefaultUnimplemented(key.to_string())),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Force-update failure path: drop whatever is cached for the key.
    async fn invalidate(&self, key: &str, err: CacheError) -> CacheError {
        let removed = self.store.write().await.remove(key).is_some();
        if removed {
            self.stats.record_invalidation();
        }
        warn!("Refresh of {} failed, invalidated={}: {}", key, removed, err);
        err
    }

    /// Serve-stale failure path: re-read the store rather than trusting the
    /// snapshot taken before the fetch.
    async fn serve_stale(&self, key: &str, err: CacheError) -> Result<Lookup<F::Value>> {
        let store = self.store.read().await;
        match store.get(key) {
            Some(value) => {
                self.stats.record_stale_served();
                warn!("Refresh of {} failed, serving stale value: {}", key, err);
                Ok(Lookup::Stale {
                    value: value.clone(),
                    cause: err,
                })
            }
            None => {
                warn!("Refresh of {} failed with nothing cached: {}", key, err);
                Err(err)
            }
        }
    }

    // == Stop Cleaner ==
    /// Stops the background reaper. A no-op without a reaper or when already stopped.
    pub fn stop_cleaner(&self) {
        if let Some(reaper) = &self.reaper {
            reaper.stop();
        }
    }

    pub fn reaper_state(&self) -> ReaperState {
        self.reaper
            .as_ref()
            .map_or(ReaperState::NotStarted, Reaper::state)
    }

    // == Introspection ==
    /// Whether an entry exists for `key`, fresh or not. Never fetches.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.store.read().await.contains_key(key)
    }

    /// Number of entries currently stored, fresh or not.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}
