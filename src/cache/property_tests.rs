//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store and refresh invariants over generated
//! operation sequences.

use async_trait::async_trait;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStore, RefreshingCache};
use crate::config::CacheConfig;
use crate::error::FetchError;
use crate::fetcher::ValueFetcher;

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}"
}

#[derive(Debug, Clone)]
enum StoreOp {
    Insert { key: String, value: String, ttl_ms: u64 },
    Remove { key: String },
    Sweep { at_ms: u64 },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (key_strategy(), value_strategy(), 0u64..100)
            .prop_map(|(key, value, ttl_ms)| StoreOp::Insert { key, value, ttl_ms }),
        key_strategy().prop_map(|key| StoreOp::Remove { key }),
        (0u64..150).prop_map(|at_ms| StoreOp::Sweep { at_ms }),
    ]
}

/// Fetcher whose outcome for each call is decided by the test.
struct PlannedFetcher {
    calls: AtomicU64,
    failures: HashSet<u64>,
}

#[async_trait]
impl ValueFetcher for PlannedFetcher {
    type Args = str;
    type Value = u64;

    fn key(&self, args: &str) -> String {
        args.to_string()
    }

    async fn fetch_value(&self, _args: &str) -> Result<u64, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.contains(&n) {
            Err(FetchError::new("planned failure"))
        } else {
            Ok(n)
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The store behaves like a plain map under insert/remove, and a sweep
    // removes exactly the entries expired at the sweep instant.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(store_op_strategy(), 1..60)) {
        let base = Instant::now();
        let mut store = CacheStore::new();
        let mut model: HashMap<String, (String, Instant)> = HashMap::new();

        for op in ops {
            match op {
                StoreOp::Insert { key, value, ttl_ms } => {
                    let expires_at = base + Duration::from_millis(ttl_ms);
                    store.insert(key.clone(), CacheEntry::at(value.clone(), expires_at));
                    model.insert(key, (value, expires_at));
                }
                StoreOp::Remove { key } => {
                    prop_assert_eq!(store.remove(&key).is_some(), model.remove(&key).is_some());
                }
                StoreOp::Sweep { at_ms } => {
                    let now = base + Duration::from_millis(at_ms);
                    let before = model.len();
                    model.retain(|_, (_, expires_at)| *expires_at >= now);
                    prop_assert_eq!(store.cleanup_expired(now), before - model.len());
                }
            }
            prop_assert_eq!(store.len(), model.len(), "Length mismatch");
        }

        for (key, (value, _)) in &model {
            prop_assert_eq!(store.get(key), Some(value));
        }
    }

    // A sweep never removes an entry that is still fresh at the sweep instant.
    #[test]
    fn prop_sweep_keeps_fresh_entries(
        ttls in prop::collection::vec(0u64..100, 1..30),
        at_ms in 0u64..100
    ) {
        let base = Instant::now();
        let now = base + Duration::from_millis(at_ms);
        let mut store = CacheStore::new();
        for (i, ttl_ms) in ttls.iter().enumerate() {
            store.insert(i.to_string(), CacheEntry::at(i, base + Duration::from_millis(*ttl_ms)));
        }

        store.cleanup_expired(now);

        for (i, ttl_ms) in ttls.iter().enumerate() {
            let fresh = base + Duration::from_millis(*ttl_ms) > now;
            if fresh {
                prop_assert!(store.get_fresh(&i.to_string(), now).is_some());
            }
        }
    }

    // With a long TTL each key is fetched until the first success and then
    // served from the store; every call is counted as exactly one hit or miss.
    #[test]
    fn prop_statistics_accuracy(
        keys in prop::collection::vec(key_strategy(), 1..40),
        failures in prop::collection::hash_set(0u64..40, 0..10),
        force_update in any::<bool>()
    ) {
        let fetcher = PlannedFetcher { calls: AtomicU64::new(0), failures: failures.clone() };
        let config = CacheConfig::new(Duration::from_secs(3600)).with_force_update(force_update);
        let cache = RefreshingCache::new(fetcher, config).unwrap();

        let mut cached: HashSet<String> = HashSet::new();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;
        let mut fetch_no = 0u64;

        runtime().block_on(async {
            for key in &keys {
                let result = cache.get_value(key.as_str()).await;
                if cached.contains(key) {
                    expected_hits += 1;
                    assert!(!result.unwrap().is_stale());
                } else {
                    expected_misses += 1;
                    if failures.contains(&fetch_no) {
                        assert!(result.is_err());
                    } else {
                        assert_eq!(result.unwrap().into_value(), fetch_no);
                        cached.insert(key.clone());
                    }
                    fetch_no += 1;
                }
            }
        });

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.hits + stats.misses, keys.len() as u64);
        prop_assert_eq!(stats.stale_served, 0);
        prop_assert_eq!(stats.invalidations, 0);
        prop_assert_eq!(runtime().block_on(cache.len()), cached.len());
    }
}
