//! Cache Store Module
//!
//! Key to entry mapping shared by the refreshing cache and the reaper.
//! Callers guard it with a single `RwLock`; every operation here is O(1)
//! except the sweep.

use std::collections::HashMap;

use tokio::time::Instant;

use crate::cache::CacheEntry;

// == Cache Store ==
/// In-memory storage of fetched values keyed by fetcher key.
#[derive(Debug)]
pub struct CacheStore<T> {
    entries: HashMap<String, CacheEntry<T>>,
}

impl<T> CacheStore<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    // == Get Fresh ==
    /// Returns the value only if its entry is still fresh at `now`.
    pub fn get_fresh(&self, key: &str, now: Instant) -> Option<&T> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh_at(now))
            .map(|entry| &entry.value)
    }

    // == Get ==
    /// Returns the value regardless of freshness.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Insert ==
    /// Stores an entry, replacing any previous one for the key.
    ///
    /// Returns true if an entry was overwritten.
    pub fn insert(&mut self, key: String, entry: CacheEntry<T>) -> bool {
        self.entries.insert(key, entry).is_some()
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        self.entries.remove(key)
    }

    // == Cleanup Expired ==
    /// Removes all entries expired at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for CacheStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(value: &str, ttl_ms: u64) -> CacheEntry<String> {
        CacheEntry::new(value.to_string(), Duration::from_millis(ttl_ms))
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_insert_and_get() {
        let mut store = CacheStore::new();

        assert!(!store.insert("key1".to_string(), entry("value1", 60_000)));
        assert_eq!(store.get_fresh("key1", Instant::now()).unwrap(), "value1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store: CacheStore<String> = CacheStore::new();

        assert!(store.get("nonexistent").is_none());
        assert!(store.get_fresh("nonexistent", Instant::now()).is_none());
    }

    #[test]
    fn test_store_expired_entry_still_readable() {
        let mut store = CacheStore::new();
        let now = Instant::now();
        store.insert("key1".to_string(), CacheEntry::at("old".to_string(), now));

        let later = now + Duration::from_millis(5);
        assert!(store.get_fresh("key1", later).is_none());
        assert_eq!(store.get("key1").unwrap(), "old");
    }

    #[test]
    fn test_store_remove() {
        let mut store = CacheStore::new();

        store.insert("key1".to_string(), entry("value1", 60_000));
        assert!(store.remove("key1").is_some());
        assert!(store.is_empty());
        assert!(store.remove("key1").is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new();

        store.insert("key1".to_string(), entry("value1", 60_000));
        assert!(store.insert("key1".to_string(), entry("value2", 60_000)));

        assert_eq!(store.get("key1").unwrap(), "value2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = CacheStore::new();
        let now = Instant::now();

        store.insert(
            "key1".to_string(),
            CacheEntry::at("value1".to_string(), now + Duration::from_millis(10)),
        );
        store.insert(
            "key2".to_string(),
            CacheEntry::at("value2".to_string(), now + Duration::from_secs(10)),
        );

        let removed = store.cleanup_expired(now + Duration::from_millis(20));
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(!store.contains_key("key1"));
        assert!(store.contains_key("key2"));
    }
}
