//! Cache Store Module
//!
//! Key-value engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{BlogError, Result};

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
    /// Applied to entries written without an explicit TTL
    default_ttl: Option<Duration>,
    /// Per-key invalidation counters for cache-aside refills
    generations: HashMap<String, u64>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries`. A `None` default TTL
    /// means entries written without one never expire.
    pub fn new(max_entries: usize, default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl,
            generations: HashMap::new(),
        }
    }

    // == Set ==
    /// Stores a value, overwriting any previous one and resetting its TTL.
    ///
    /// Inserting a new key at capacity evicts the least recently used entry.
    pub fn set(&mut self, key: String, value: String, ttl: Option<Duration>) -> Result<()> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(BlogError::Cache(format!(
                "key must be 1..={} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(BlogError::Cache(format!(
                "value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(BlogError::Cache(
                        "cache is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        let entry = CacheEntry::new(value, ttl.or(self.default_ttl));
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);

        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key`. Expired entries are dropped and
    /// count as misses.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
        }
        self.stats.record_miss();
        None
    }

    // == Delete ==
    /// Removes `key`, returning whether anything was there.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            true
        } else {
            false
        }
    }

    // == Generations ==
    /// Current invalidation generation of `key`; zero until first invalidated.
    pub fn generation(&self, key: &str) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }

    /// Deletes `key` and bumps its generation, so refills loaded under the
    /// previous generation are refused.
    pub fn invalidate(&mut self, key: &str) -> bool {
        *self.generations.entry(key.to_string()).or_insert(0) += 1;
        self.delete(key)
    }

    /// Stores the value only if `key` is still at `generation`. Returns
    /// whether the value was written.
    pub fn set_if_generation(
        &mut self,
        key: String,
        value: String,
        ttl: Option<Duration>,
        generation: u64,
    ) -> Result<bool> {
        if self.generation(&key) != generation {
            return Ok(false);
        }
        self.set(key, value, ttl)?;
        Ok(true)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    // == Cleanup Expired ==
    /// Removes every expired entry, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const SHORT: Duration = Duration::from_millis(50);

    fn store(max_entries: usize) -> CacheStore {
        CacheStore::new(max_entries, Some(Duration::from_secs(300)))
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        store.set("posts".to_string(), "[]".to_string(), None).unwrap();

        assert_eq!(store.get("posts").as_deref(), Some("[]"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing() {
        let mut store = store(100);
        assert!(store.get("nonexistent").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), None).unwrap();
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let mut store = store(100);

        store.set("key1".to_string(), "old".to_string(), Some(SHORT)).unwrap();
        store.set("key1".to_string(), "new".to_string(), Some(Duration::from_secs(60))).unwrap();
        sleep(SHORT * 2);

        assert_eq!(store.get("key1").as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), Some(SHORT)).unwrap();
        assert!(store.get("key1").is_some());

        sleep(SHORT * 2);

        assert!(store.get("key1").is_none());
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_without_default_ttl_keeps_entries() {
        let mut store = CacheStore::new(10, None);
        store.set("k".to_string(), "v".to_string(), None).unwrap();
        assert_eq!(store.cleanup_expired(), 0);
        assert!(store.get("k").is_some());
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        store.set("key1".to_string(), "value1".to_string(), None).unwrap();
        store.set("key2".to_string(), "value2".to_string(), None).unwrap();
        store.set("key3".to_string(), "value3".to_string(), None).unwrap();

        // key1 becomes most recent, so key2 is evicted next
        store.get("key1");
        store.set("key4".to_string(), "value4".to_string(), None).unwrap();

        assert_eq!(store.len(), 3);
        assert!(store.get("key1").is_some());
        assert!(store.get("key2").is_none());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), None).unwrap();
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), Some(SHORT)).unwrap();
        store.set("key2".to_string(), "value2".to_string(), Some(Duration::from_secs(10))).unwrap();

        sleep(SHORT * 2);

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_store_rejects_bad_keys_and_values() {
        let mut store = store(100);

        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);
        assert!(matches!(
            store.set(long_key, "v".to_string(), None),
            Err(BlogError::Cache(_))
        ));
        assert!(matches!(
            store.set(String::new(), "v".to_string(), None),
            Err(BlogError::Cache(_))
        ));

        let large_value = "x".repeat(MAX_VALUE_SIZE + 1);
        assert!(matches!(
            store.set("key".to_string(), large_value, None),
            Err(BlogError::Cache(_))
        ));
    }

    #[test]
    fn test_stale_generation_refused() {
        let mut store = store(10);
        let loaded_at = store.generation("posts");

        assert!(!store.invalidate("posts"));
        assert_eq!(store.generation("posts"), loaded_at + 1);

        let written = store
            .set_if_generation("posts".to_string(), "[]".to_string(), None, loaded_at)
            .unwrap();
        assert!(!written);
        assert!(store.get("posts").is_none());

        let current = store.generation("posts");
        assert!(store
            .set_if_generation("posts".to_string(), "[1]".to_string(), None, current)
            .unwrap());
        assert_eq!(store.get("posts").as_deref(), Some("[1]"));
    }
}
