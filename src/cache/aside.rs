//! Cache-aside helpers over the shared key-value cache.
//!
//! Readers try the cache first and fall back to the document store on a
//! miss, writing the loaded value back with a TTL. Writers to the source
//! collection call [`invalidate`] once their store write has succeeded.

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::SharedCache;
use crate::error::Result;

/// Cache key holding the serialized full post listing.
pub const POSTS_CACHE_KEY: &str = "posts";

/// Returns the cached value under `key`, or loads, caches and returns it.
///
/// An undecodable cached entry is treated as a miss. A failed cache write
/// is logged and does not fail the caller. The loaded value is returned
/// but not cached when `key` was invalidated while loading.
pub async fn get_or_load<T, F, Fut>(
    cache: &SharedCache,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    // Reads touch LRU and stats, so they need the write lock
    let (cached, generation) = {
        let mut guard = cache.write().await;
        (guard.get(key), guard.generation(key))
    };
    if let Some(json) = cached {
        match serde_json::from_str(&json) {
            Ok(value) => {
                debug!(key = %key, "cache hit");
                return Ok(value);
            }
            Err(e) => warn!(key = %key, error = %e, "dropping undecodable cache entry"),
        }
    }

    debug!(key = %key, "cache miss, loading from store");
    let value = load().await?;

    match serde_json::to_string(&value) {
        Ok(json) => {
            let written = cache.write().await.set_if_generation(
                key.to_string(),
                json,
                Some(ttl),
                generation,
            );
            match written {
                Ok(true) => {}
                Ok(false) => debug!(key = %key, "invalidated during load, not caching"),
                Err(e) => warn!(key = %key, error = %e, "failed to populate cache"),
            }
        }
        Err(e) => warn!(key = %key, error = %e, "failed to serialize for cache"),
    }

    Ok(value)
}

/// Drops `key` so the next reader reloads from the store.
pub async fn invalidate(cache: &SharedCache, key: &str) {
    if cache.write().await.invalidate(key) {
        debug!(key = %key, "cache invalidated");
    }
}
