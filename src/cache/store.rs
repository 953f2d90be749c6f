//! TTL response cache.
//!
//! Entries expire lazily: a read that finds a stale entry drops it and
//! reports a miss. Capacity is bounded with LRU eviction.

use std::sync::{Arc, LockResult, RwLock};
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;
use serde_json::Value;
use tracing::warn;

use super::config::CacheConfig;
use super::keys::CacheKey;

pub(crate) const METRIC_CACHE_HIT: &str = "presswire_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "presswire_cache_miss_total";
pub(crate) const METRIC_CACHE_EVICT: &str = "presswire_cache_evict_total";

/// A decoded response body plus WordPress pagination headers.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub data: Value,
    /// `X-WP-Total`, 0 when absent.
    pub total_posts: u64,
    /// `X-WP-TotalPages`, 1 when absent.
    pub total_pages: u64,
    pub fetched_at: Instant,
}

impl CachedResponse {
    pub fn new(data: Value, total_posts: u64, total_pages: u64) -> Self {
        Self {
            data,
            total_posts,
            total_pages,
            fetched_at: Instant::now(),
        }
    }

    /// Age the entry from when its request was sent rather than when the
    /// body arrived.
    pub fn sent_at(mut self, at: Instant) -> Self {
        self.fetched_at = at;
        self
    }

    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<LruCache<CacheKey, Arc<CachedResponse>>>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl,
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    /// Fresh entry for `key`, if any. Stale entries are dropped.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CachedResponse>> {
        let mut entries = recover(self.entries.write(), "get");
        let lookup = entries
            .get(key)
            .map(|entry| (entry.is_fresh(self.ttl, Instant::now()), Arc::clone(entry)));
        let fresh = match lookup {
            Some((true, entry)) => Some(entry),
            Some((false, _)) => {
                entries.pop(key);
                None
            }
            None => None,
        };
        drop(entries);

        if fresh.is_some() {
            counter!(METRIC_CACHE_HIT).increment(1);
        } else {
            counter!(METRIC_CACHE_MISS).increment(1);
        }
        fresh
    }

    pub fn insert(&self, key: CacheKey, response: Arc<CachedResponse>) {
        let displaced = recover(self.entries.write(), "insert").push(key.clone(), response);
        if displaced.is_some_and(|(displaced_key, _)| displaced_key != key) {
            counter!(METRIC_CACHE_EVICT).increment(1);
        }
    }

    /// Remove every entry, or only those whose key contains `pattern`.
    /// Returns how many entries were dropped.
    pub fn clear(&self, pattern: Option<&str>) -> usize {
        let mut entries = recover(self.entries.write(), "clear");
        match pattern {
            None => {
                let removed = entries.len();
                entries.clear();
                removed
            }
            Some(pattern) => {
                let matching: Vec<CacheKey> = entries
                    .iter()
                    .filter(|(key, _)| key.contains(pattern))
                    .map(|(key, _)| key.clone())
                    .collect();
                for key in &matching {
                    entries.pop(key);
                }
                matching.len()
            }
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        recover(self.entries.read(), "contains").contains(key)
    }

    /// Number of stored entries, fresh or not yet evicted.
    pub fn len(&self) -> usize {
        recover(self.entries.read(), "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A panic while holding the lock leaves at worst a stale entry, so keep going.
fn recover<G>(result: LockResult<G>, op: &'static str) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            target = "presswire::cache",
            op,
            "Recovered from poisoned response cache lock"
        );
        poisoned.into_inner()
    })
}
