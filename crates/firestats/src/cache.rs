//! Expiring in-memory cache for territory series and reports.
//!
//! Uses `DashMap` so get/put are atomic per key without a global lock —
//! a concurrent `get` during a `put` for the same key observes either the
//! old or the new entry in full, never a mix.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use common::{CacheEntry, Mode, TerritoryKey};

/// Compound-keyed store with TTL-gated reads.
///
/// Expired entries are retained physically and tombstoned lazily: `get`
/// simply refuses to return them, and the next `put` for the key replaces
/// them wholesale.
pub struct ExpiringCache {
    entries: DashMap<TerritoryKey, CacheEntry>,
    ttl: Duration,
}

impl ExpiringCache {
    pub fn new(ttl_days: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Returns the entry only while `now - fetched_at < ttl`; an expired
    /// entry behaves as a miss.
    pub fn get(&self, key: &TerritoryKey) -> Option<CacheEntry> {
        let entry = self.entries.get(key)?;
        if Utc::now() - entry.fetched_at < self.ttl {
            Some(entry.clone())
        } else {
            debug!("cache entry for {} expired", key);
            None
        }
    }

    /// Replaces any existing entry for the key unconditionally.
    pub fn put(&self, entry: CacheEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    /// True when a live entry exists and its `mode` series is non-empty.
    /// Used to short-circuit recomputation.
    pub fn has_series(&self, key: &TerritoryKey, mode: Mode) -> bool {
        self.get(key).map(|e| e.has_series(mode)).unwrap_or(false)
    }

    /// Explicitly drop a key, expired or not.
    pub fn invalidate(&self, key: &TerritoryKey) {
        self.entries.remove(key);
    }

    /// Number of physically stored entries, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Thread-safe shared handle to the cache.
pub type SharedCache = Arc<ExpiringCache>;

/// Create a new empty shared cache.
pub fn new_cache(ttl_days: i64) -> SharedCache {
    Arc::new(ExpiringCache::new(ttl_days))
}
