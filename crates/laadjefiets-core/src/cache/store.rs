use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

/// Default time-to-live when a caller does not pick one.
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Value,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(data: Value, ttl: Duration) -> Self {
        Self {
            data,
            stored_at: Instant::now(),
            ttl,
        }
    }

    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.stored_at)
    }

    pub fn is_fresh(&self) -> bool {
        self.age() < self.ttl
    }
}

/// In-memory response cache with a per-entry TTL.
///
/// Expired entries are never purged, only ignored on read; the next `set` for
/// the same key overwrites them.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned map still holds valid JSON values.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, key: &str, data: Value, ttl: Duration) {
        debug!(key, ttl_ms = ttl.as_millis() as u64, "cache set");
        self.entries()
            .insert(key.to_string(), CacheEntry::new(data, ttl));
    }

    pub fn set_default(&self, key: &str, data: Value) {
        self.set(key, data, DEFAULT_TTL);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.is_fresh() => {
                debug!(key, "cache hit");
                Some(entry.data.clone())
            }
            Some(_) => {
                debug!(key, "cache stale");
                None
            }
            None => None,
        }
    }

    /// Age of a fresh entry. `None` when missing or expired.
    pub fn fresh_age(&self, key: &str) -> Option<Duration> {
        self.entries()
            .get(key)
            .filter(|entry| entry.is_fresh())
            .map(CacheEntry::age)
    }

    pub fn clear(&self, key: &str) {
        debug!(key, "cache clear");
        self.entries().remove(key);
    }

    pub fn clear_all(&self) {
        self.entries().clear();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
