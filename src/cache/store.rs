//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, TTL
//! expiration, tag invalidation, and size accounting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::entry::estimate_size;
use crate::cache::{
    CacheConfig, CacheEntry, CacheHealth, CacheSnapshot, CacheStats, LruTracker, SnapshotEntry,
    WarmupEntry,
};
use crate::clock::{duration_ms, SharedClock, SystemClock};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
///
/// Expired entries are logically absent as soon as their TTL elapses. They are
/// physically dropped on the next read of their key or by [`cleanup_expired`],
/// whichever comes first.
///
/// [`cleanup_expired`]: CacheStore::cleanup_expired
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Capacity and TTL limits
    config: CacheConfig,
    /// Sum of all entry sizes
    total_size: usize,
    clock: SharedClock,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore reading wall-clock time.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore with an explicit time source.
    pub fn with_clock(config: CacheConfig, clock: SharedClock) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            config,
            total_size: 0,
            clock,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores an untagged value. See [`CacheStore::set_with_tags`].
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) -> bool {
        self.set_with_tags(key, value, ttl, std::iter::empty::<String>())
    }

    /// Stores a key-value pair with optional TTL and tags.
    ///
    /// An existing entry under the same key is replaced; that is not an
    /// eviction. Least recently used entries are evicted until the new entry
    /// fits. Returns false if the entry alone can never fit.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the configured default if None)
    /// * `tags` - Labels for [`CacheStore::clear_by_tag`]
    pub fn set_with_tags<I, S>(
        &mut self,
        key: impl Into<String>,
        value: Value,
        ttl: Option<Duration>,
        tags: I,
    ) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let size = estimate_size(&key, &value);

        if self.config.max_entries == 0 || size > self.config.max_size_bytes {
            warn!(
                "Rejected cache entry '{}': {} bytes exceeds limit of {} bytes",
                key, size, self.config.max_size_bytes
            );
            return false;
        }

        self.remove_entry(&key);
        self.ensure_capacity(size);

        let now = self.clock.now_ms();
        let ttl_ms = duration_ms(ttl.unwrap_or(self.config.default_ttl));
        let entry = CacheEntry::new(key.clone(), value, now, ttl_ms, tags);

        self.lru.touch(&key, entry.last_accessed, entry.created_at);
        self.total_size += entry.size;
        self.entries.insert(key, entry);
        self.stats.record_set();

        true
    }

    // == Ensure Capacity ==
    /// Evicts least recently used entries until one more entry of
    /// `incoming_size` bytes fits.
    fn ensure_capacity(&mut self, incoming_size: usize) {
        while self.entries.len() >= self.config.max_entries
            || self.total_size + incoming_size > self.config.max_size_bytes
        {
            let Some(evicted_key) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&evicted_key) {
                self.total_size -= entry.size;
                self.stats.record_eviction();
                debug!("Evicted cache entry '{}' ({} bytes)", evicted_key, entry.size);
            }
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None on a miss. Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch(now);
        let value = entry.value.clone();
        let created_at = entry.created_at;

        self.lru.touch(key, now, created_at);
        self.stats.record_hit();
        Some(value)
    }

    // == Delete ==
    /// Removes an entry by key. Returns false if there was nothing to remove.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        if removed {
            self.stats.record_deletes(1);
        }
        removed
    }

    // == Clear By Tag ==
    /// Removes every entry tagged `tag` and returns how many were removed.
    pub fn clear_by_tag(&mut self, tag: &str) -> usize {
        let tagged: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.has_tag(tag))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &tagged {
            self.remove_entry(key);
        }

        self.stats.record_deletes(tagged.len());
        if !tagged.is_empty() {
            info!("Invalidated {} cache entries tagged '{}'", tagged.len(), tag);
        }
        tagged.len()
    }

    // == Clear ==
    /// Removes every entry. Statistics counters are kept.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.total_size = 0;
        info!("Cleared {} cache entries", count);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired_keys.len());
        expired_keys.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_totals(self.entries.len(), self.total_size);
        stats
    }

    // == Health ==
    /// Evaluates cache health against the configured limits.
    pub fn health_status(&self) -> CacheHealth {
        CacheHealth::evaluate(&self.stats(), &self.config)
    }

    // == Export ==
    /// Copies all live entries, skipping expired ones.
    pub fn export(&self) -> CacheSnapshot {
        let now = self.clock.now_ms();
        let mut entries: Vec<SnapshotEntry> = self
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| SnapshotEntry {
                key: entry.key.clone(),
                value: entry.value.clone(),
                ttl_remaining_ms: entry.ttl_remaining_ms(now),
                tags: entry.tags.iter().cloned().collect(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheSnapshot {
            exported_at: now,
            entries,
        }
    }

    // == Import ==
    /// Loads a snapshot through the normal write path.
    ///
    /// Entries with no remaining lifetime are skipped. Returns the number stored.
    pub fn import(&mut self, snapshot: CacheSnapshot) -> usize {
        let mut imported = 0;
        for entry in snapshot.entries {
            if entry.ttl_remaining_ms == 0 {
                continue;
            }
            let ttl = Duration::from_millis(entry.ttl_remaining_ms);
            if self.set_with_tags(entry.key, entry.value, Some(ttl), entry.tags) {
                imported += 1;
            }
        }
        info!("Imported {} cache entries from snapshot", imported);
        imported
    }

    // == Warm Up ==
    /// Bulk-loads entries before traffic begins. Returns the number stored.
    pub fn warm_up(&mut self, entries: Vec<WarmupEntry>) -> usize {
        let mut loaded = 0;
        for entry in entries {
            let ttl = entry.ttl_ms.map(Duration::from_millis);
            if self.set_with_tags(entry.key, entry.value, ttl, entry.tags) {
                loaded += 1;
            }
        }
        info!("Cache warm-up loaded {} entries", loaded);
        loaded
    }

    // == Keys ==
    /// Returns the live (non-expired) keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now_ms();
        let mut keys: Vec<String> = self
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.key.clone())
            .collect();
        keys.sort();
        keys
    }

    // == Length ==
    /// Returns the number of physically stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the summed size of all stored entries in bytes.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.total_size -= entry.size;
        Some(entry)
    }
}
