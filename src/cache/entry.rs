//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL, access
//! tracking, tags, and size accounting.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), always later than `created_at`
    pub expires_at: u64,
    /// Number of successful reads
    pub access_count: u64,
    /// Timestamp of the last write or successful read, drives LRU ordering
    pub last_accessed: u64,
    /// Labels for bulk invalidation
    pub tags: BTreeSet<String>,
    /// Estimated byte cost
    pub size: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `key` - The key the entry is stored under
    /// * `value` - The value to store
    /// * `now` - Current time in milliseconds
    /// * `ttl_ms` - Time to live in milliseconds; zero is treated as one
    /// * `tags` - Labels for bulk invalidation
    pub fn new<I, S>(key: String, value: Value, now: u64, ttl_ms: u64, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let size = estimate_size(&key, &value);
        Self {
            key,
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms.max(1)),
            access_count: 0,
            last_accessed: now,
            tags: tags.into_iter().map(Into::into).collect(),
            size,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is still live at exactly `expires_at` and expired strictly after it.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }

    // == Touch ==
    /// Records a successful read.
    pub fn touch(&mut self, now: u64) {
        self.last_accessed = now;
        self.access_count += 1;
    }

    // == Has Tag ==
    /// Returns true if the entry carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// == Utility Functions ==
/// Estimates the byte cost of an entry: key bytes plus compact JSON bytes.
pub fn estimate_size(key: &str, value: &Value) -> usize {
    key.len() + value.to_string().len()
}
