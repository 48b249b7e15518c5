//! Configuration for the cache store

use std::time::Duration;

/// Capacity and expiry parameters of a [`CacheStore`](super::CacheStore).
///
/// At any quiescent point the store holds at most `max_entries` entries whose
/// sizes sum to at most `max_size_bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Maximum total estimated size in bytes
    pub max_size_bytes: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Period of the background expiry sweep
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    pub fn new(max_entries: usize, max_size_bytes: usize, default_ttl: Duration) -> Self {
        Self {
            max_entries,
            max_size_bytes,
            default_ttl,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_size_bytes: 50 * 1024 * 1024,
            default_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}
