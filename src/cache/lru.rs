//! LRU Tracker Module
//!
//! Orders keys by last access for eviction.

use std::collections::{BTreeSet, HashMap};

/// Ordering key: oldest access first, then oldest creation, then oldest touch.
type Rank = (u64, u64, u64, String);

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are ranked by `(last_accessed, created_at, touch sequence)`. The
/// sequence number only matters when two entries share both timestamps,
/// in which case the one touched earlier is evicted first.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Keys ordered from least to most recently used
    order: BTreeSet<Rank>,
    /// Current rank of each tracked key
    ranks: HashMap<String, Rank>,
    /// Monotonic touch counter
    seq: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as used at `last_accessed`.
    pub fn touch(&mut self, key: &str, last_accessed: u64, created_at: u64) {
        self.remove(key);
        self.seq += 1;
        let rank = (last_accessed, created_at, self.seq, key.to_string());
        self.order.insert(rank.clone());
        self.ranks.insert(key.to_string(), rank);
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(rank) = self.ranks.remove(key) {
            self.order.remove(&rank);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, _, _, key) = self.order.pop_first()?;
        self.ranks.remove(&key);
        Some(key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
        self.ranks.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

#[cfg(test)]
impl LruTracker {
    /// Returns the least recently used key without removing it.
    fn peek_oldest(&self) -> Option<&str> {
        self.order.first().map(|(_, _, _, key)| key.as_str())
    }

    fn contains(&self, key: &str) -> bool {
        self.ranks.contains_key(key)
    }
}
