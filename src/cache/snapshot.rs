//! Snapshot types for warm restarts and bulk loading.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Point-in-time copy of the live cache contents.
///
/// Best-effort only: entries are re-inserted through the normal write path,
/// so capacity limits still apply on import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// When the snapshot was taken (Unix milliseconds)
    pub exported_at: u64,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub key: String,
    pub value: Value,
    /// Remaining lifetime at export time
    pub ttl_remaining_ms: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Entry supplied to `warm_up` before traffic begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupEntry {
    pub key: String,
    pub value: Value,
    /// TTL in milliseconds, default TTL when absent
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}
