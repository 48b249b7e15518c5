//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU eviction, size
//! accounting, and tag-based invalidation.

mod config;
mod entry;
mod facade;
mod health;
mod lru;
mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use config::CacheConfig;
pub use entry::{estimate_size, CacheEntry};
pub use facade::{CacheCategory, CacheFacade};
pub use health::CacheHealth;
pub use lru::LruTracker;
pub use snapshot::{CacheSnapshot, SnapshotEntry, WarmupEntry};
pub use stats::CacheStats;
pub use store::CacheStore;

/// Cache store shared between the HTTP layer, job handlers, and background tasks.
pub type SharedCache = std::sync::Arc<tokio::sync::RwLock<CacheStore>>;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
