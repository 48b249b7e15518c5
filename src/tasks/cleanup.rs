//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task sleeps for `interval` between runs and takes the write lock only
/// for the duration of a sweep. Lookups already drop expired entries lazily,
/// so the sweep only reclaims memory held by keys nobody reads.
///
/// # Example
/// ```ignore
/// let cache: SharedCache = Arc::new(RwLock::new(CacheStore::new(CacheConfig::default())));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, CacheStore};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn shared_cache() -> SharedCache {
        Arc::new(RwLock::new(CacheStore::new(CacheConfig::default())))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = shared_cache();
        cache
            .write()
            .await
            .set("expire_soon", json!("value"), Some(Duration::from_millis(50)));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;

        // The sweep removed it without any lookup touching the key
        let guard = cache.read().await;
        assert_eq!(guard.len(), 0, "Expired entry should have been cleaned up");
        assert_eq!(guard.stats().expirations, 1);
        assert_eq!(guard.stats().misses, 0);
        drop(guard);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = shared_cache();
        cache
            .write()
            .await
            .set("long_lived", json!("value"), Some(Duration::from_secs(3600)));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;

        let value = cache.write().await.get("long_lived");
        assert_eq!(value, Some(json!("value")), "Valid entry should not be removed");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(shared_cache(), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
