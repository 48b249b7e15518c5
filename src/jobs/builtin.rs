//! Built-in job handlers that operate on the shared cache.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::cache::{SharedCache, WarmupEntry};
use crate::jobs::{JobContext, JobHandler, JobScheduler};

/// Job type of [`CacheWarmupHandler`].
pub const CACHE_WARMUP_JOB: &str = "cache_warmup";
/// Job type of [`CacheCleanupHandler`].
pub const CACHE_CLEANUP_JOB: &str = "cache_cleanup";

#[derive(Debug, Deserialize)]
struct WarmupPayload {
    entries: Vec<WarmupEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct CleanupPayload {
    #[serde(default)]
    tag: Option<String>,
}

// == Cache Warmup ==
/// Loads `{"entries": [...]}` into the cache.
pub struct CacheWarmupHandler {
    cache: SharedCache,
}

impl CacheWarmupHandler {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl JobHandler for CacheWarmupHandler {
    async fn handle(&self, ctx: JobContext) -> anyhow::Result<()> {
        let payload: WarmupPayload = serde_json::from_value(ctx.payload.clone())
            .context("Invalid cache warm-up payload")?;
        let requested = payload.entries.len();

        let loaded = self.cache.write().await.warm_up(payload.entries);
        ctx.set_progress(100);

        info!("Warm-up job {} loaded {}/{} entries", ctx.id, loaded, requested);
        Ok(())
    }
}

// == Cache Cleanup ==
/// Drops entries tagged `{"tag": ...}`, or sweeps expired entries when no
/// tag is given.
pub struct CacheCleanupHandler {
    cache: SharedCache,
}

impl CacheCleanupHandler {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl JobHandler for CacheCleanupHandler {
    async fn handle(&self, ctx: JobContext) -> anyhow::Result<()> {
        let payload: CleanupPayload = if ctx.payload.is_null() {
            CleanupPayload::default()
        } else {
            serde_json::from_value(ctx.payload.clone()).context("Invalid cache cleanup payload")?
        };

        let mut cache = self.cache.write().await;
        let removed = match payload.tag.as_deref() {
            Some(tag) => cache.clear_by_tag(tag),
            None => cache.cleanup_expired(),
        };

        info!("Cleanup job {} removed {} entries", ctx.id, removed);
        Ok(())
    }
}

/// Registers the built-in cache handlers on `scheduler`.
pub async fn register_cache_handlers(scheduler: &JobScheduler, cache: &SharedCache) {
    scheduler
        .register_handler(CACHE_WARMUP_JOB, CacheWarmupHandler::new(cache.clone()))
        .await;
    scheduler
        .register_handler(CACHE_CLEANUP_JOB, CacheCleanupHandler::new(cache.clone()))
        .await;
}
