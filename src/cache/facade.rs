//! Cache Facade Module
//!
//! Semantic wrappers over the shared cache for the application's expensive
//! operations. Each category has its own tag and default TTL so a whole
//! category can be invalidated at once.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::cache::CacheStore;

// == Cache Category ==
/// Kind of expensive result being cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCategory {
    /// AI-derived results
    AiResult,
    /// Reference data such as normal value ranges
    ReferenceRanges,
    /// Long-running analyses
    Analysis,
}

impl CacheCategory {
    /// Tag attached to every entry of this category.
    pub fn tag(&self) -> &'static str {
        match self {
            CacheCategory::AiResult => "ai",
            CacheCategory::ReferenceRanges => "reference",
            CacheCategory::Analysis => "analysis",
        }
    }

    pub fn default_ttl(&self) -> Duration {
        match self {
            CacheCategory::AiResult => Duration::from_secs(60 * 60),
            CacheCategory::ReferenceRanges => Duration::from_secs(24 * 60 * 60),
            CacheCategory::Analysis => Duration::from_secs(30 * 60),
        }
    }

    // == Cache Key ==
    /// Builds a stable key from the input that produced a result.
    ///
    /// `serde_json` objects keep their keys sorted, so equal inputs always
    /// serialize, and therefore hash, identically. The digest is SHA-256, so
    /// keys in an exported snapshot stay valid across builds.
    pub fn key_for(&self, input: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!("{}:{}", self.tag(), &digest[..16])
    }
}

// == Cache Facade ==
#[derive(Debug, Clone)]
pub struct CacheFacade {
    cache: Arc<RwLock<CacheStore>>,
}

impl CacheFacade {
    pub fn new(cache: Arc<RwLock<CacheStore>>) -> Self {
        Self { cache }
    }

    /// Stores `result` for `input` under `category`.
    pub async fn put(&self, category: CacheCategory, input: &Value, result: Value) -> bool {
        let key = category.key_for(input);
        self.cache.write().await.set_with_tags(
            key,
            result,
            Some(category.default_ttl()),
            [category.tag()],
        )
    }

    /// Looks up the result previously stored for `input`.
    pub async fn fetch(&self, category: CacheCategory, input: &Value) -> Option<Value> {
        let key = category.key_for(input);
        self.cache.write().await.get(&key)
    }

    /// Drops every cached result of `category`.
    pub async fn invalidate(&self, category: CacheCategory) -> usize {
        self.cache.write().await.clear_by_tag(category.tag())
    }

    pub async fn cache_ai_result(&self, input: &Value, result: Value) -> bool {
        self.put(CacheCategory::AiResult, input, result).await
    }

    pub async fn get_ai_result(&self, input: &Value) -> Option<Value> {
        self.fetch(CacheCategory::AiResult, input).await
    }

    pub async fn cache_reference_ranges(&self, input: &Value, ranges: Value) -> bool {
        self.put(CacheCategory::ReferenceRanges, input, ranges).await
    }

    pub async fn get_reference_ranges(&self, input: &Value) -> Option<Value> {
        self.fetch(CacheCategory::ReferenceRanges, input).await
    }

    pub async fn cache_analysis(&self, input: &Value, analysis: Value) -> bool {
        self.put(CacheCategory::Analysis, input, analysis).await
    }

    pub async fn get_analysis(&self, input: &Value) -> Option<Value> {
        self.fetch(CacheCategory::Analysis, input).await
    }
}
