//! Response DTOs for the cache and job API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheHealth, CacheStats};
use crate::jobs::{JobId, JobMetrics};

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /cache
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for bulk removals (DELETE /cache, DELETE /cache/tags/:tag)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// Response body for POST /cache/import
#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub cache: CacheHealth,
    pub jobs: JobMetrics,
}

impl HealthResponse {
    /// Aggregates cache health and job metrics with the current timestamp.
    pub fn new(cache: CacheHealth, jobs: JobMetrics) -> Self {
        let status = if cache.is_healthy { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache,
            jobs,
        }
    }
}

/// Response body for job submissions (POST /jobs, POST /cache/warmup)
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleJobResponse {
    pub id: JobId,
    pub message: String,
}

impl ScheduleJobResponse {
    pub fn new(id: JobId, job_type: &str) -> Self {
        Self {
            id,
            message: format!("Job '{}' scheduled", job_type),
        }
    }
}

/// Response body for DELETE /jobs/:id
#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub id: JobId,
    pub message: String,
}

impl CancelResponse {
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            message: format!("Job {} cancelled", id),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
