//! Request DTOs for the cache and job API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{WarmupEntry, MAX_KEY_LENGTH};
use crate::jobs::{JobOptions, JobPriority, JobStatus};

/// Request body for storing a value (PUT /cache)
///
/// `ttl` is in seconds, `ttl_ms` in milliseconds; `ttl_ms` wins when both are
/// present. With neither, the cache's default TTL applies.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if self.tags.iter().any(|tag| tag.is_empty()) {
            return Some("Tags cannot be empty".to_string());
        }
        None
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms
            .map(Duration::from_millis)
            .or_else(|| self.ttl.map(Duration::from_secs))
    }
}

/// Request body for POST /cache/warmup, also the `cache_warmup` job payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupRequest {
    pub entries: Vec<WarmupEntry>,
}

/// Request body for POST /jobs
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleJobRequest {
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub priority: Option<JobPriority>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl ScheduleJobRequest {
    /// Fills unset fields from `defaults`.
    pub fn options(&self, defaults: JobOptions) -> JobOptions {
        let mut options = defaults;
        if let Some(priority) = self.priority {
            options = options.with_priority(priority);
        }
        if let Some(delay) = self.delay_ms {
            options = options.with_delay(Duration::from_millis(delay));
        }
        if let Some(retries) = self.max_retries {
            options = options.with_max_retries(retries);
        }
        options
    }
}

/// Query string of GET /jobs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    #[serde(default)]
    pub status: Option<JobStatus>,
}
