//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::jobs::{DispatchPolicy, SchedulerConfig};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Maximum estimated size of all cache entries in bytes
    pub max_size_bytes: usize,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Job processor tick interval in milliseconds
    pub job_tick_interval_ms: u64,
    /// Backoff unit in milliseconds; retry `n` waits `n` units
    pub job_retry_backoff_ms: u64,
    /// Retries granted to jobs scheduled without an explicit limit
    pub job_max_retries: u32,
    /// Handler time limit in milliseconds, disabled when None
    pub job_timeout_ms: Option<u64>,
    /// How long finished jobs stay queryable, in seconds
    pub job_retention_secs: u64,
    pub job_dispatch_policy: DispatchPolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `MAX_SIZE_BYTES` - Maximum cache size in bytes (default: 50 MiB)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `JOB_TICK_INTERVAL_MS` - Processor cadence (default: 1000)
    /// - `JOB_RETRY_BACKOFF_MS` - Retry backoff unit (default: 1000)
    /// - `JOB_MAX_RETRIES` - Default retry budget (default: 3)
    /// - `JOB_TIMEOUT_MS` - Handler time limit (default: unset, no limit)
    /// - `JOB_RETENTION_SECS` - Finished job retention (default: 3600)
    /// - `JOB_DISPATCH_POLICY` - `head` or `first_ready` (default: head)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            max_size_bytes: env_or("MAX_SIZE_BYTES", defaults.max_size_bytes),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            job_tick_interval_ms: env_or("JOB_TICK_INTERVAL_MS", defaults.job_tick_interval_ms),
            job_retry_backoff_ms: env_or("JOB_RETRY_BACKOFF_MS", defaults.job_retry_backoff_ms),
            job_max_retries: env_or("JOB_MAX_RETRIES", defaults.job_max_retries),
            job_timeout_ms: env::var("JOB_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0),
            job_retention_secs: env_or("JOB_RETENTION_SECS", defaults.job_retention_secs),
            job_dispatch_policy: env::var("JOB_DISPATCH_POLICY")
                .ok()
                .and_then(|v| parse_dispatch_policy(&v))
                .unwrap_or(defaults.job_dispatch_policy),
        }
    }

    /// Cache limits derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.max_entries,
            max_size_bytes: self.max_size_bytes,
            default_ttl: Duration::from_secs(self.default_ttl),
            cleanup_interval: Duration::from_secs(self.cleanup_interval),
        }
    }

    /// Scheduler settings derived from this configuration.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_millis(self.job_tick_interval_ms),
            retry_backoff: Duration::from_millis(self.job_retry_backoff_ms),
            default_max_retries: self.job_max_retries,
            job_timeout: self.job_timeout_ms.map(Duration::from_millis),
            dispatch_policy: self.job_dispatch_policy,
        }
    }

    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_size_bytes: 50 * 1024 * 1024,
            default_ttl: 300,
            cleanup_interval: 60,
            server_port: 3000,
            job_tick_interval_ms: 1000,
            job_retry_backoff_ms: 1000,
            job_max_retries: 3,
            job_timeout_ms: None,
            job_retention_secs: 3600,
            job_dispatch_policy: DispatchPolicy::HeadOnly,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_dispatch_policy(value: &str) -> Option<DispatchPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "head" | "head_only" => Some(DispatchPolicy::HeadOnly),
        "first_ready" => Some(DispatchPolicy::FirstReady),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.job_timeout_ms, None);
        assert_eq!(config.job_dispatch_policy, DispatchPolicy::HeadOnly);
    }

    #[test]
    fn test_derived_configs() {
        let config = Config::default();

        let cache = config.cache_config();
        assert_eq!(cache.default_ttl, Duration::from_secs(300));
        assert_eq!(cache.max_size_bytes, 50 * 1024 * 1024);

        let scheduler = config.scheduler_config();
        assert_eq!(scheduler.tick_interval, Duration::from_secs(1));
        assert_eq!(scheduler.retry_backoff, Duration::from_secs(1));
        assert!(scheduler.job_timeout.is_none(), "Timeout is disabled by default");
        assert_eq!(config.job_retention(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_dispatch_policy() {
        assert_eq!(parse_dispatch_policy("head"), Some(DispatchPolicy::HeadOnly));
        assert_eq!(
            parse_dispatch_policy(" First_Ready "),
            Some(DispatchPolicy::FirstReady)
        );
        assert_eq!(parse_dispatch_policy("random"), None);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("CACHE_SCHEDULER_TEST_NUMBER", "not-a-number");
        assert_eq!(env_or("CACHE_SCHEDULER_TEST_NUMBER", 7u32), 7);
        env::set_var("CACHE_SCHEDULER_TEST_NUMBER", "12");
        assert_eq!(env_or("CACHE_SCHEDULER_TEST_NUMBER", 7u32), 12);
        env::remove_var("CACHE_SCHEDULER_TEST_NUMBER");
    }
}
