//! Cache Health Module
//!
//! Turns statistics into a health verdict for the health-check aggregator.

use serde::Serialize;

use crate::cache::{CacheConfig, CacheStats};

/// Minimum number of lookups before the hit rate is judged.
pub const MIN_LOOKUPS_FOR_HIT_RATE: u64 = 100;
/// Hit rate below which the cache is flagged.
pub const LOW_HIT_RATE: f64 = 0.5;
/// Utilization ratio at which capacity is flagged.
pub const HIGH_UTILIZATION: f64 = 0.9;
/// Minimum number of writes before the eviction ratio is judged.
pub const MIN_SETS_FOR_EVICTION_RATE: u64 = 100;
/// Share of writes that may cause an eviction before the cache is flagged.
pub const HIGH_EVICTION_RATE: f64 = 0.1;

// == Cache Health ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheHealth {
    pub is_healthy: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl CacheHealth {
    // == Evaluate ==
    /// Derives a health report from current statistics and limits.
    pub fn evaluate(stats: &CacheStats, config: &CacheConfig) -> Self {
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        if stats.lookups() >= MIN_LOOKUPS_FOR_HIT_RATE && stats.hit_rate() < LOW_HIT_RATE {
            issues.push(format!(
                "Low hit rate: {:.1}%",
                stats.hit_rate() * 100.0
            ));
            recommendations
                .push("Review cache keys and TTLs; entries may expire before reuse".to_string());
        }

        let entry_usage = ratio(stats.total_entries, config.max_entries);
        if entry_usage >= HIGH_UTILIZATION {
            issues.push(format!(
                "Entry capacity at {:.1}% ({}/{})",
                entry_usage * 100.0,
                stats.total_entries,
                config.max_entries
            ));
            recommendations.push("Increase max_entries or shorten default TTL".to_string());
        }

        let size_usage = ratio(stats.total_size_bytes, config.max_size_bytes);
        if size_usage >= HIGH_UTILIZATION {
            issues.push(format!(
                "Memory usage at {:.1}% ({}/{} bytes)",
                size_usage * 100.0,
                stats.total_size_bytes,
                config.max_size_bytes
            ));
            recommendations.push("Increase max_size_bytes or cache smaller values".to_string());
        }

        if stats.sets >= MIN_SETS_FOR_EVICTION_RATE {
            let eviction_rate = stats.evictions as f64 / stats.sets as f64;
            if eviction_rate > HIGH_EVICTION_RATE {
                issues.push(format!(
                    "High eviction rate: {:.1}% of writes",
                    eviction_rate * 100.0
                ));
                recommendations
                    .push("Cache is undersized for the working set; raise capacity".to_string());
            }
        }

        Self {
            is_healthy: issues.is_empty(),
            issues,
            recommendations,
        }
    }
}

fn ratio(used: usize, limit: usize) -> f64 {
    if limit == 0 {
        1.0
    } else {
        used as f64 / limit as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> CacheConfig {
        CacheConfig::new(100, 10_000, Duration::from_secs(60))
    }

    #[test]
    fn test_fresh_cache_is_healthy() {
        let health = CacheHealth::evaluate(&CacheStats::new(), &config());
        assert!(health.is_healthy);
        assert!(health.issues.is_empty());
        assert!(health.recommendations.is_empty());
    }

    #[test]
    fn test_low_hit_rate_needs_enough_samples() {
        let mut stats = CacheStats::new();
        stats.misses = 10;
        assert!(CacheHealth::evaluate(&stats, &config()).is_healthy);

        stats.misses = 80;
        stats.hits = 20;
        let health = CacheHealth::evaluate(&stats, &config());
        assert!(!health.is_healthy);
        assert!(health.issues[0].contains("hit rate"));
        assert_eq!(health.recommendations.len(), 1);
    }

    #[test]
    fn test_capacity_pressure() {
        let mut stats = CacheStats::new();
        stats.set_totals(95, 9_500);

        let health = CacheHealth::evaluate(&stats, &config());
        assert!(!health.is_healthy);
        assert_eq!(health.issues.len(), 2);
    }

    #[test]
    fn test_eviction_rate() {
        let mut stats = CacheStats::new();
        stats.sets = 200;
        stats.evictions = 50;

        let health = CacheHealth::evaluate(&stats, &config());
        assert!(health.issues.iter().any(|i| i.contains("eviction")));
    }
}
