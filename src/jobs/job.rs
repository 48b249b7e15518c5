//! Job Module
//!
//! Job records, priorities, statuses, and scheduling options.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::clock::duration_ms;

/// Unique job identifier.
pub type JobId = Uuid;

// == Job Priority ==
/// Priority tier. Lower rank runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl JobPriority {
    /// Numeric rank: critical 0 through low 3.
    pub fn rank(&self) -> u8 {
        match self {
            JobPriority::Critical => 0,
            JobPriority::High => 1,
            JobPriority::Medium => 2,
            JobPriority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::Critical => "critical",
            JobPriority::High => "high",
            JobPriority::Medium => "medium",
            JobPriority::Low => "low",
        }
    }
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(JobPriority::Critical),
            "high" => Ok(JobPriority::High),
            "medium" => Ok(JobPriority::Medium),
            "low" => Ok(JobPriority::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

// == Job Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Completed, failed, and cancelled jobs never change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(format!("Unknown job status: {}", other)),
        }
    }
}

// == Job Options ==
/// Per-job scheduling options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOptions {
    pub priority: JobPriority,
    /// Delay before the job becomes ready
    pub delay: Duration,
    /// Retries allowed after the first attempt
    pub max_retries: u32,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            priority: JobPriority::Medium,
            delay: Duration::ZERO,
            max_retries: 3,
        }
    }
}

impl JobOptions {
    pub fn with_priority(mut self, priority: JobPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

// == Job ==
/// A unit of background work and its lifecycle state.
///
/// Timestamps are Unix milliseconds. `completed_at` is set when the job
/// reaches any terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(rename = "type")]
    pub job_type: String,
    pub priority: JobPriority,
    pub payload: Value,
    pub created_at: u64,
    /// Earliest time the job may run
    pub scheduled_at: u64,
    pub started_at: Option<u64>,
    pub completed_at: Option<u64>,
    pub status: JobStatus,
    pub retry_count: u32,
    pub max_retries: u32,
    pub error: Option<String>,
    /// Percent complete, 0 to 100
    pub progress: Option<u8>,
}

impl Job {
    pub fn new(job_type: impl Into<String>, payload: Value, options: &JobOptions, now: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: job_type.into(),
            priority: options.priority,
            payload,
            created_at: now,
            scheduled_at: now.saturating_add(duration_ms(options.delay)),
            started_at: None,
            completed_at: None,
            status: JobStatus::Pending,
            retry_count: 0,
            max_retries: options.max_retries,
            error: None,
            progress: None,
        }
    }

}
