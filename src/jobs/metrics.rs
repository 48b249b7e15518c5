//! Job Metrics Module
//!
//! Passive counters over the scheduler's lifetime.

use serde::Serialize;

use crate::jobs::JobId;

// == Job Metrics ==
/// Snapshot of scheduler performance for the health-check aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobMetrics {
    /// Jobs ever scheduled
    pub total_jobs: u64,
    pub completed_jobs: u64,
    pub failed_jobs: u64,
    pub cancelled_jobs: u64,
    /// Failed attempts that were put back in the queue
    pub retried_attempts: u64,
    /// Jobs currently waiting in the queue
    pub pending_jobs: usize,
    /// Job holding the execution slot, if any
    pub running_job: Option<JobId>,
    /// Mean duration of successful executions in milliseconds
    pub average_processing_time_ms: f64,
}

// == Metrics Recorder ==
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsRecorder {
    total_jobs: u64,
    completed_jobs: u64,
    failed_jobs: u64,
    cancelled_jobs: u64,
    retried_attempts: u64,
    total_processing_ms: u64,
}

impl MetricsRecorder {
    pub fn record_scheduled(&mut self) {
        self.total_jobs += 1;
    }

    pub fn record_completed(&mut self, duration_ms: u64) {
        self.completed_jobs += 1;
        self.total_processing_ms += duration_ms;
    }

    pub fn record_failed(&mut self) {
        self.failed_jobs += 1;
    }

    pub fn record_retry(&mut self) {
        self.retried_attempts += 1;
    }

    pub fn record_cancelled(&mut self) {
        self.cancelled_jobs += 1;
    }

    pub fn snapshot(&self, pending_jobs: usize, running_job: Option<JobId>) -> JobMetrics {
        let average_processing_time_ms = if self.completed_jobs == 0 {
            0.0
        } else {
            self.total_processing_ms as f64 / self.completed_jobs as f64
        };

        JobMetrics {
            total_jobs: self.total_jobs,
            completed_jobs: self.completed_jobs,
            failed_jobs: self.failed_jobs,
            cancelled_jobs: self.cancelled_jobs,
            retried_attempts: self.retried_attempts,
            pending_jobs,
            running_job,
            average_processing_time_ms,
        }
    }
}
