//! Job Retention Task
//!
//! Drops finished job records once they are older than the retention window.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::jobs::JobScheduler;

/// Spawns a background task that forgets finished jobs older than `retention`.
///
/// Pending and running jobs are never touched.
pub fn spawn_job_retention_task(
    scheduler: JobScheduler,
    retention: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting job retention task: retention {:?}, interval {:?}",
            retention, interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = scheduler.cleanup_finished_jobs(retention).await;
            if removed > 0 {
                info!("Job retention: removed {} finished jobs", removed);
            } else {
                debug!("Job retention: nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{handler_fn, JobContext, JobOptions, JobStatus, SchedulerConfig, TickOutcome};
    use serde_json::json;

    #[tokio::test]
    async fn test_retention_task_drops_finished_jobs() {
        let scheduler = JobScheduler::new(SchedulerConfig::default());
        scheduler
            .register_handler("noop", handler_fn(|_ctx: JobContext| async { Ok::<(), anyhow::Error>(()) }))
            .await;

        let done = scheduler
            .schedule_job("noop", json!(null), JobOptions::default())
            .await
            .unwrap();
        assert_eq!(scheduler.tick().await, TickOutcome::Completed(done));
        let waiting = scheduler
            .schedule_job("noop", json!(null), JobOptions::default())
            .await
            .unwrap();

        let handle = spawn_job_retention_task(
            scheduler.clone(),
            Duration::ZERO,
            Duration::from_millis(50),
        );
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        assert!(scheduler.get_job_status(done).await.is_none());
        let pending = scheduler.get_job_status(waiting).await.unwrap();
        assert_eq!(pending.status, JobStatus::Pending);
    }
}
