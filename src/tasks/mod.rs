//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals
//! - Job Retention: Forgets finished jobs past the retention window
//!
//! The job processor loop itself is owned by [`crate::jobs::JobScheduler`].

mod cleanup;
mod retention;

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::cache::SharedCache;
use crate::config::Config;
use crate::jobs::JobScheduler;

pub use cleanup::spawn_cleanup_task;
pub use retention::spawn_job_retention_task;

/// Handles of the periodic maintenance tasks.
#[derive(Debug)]
pub struct BackgroundTasks {
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl BackgroundTasks {
    /// Starts the cache sweep and the job retention task.
    pub fn spawn(config: &Config, cache: SharedCache, scheduler: JobScheduler) -> Self {
        let sweep_interval = config.cache_config().cleanup_interval;
        let retention = config.job_retention();
        // Check a few times per window, but never more than once a minute
        let retention_interval = (retention / 4).max(Duration::from_secs(60));

        Self {
            handles: vec![
                ("ttl_cleanup", spawn_cleanup_task(cache, sweep_interval)),
                (
                    "job_retention",
                    spawn_job_retention_task(scheduler, retention, retention_interval),
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Aborts every task. Both only hold locks across a single sweep.
    pub fn stop(self) {
        for (name, handle) in self.handles {
            handle.abort();
            warn!("Background task {} aborted", name);
        }
    }
}
