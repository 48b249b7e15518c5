//! Jobs Module
//!
//! Priority-ordered background job scheduler with delayed execution,
//! bounded retries with linear backoff, and a single execution slot.

mod builtin;
mod handler;
mod job;
mod metrics;
mod queue;
mod scheduler;

pub use builtin::{
    register_cache_handlers, CacheCleanupHandler, CacheWarmupHandler, CACHE_CLEANUP_JOB,
    CACHE_WARMUP_JOB,
};
pub use handler::{handler_fn, FnHandler, JobContext, JobHandler};
pub use job::{Job, JobId, JobOptions, JobPriority, JobStatus};
pub use metrics::JobMetrics;
pub use queue::{JobQueue, QueuedJob};
pub use scheduler::{DispatchPolicy, JobScheduler, SchedulerConfig, TickOutcome};
