//! Job Scheduler Module
//!
//! Handler registry, job records, and the single-slot processor loop.
//!
//! At most one job executes at a time. Each processor tick takes one ready
//! job from the queue, runs its handler to completion, and applies the
//! completed / retry / failed transition before the next tick may start.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::{duration_ms, SharedClock, SystemClock};
use crate::error::JobError;
use crate::jobs::metrics::MetricsRecorder;
use crate::jobs::{
    Job, JobContext, JobHandler, JobId, JobMetrics, JobOptions, JobQueue, JobStatus, QueuedJob,
};

// == Dispatch Policy ==
/// How a tick picks the job to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Only the head of the queue is considered. A head that is not ready yet
    /// is put back at its priority position and the tick runs nothing, so
    /// ready jobs behind it wait for a later tick.
    #[default]
    HeadOnly,
    /// The first ready job in queue order runs, skipping delayed ones.
    FirstReady,
}

// == Scheduler Config ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Processor cadence
    pub tick_interval: Duration,
    /// Retry `n` waits `n * retry_backoff`
    pub retry_backoff: Duration,
    /// Retries granted when a caller does not choose
    pub default_max_retries: u32,
    /// Maximum handler run time; `None` disables the limit
    pub job_timeout: Option<Duration>,
    pub dispatch_policy: DispatchPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            retry_backoff: Duration::from_secs(1),
            default_max_retries: 3,
            job_timeout: None,
            dispatch_policy: DispatchPolicy::HeadOnly,
        }
    }
}

// == Tick Outcome ==
/// What a single processor tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another tick still holds the execution slot
    Busy,
    /// Nothing is queued
    Idle,
    /// The candidate job is not ready yet
    Deferred(JobId),
    Completed(JobId),
    /// The attempt failed and the job went back to the queue
    Retrying(JobId),
    /// The attempt failed with no retries left
    Failed(JobId),
}

// == Job Book ==
/// Every job the scheduler knows about plus the pending queue.
#[derive(Debug, Default)]
struct JobBook {
    jobs: HashMap<JobId, Job>,
    queue: JobQueue,
    metrics: MetricsRecorder,
    /// Job in the execution slot and its live progress
    running: Option<(JobId, Arc<AtomicU8>)>,
}

impl JobBook {
    fn snapshot(&self, id: JobId) -> Option<Job> {
        let mut job = self.jobs.get(&id)?.clone();
        if let Some((running_id, progress)) = &self.running {
            if *running_id == id {
                job.progress = Some(progress.load(Ordering::Relaxed));
            }
        }
        Some(job)
    }
}

/// Releases the execution slot when dropped.
struct SlotGuard<'a>(&'a AtomicBool);

impl<'a> SlotGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Ticker {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

struct Inner {
    config: SchedulerConfig,
    clock: SharedClock,
    handlers: RwLock<HashMap<String, Arc<dyn JobHandler>>>,
    book: Mutex<JobBook>,
    executing: AtomicBool,
    ticker: Mutex<Option<Ticker>>,
}

// == Job Scheduler ==
/// Priority job scheduler with delayed execution and bounded retries.
///
/// Cheap to clone; clones share the same queue and handlers.
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<Inner>,
}

impl fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobScheduler")
            .field("config", &self.inner.config)
            .field("executing", &self.inner.executing.load(Ordering::Relaxed))
            .finish()
    }
}

impl JobScheduler {
    // == Constructor ==
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SchedulerConfig, clock: SharedClock) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                clock,
                handlers: RwLock::new(HashMap::new()),
                book: Mutex::new(JobBook::default()),
                executing: AtomicBool::new(false),
                ticker: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Options with the configured retry budget and medium priority.
    pub fn default_options(&self) -> JobOptions {
        JobOptions::default().with_max_retries(self.inner.config.default_max_retries)
    }

    fn now(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    // == Register Handler ==
    /// Registers the handler for `job_type`, replacing any previous one.
    pub async fn register_handler<H>(&self, job_type: impl Into<String>, handler: H)
    where
        H: JobHandler + 'static,
    {
        self.register_shared_handler(job_type, Arc::new(handler)).await;
    }

    pub async fn register_shared_handler(
        &self,
        job_type: impl Into<String>,
        handler: Arc<dyn JobHandler>,
    ) {
        let job_type = job_type.into();
        debug!("Registered job handler for '{}'", job_type);
        self.inner.handlers.write().await.insert(job_type, handler);
    }

    pub async fn has_handler(&self, job_type: &str) -> bool {
        self.inner.handlers.read().await.contains_key(job_type)
    }

    // == Schedule Job ==
    /// Queues a job and returns its id.
    ///
    /// # Errors
    /// `JobError::UnknownJobType` if no handler is registered for `job_type`.
    pub async fn schedule_job(
        &self,
        job_type: &str,
        payload: Value,
        options: JobOptions,
    ) -> Result<JobId, JobError> {
        if !self.has_handler(job_type).await {
            return Err(JobError::UnknownJobType(job_type.to_string()));
        }

        let job = Job::new(job_type, payload, &options, self.now());
        let id = job.id;

        let mut book = self.inner.book.lock().await;
        book.queue.push(QueuedJob {
            id,
            priority: job.priority,
            scheduled_at: job.scheduled_at,
        });
        book.jobs.insert(id, job);
        book.metrics.record_scheduled();

        info!(
            "Scheduled job {} type={} priority={} delay={}ms",
            id,
            job_type,
            options.priority,
            options.delay.as_millis()
        );
        Ok(id)
    }

    // == Job Status ==
    /// Returns the job record, or None for an unknown id.
    pub async fn get_job_status(&self, id: JobId) -> Option<Job> {
        self.inner.book.lock().await.snapshot(id)
    }

    /// Lists known jobs oldest first, optionally filtered by status.
    pub async fn list_jobs(&self, status: Option<JobStatus>) -> Vec<Job> {
        let book = self.inner.book.lock().await;
        let mut jobs: Vec<Job> = book
            .jobs
            .keys()
            .filter_map(|id| book.snapshot(*id))
            .filter(|job| status.map_or(true, |s| job.status == s))
            .collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    /// Pending job ids in the order they would be considered.
    pub async fn queued_job_ids(&self) -> Vec<JobId> {
        self.inner.book.lock().await.queue.ids()
    }

    // == Cancel Job ==
    /// Cancels a pending job. Running, finished, and unknown jobs are left
    /// alone and false is returned.
    pub async fn cancel_job(&self, id: JobId) -> bool {
        let now = self.now();
        let mut book = self.inner.book.lock().await;

        match book.jobs.get(&id) {
            Some(job) if job.status == JobStatus::Pending => {}
            _ => return false,
        }

        book.queue.remove(id);
        if let Some(job) = book.jobs.get_mut(&id) {
            job.status = JobStatus::Cancelled;
            job.completed_at = Some(now);
        }
        book.metrics.record_cancelled();

        info!("Cancelled job {}", id);
        true
    }

    // == Metrics ==
    pub async fn performance_metrics(&self) -> JobMetrics {
        let book = self.inner.book.lock().await;
        let running = book.running.as_ref().map(|(id, _)| *id);
        book.metrics.snapshot(book.queue.len(), running)
    }

    // == Cleanup ==
    /// Forgets terminal jobs that finished more than `max_age` ago.
    ///
    /// Returns the number of records removed.
    pub async fn cleanup_finished_jobs(&self, max_age: Duration) -> usize {
        let cutoff = self.now().saturating_sub(duration_ms(max_age));
        let mut book = self.inner.book.lock().await;

        let before = book.jobs.len();
        book.jobs.retain(|_, job| {
            !(job.status.is_terminal() && job.completed_at.map_or(false, |at| at <= cutoff))
        });
        before - book.jobs.len()
    }

    // == Tick ==
    /// Runs one processor step.
    ///
    /// Returns `Busy` without touching the queue if a previous step is still
    /// executing. Handler errors, panics, and timeouts are recorded on the
    /// job and never escape this call.
    pub async fn tick(&self) -> TickOutcome {
        let Some(_slot) = SlotGuard::acquire(&self.inner.executing) else {
            return TickOutcome::Busy;
        };

        let (id, handler, ctx) = match self.claim_next().await {
            Ok(claimed) => claimed,
            Err(outcome) => return outcome,
        };

        let result = match handler {
            Some(handler) => self.execute(handler, ctx).await,
            None => Err("No handler registered".to_string()),
        };

        self.finish(id, result).await
    }

    /// Moves the next ready job to `running` and returns what is needed to run it.
    async fn claim_next(
        &self,
    ) -> Result<(JobId, Option<Arc<dyn JobHandler>>, JobContext), TickOutcome> {
        let now = self.now();
        let mut book = self.inner.book.lock().await;

        let next = match self.inner.config.dispatch_policy {
            DispatchPolicy::HeadOnly => {
                let head = book.queue.pop_front().ok_or(TickOutcome::Idle)?;
                if !head.is_ready(now) {
                    book.queue.push(head);
                    debug!("Job {} not ready until {}", head.id, head.scheduled_at);
                    return Err(TickOutcome::Deferred(head.id));
                }
                head
            }
            DispatchPolicy::FirstReady => match book.queue.pop_first_ready(now) {
                Some(next) => next,
                None => {
                    return Err(match book.queue.peek() {
                        Some(head) => TickOutcome::Deferred(head.id),
                        None => TickOutcome::Idle,
                    })
                }
            },
        };

        let Some(job) = book.jobs.get_mut(&next.id) else {
            warn!("Queued job {} has no record; dropping it", next.id);
            return Err(TickOutcome::Idle);
        };

        job.status = JobStatus::Running;
        job.started_at = Some(now);
        let ctx = JobContext::new(
            job.id,
            job.job_type.clone(),
            job.payload.clone(),
            job.retry_count + 1,
        );
        let job_type = job.job_type.clone();
        book.running = Some((next.id, ctx.progress_cell()));

        let handler = self.inner.handlers.read().await.get(&job_type).cloned();
        debug!("Running job {} type={} attempt={}", next.id, job_type, ctx.attempt);
        Ok((next.id, handler, ctx))
    }

    /// Runs a handler on its own task so panics and timeouts are contained.
    async fn execute(&self, handler: Arc<dyn JobHandler>, ctx: JobContext) -> Result<(), String> {
        let mut task = tokio::spawn(async move { handler.handle(ctx).await });

        let joined = match self.inner.config.job_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    return Err(format!("Job timed out after {}ms", limit.as_millis()));
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(format!("{:#}", err)),
            Err(join_err) if join_err.is_panic() => Err("Job handler panicked".to_string()),
            Err(join_err) => Err(join_err.to_string()),
        }
    }

    /// Applies the completed / retry / failed transition.
    async fn finish(&self, id: JobId, result: Result<(), String>) -> TickOutcome {
        let now = self.now();
        let backoff_unit = duration_ms(self.inner.config.retry_backoff);
        let mut guard = self.inner.book.lock().await;
        let book = &mut *guard;
        book.running = None;

        let Some(job) = book.jobs.get_mut(&id) else {
            return TickOutcome::Idle;
        };

        match result {
            Ok(()) => {
                job.status = JobStatus::Completed;
                job.completed_at = Some(now);
                job.progress = Some(100);
                let duration = now.saturating_sub(job.started_at.unwrap_or(now));
                book.metrics.record_completed(duration);
                info!("Job {} completed in {}ms", id, duration);
                TickOutcome::Completed(id)
            }
            Err(message) if job.retry_count < job.max_retries => {
                job.retry_count += 1;
                job.status = JobStatus::Pending;
                job.scheduled_at =
                    now.saturating_add(u64::from(job.retry_count).saturating_mul(backoff_unit));
                job.error = Some(message);
                book.queue.push(QueuedJob {
                    id,
                    priority: job.priority,
                    scheduled_at: job.scheduled_at,
                });
                book.metrics.record_retry();
                warn!(
                    "Job {} failed (retry {}/{}), next attempt at {}: {}",
                    id,
                    job.retry_count,
                    job.max_retries,
                    job.scheduled_at,
                    job.error.as_deref().unwrap_or_default()
                );
                TickOutcome::Retrying(id)
            }
            Err(message) => {
                job.status = JobStatus::Failed;
                job.completed_at = Some(now);
                error!("Job {} failed permanently: {}", id, message);
                job.error = Some(message);
                book.metrics.record_failed();
                TickOutcome::Failed(id)
            }
        }
    }

    // == Lifecycle ==
    /// Starts the processor loop. Calling it again while running does nothing.
    pub async fn start(&self) {
        let mut ticker = self.inner.ticker.lock().await;
        if ticker.is_some() {
            return;
        }

        let (shutdown, mut stop_rx) = watch::channel(false);
        let scheduler = self.clone();
        let interval = self.inner.config.tick_interval;

        let handle = tokio::spawn(async move {
            let mut clock = tokio::time::interval(interval);
            clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = clock.tick() => {
                        scheduler.tick().await;
                    }
                    _ = stop_rx.changed() => break,
                }
            }
            debug!("Job processor loop exited");
        });

        info!("Job processor started with tick interval {:?}", interval);
        *ticker = Some(Ticker { handle, shutdown });
    }

    /// Stops the processor loop, waiting for the job in flight to finish.
    pub async fn stop(&self) {
        let Some(ticker) = self.inner.ticker.lock().await.take() else {
            return;
        };

        let _ = ticker.shutdown.send(true);
        if let Err(err) = ticker.handle.await {
            warn!("Job processor loop ended abnormally: {}", err);
        }
        info!("Job processor stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.inner.ticker.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::jobs::{handler_fn, JobPriority};
    use serde_json::json;
    use std::sync::atomic::AtomicU32;
    use tokio::sync::Notify;

    fn scheduler() -> (JobScheduler, ManualClock) {
        let clock = ManualClock::new(10_000);
        let config = SchedulerConfig {
            retry_backoff: Duration::from_millis(100),
            ..SchedulerConfig::default()
        };
        (JobScheduler::with_clock(config, Arc::new(clock.clone())), clock)
    }

    async fn register_ok(scheduler: &JobScheduler, job_type: &str) {
        scheduler
            .register_handler(
                job_type,
                handler_fn(|_ctx: JobContext| async { Ok::<(), anyhow::Error>(()) }),
            )
            .await;
    }

    /// Fails every attempt and counts how often it ran.
    struct Failing {
        attempts: Arc<AtomicU32>,
    }

    #[async_trait::async_trait]
    impl JobHandler for Failing {
        async fn handle(&self, _ctx: JobContext) -> anyhow::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("upstream unavailable")
        }
    }

    struct Panicking;

    #[async_trait::async_trait]
    impl JobHandler for Panicking {
        async fn handle(&self, _ctx: JobContext) -> anyhow::Result<()> {
            panic!("handler bug")
        }
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected_at_schedule_time() {
        let (scheduler, _) = scheduler();

        let err = scheduler
            .schedule_job("missing", json!({}), JobOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err, JobError::UnknownJobType("missing".to_string()));
        assert_eq!(scheduler.performance_metrics().await.total_jobs, 0);
    }

    #[tokio::test]
    async fn test_successful_job_lifecycle() {
        let (scheduler, _) = scheduler();
        register_ok(&scheduler, "noop").await;

        let id = scheduler
            .schedule_job("noop", json!({"a": 1}), JobOptions::default())
            .await
            .unwrap();
        let pending = scheduler.get_job_status(id).await.unwrap();
        assert_eq!(pending.status, JobStatus::Pending);

        assert_eq!(scheduler.tick().await, TickOutcome::Completed(id));

        let done = scheduler.get_job_status(id).await.unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.progress, Some(100));
        assert!(done.started_at.is_some());
        assert!(done.completed_at.is_some());
        assert_eq!(scheduler.tick().await, TickOutcome::Idle);
    }

    #[tokio::test]
    async fn test_priority_then_fifo_order() {
        let (scheduler, _) = scheduler();
        register_ok(&scheduler, "work").await;

        let low = scheduler
            .schedule_job("work", json!(1), JobOptions::default().with_priority(JobPriority::Low))
            .await
            .unwrap();
        let a = scheduler.schedule_job("work", json!(2), JobOptions::default()).await.unwrap();
        let b = scheduler.schedule_job("work", json!(3), JobOptions::default()).await.unwrap();
        let critical = scheduler
            .schedule_job(
                "work",
                json!(4),
                JobOptions::default().with_priority(JobPriority::Critical),
            )
            .await
            .unwrap();

        assert_eq!(scheduler.tick().await, TickOutcome::Completed(critical));
        assert_eq!(scheduler.tick().await, TickOutcome::Completed(a));
        assert_eq!(scheduler.tick().await, TickOutcome::Completed(b));
        assert_eq!(scheduler.tick().await, TickOutcome::Completed(low));
    }

    #[tokio::test]
    async fn test_delayed_head_blocks_one_tick() {
        let (scheduler, clock) = scheduler();
        register_ok(&scheduler, "work").await;

        let delayed = scheduler
            .schedule_job(
                "work",
                json!(null),
                JobOptions::default()
                    .with_priority(JobPriority::High)
                    .with_delay(Duration::from_millis(500)),
            )
            .await
            .unwrap();
        let ready = scheduler
            .schedule_job("work", json!(null), JobOptions::default().with_priority(JobPriority::Low))
            .await
            .unwrap();

        assert_eq!(scheduler.tick().await, TickOutcome::Deferred(delayed));
        assert_eq!(scheduler.queued_job_ids().await, vec![delayed, ready]);
        assert_eq!(scheduler.tick().await, TickOutcome::Deferred(delayed));

        clock.advance_ms(500);
        assert_eq!(scheduler.tick().await, TickOutcome::Completed(delayed));
        assert_eq!(scheduler.tick().await, TickOutcome::Completed(ready));
    }

    #[tokio::test]
    async fn test_first_ready_policy_skips_delayed_head() {
        let clock = ManualClock::new(0);
        let config = SchedulerConfig {
            dispatch_policy: DispatchPolicy::FirstReady,
            ..SchedulerConfig::default()
        };
        let scheduler = JobScheduler::with_clock(config, Arc::new(clock.clone()));
        register_ok(&scheduler, "work").await;

        let delayed = scheduler
            .schedule_job(
                "work",
                json!(null),
                JobOptions::default()
                    .with_priority(JobPriority::Critical)
                    .with_delay(Duration::from_secs(1)),
            )
            .await
            .unwrap();
        let ready = scheduler.schedule_job("work", json!(null), JobOptions::default()).await.unwrap();

        assert_eq!(scheduler.tick().await, TickOutcome::Completed(ready));
        assert_eq!(scheduler.tick().await, TickOutcome::Deferred(delayed));
    }

    #[tokio::test]
    async fn test_huge_backoff_saturates_instead_of_panicking() {
        let clock = ManualClock::new(10_000);
        let config = SchedulerConfig {
            retry_backoff: Duration::from_millis(u64::MAX),
            ..SchedulerConfig::default()
        };
        let scheduler = JobScheduler::with_clock(config, Arc::new(clock.clone()));
        scheduler
            .register_handler(
                "flaky",
                Failing {
                    attempts: Arc::new(AtomicU32::new(0)),
                },
            )
            .await;

        let id = scheduler
            .schedule_job("flaky", json!(null), JobOptions::default().with_max_retries(1))
            .await
            .unwrap();

        assert_eq!(scheduler.tick().await, TickOutcome::Retrying(id));
        let job = scheduler.get_job_status(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.scheduled_at, u64::MAX);
        assert_eq!(scheduler.queued_job_ids().await, vec![id]);
        assert_eq!(scheduler.tick().await, TickOutcome::Deferred(id));
    }

    #[tokio::test]
    async fn test_bounded_retries_with_linear_backoff() {
        let (scheduler, clock) = scheduler();
        let attempts = Arc::new(AtomicU32::new(0));
        scheduler
            .register_handler(
                "flaky",
                Failing {
                    attempts: Arc::clone(&attempts),
                },
            )
            .await;

        let id = scheduler
            .schedule_job("flaky", json!(null), JobOptions::default().with_max_retries(2))
            .await
            .unwrap();

        assert_eq!(scheduler.tick().await, TickOutcome::Retrying(id));
        let job = scheduler.get_job_status(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.retry_count, 1);
        assert_eq!(job.scheduled_at, 10_100);
        assert_eq!(job.error.as_deref(), Some("upstream unavailable"));

        clock.advance_ms(100);
        assert_eq!(scheduler.tick().await, TickOutcome::Retrying(id));
        assert_eq!(scheduler.get_job_status(id).await.unwrap().scheduled_at, 10_300);

        clock.advance_ms(200);
        assert_eq!(scheduler.tick().await, TickOutcome::Failed(id));

        clock.advance_ms(10_000);
        assert_eq!(scheduler.tick().await, TickOutcome::Idle);

        let job = scheduler.get_job_status(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.retry_count, 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);

        let metrics = scheduler.performance_metrics().await;
        assert_eq!(metrics.failed_jobs, 1);
        assert_eq!(metrics.retried_attempts, 2);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let (scheduler, _) = scheduler();
        scheduler.register_handler("boom", Panicking).await;

        let id = scheduler
            .schedule_job("boom", json!(null), JobOptions::default().with_max_retries(0))
            .await
            .unwrap();

        assert_eq!(scheduler.tick().await, TickOutcome::Failed(id));
        let job = scheduler.get_job_status(id).await.unwrap();
        assert_eq!(job.error.as_deref(), Some("Job handler panicked"));
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let clock = ManualClock::new(0);
        let config = SchedulerConfig {
            job_timeout: Some(Duration::from_millis(20)),
            ..SchedulerConfig::default()
        };
        let scheduler = JobScheduler::with_clock(config, Arc::new(clock));
        scheduler
            .register_handler(
                "slow",
                handler_fn(|_ctx: JobContext| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok::<(), anyhow::Error>(())
                }),
            )
            .await;

        let id = scheduler
            .schedule_job("slow", json!(null), JobOptions::default().with_max_retries(1))
            .await
            .unwrap();

        assert_eq!(scheduler.tick().await, TickOutcome::Retrying(id));
        let job = scheduler.get_job_status(id).await.unwrap();
        assert_eq!(job.error.as_deref(), Some("Job timed out after 20ms"));
    }

    #[tokio::test]
    async fn test_cancel_only_pending() {
        let (scheduler, _) = scheduler();
        register_ok(&scheduler, "work").await;

        let first = scheduler.schedule_job("work", json!(null), JobOptions::default()).await.unwrap();
        let second = scheduler.schedule_job("work", json!(null), JobOptions::default()).await.unwrap();

        assert!(scheduler.cancel_job(second).await);
        assert!(!scheduler.cancel_job(second).await);
        assert_eq!(
            scheduler.get_job_status(second).await.unwrap().status,
            JobStatus::Cancelled
        );

        assert_eq!(scheduler.tick().await, TickOutcome::Completed(first));
        assert!(!scheduler.cancel_job(first).await);
        assert_eq!(
            scheduler.get_job_status(first).await.unwrap().status,
            JobStatus::Completed
        );

        assert!(!scheduler.cancel_job(uuid::Uuid::new_v4()).await);
        assert_eq!(scheduler.tick().await, TickOutcome::Idle);
        assert_eq!(scheduler.performance_metrics().await.cancelled_jobs, 1);
    }

    #[tokio::test]
    async fn test_running_job_holds_slot_and_cannot_be_cancelled() {
        let (scheduler, _) = scheduler();
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let (started_tx, release_rx) = (Arc::clone(&started), Arc::clone(&release));

        scheduler
            .register_handler(
                "blocking",
                handler_fn(move |ctx: JobContext| {
                    let started = Arc::clone(&started_tx);
                    let release = Arc::clone(&release_rx);
                    async move {
                        ctx.set_progress(40);
                        started.notify_one();
                        release.notified().await;
                        Ok::<(), anyhow::Error>(())
                    }
                }),
            )
            .await;
        register_ok(&scheduler, "work").await;

        let id = scheduler.schedule_job("blocking", json!(null), JobOptions::default()).await.unwrap();
        let queued = scheduler.schedule_job("work", json!(null), JobOptions::default()).await.unwrap();

        let runner = scheduler.clone();
        let first_tick = tokio::spawn(async move { runner.tick().await });
        started.notified().await;

        assert_eq!(scheduler.tick().await, TickOutcome::Busy);
        assert!(!scheduler.cancel_job(id).await);

        let running = scheduler.get_job_status(id).await.unwrap();
        assert_eq!(running.status, JobStatus::Running);
        assert_eq!(running.progress, Some(40));
        assert_eq!(scheduler.performance_metrics().await.running_job, Some(id));

        release.notify_one();
        assert_eq!(first_tick.await.unwrap(), TickOutcome::Completed(id));
        assert_eq!(scheduler.tick().await, TickOutcome::Completed(queued));
    }

    #[tokio::test]
    async fn test_cleanup_finished_jobs() {
        let (scheduler, clock) = scheduler();
        register_ok(&scheduler, "work").await;

        let done = scheduler.schedule_job("work", json!(null), JobOptions::default()).await.unwrap();
        scheduler.tick().await;
        let waiting = scheduler
            .schedule_job(
                "work",
                json!(null),
                JobOptions::default().with_delay(Duration::from_secs(3600)),
            )
            .await
            .unwrap();

        clock.advance(Duration::from_secs(30));
        assert_eq!(scheduler.cleanup_finished_jobs(Duration::from_secs(60)).await, 0);

        clock.advance(Duration::from_secs(31));
        assert_eq!(scheduler.cleanup_finished_jobs(Duration::from_secs(60)).await, 1);
        assert!(scheduler.get_job_status(done).await.is_none());
        assert!(scheduler.get_job_status(waiting).await.is_some());
    }

    #[tokio::test]
    async fn test_start_and_stop_process_queue() {
        let config = SchedulerConfig {
            tick_interval: Duration::from_millis(10),
            ..SchedulerConfig::default()
        };
        let scheduler = JobScheduler::new(config);
        register_ok(&scheduler, "work").await;

        let id = scheduler.schedule_job("work", json!(null), JobOptions::default()).await.unwrap();
        scheduler.start().await;
        scheduler.start().await;
        assert!(scheduler.is_running().await);

        let mut status = JobStatus::Pending;
        for _ in 0..100 {
            status = scheduler.get_job_status(id).await.unwrap().status;
            if status == JobStatus::Completed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(status, JobStatus::Completed);

        scheduler.stop().await;
        assert!(!scheduler.is_running().await);

        let after = scheduler.schedule_job("work", json!(null), JobOptions::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            scheduler.get_job_status(after).await.unwrap().status,
            JobStatus::Pending
        );
    }
}
