//! Job Handler Module
//!
//! The seam between the scheduler and the work it runs.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::jobs::JobId;

// == Job Context ==
/// What a handler gets to see of the job it is running.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub id: JobId,
    pub job_type: String,
    pub payload: Value,
    /// 1 for the first execution, 2 for the first retry, and so on
    pub attempt: u32,
    progress: Arc<AtomicU8>,
}

impl JobContext {
    pub fn new(id: JobId, job_type: String, payload: Value, attempt: u32) -> Self {
        Self {
            id,
            job_type,
            payload,
            attempt,
            progress: Arc::new(AtomicU8::new(0)),
        }
    }

    /// Reports progress in percent. Values above 100 are clamped.
    pub fn set_progress(&self, percent: u8) {
        self.progress.store(percent.min(100), Ordering::Relaxed);
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Relaxed)
    }

    /// Shared cell the scheduler reads while the job runs.
    pub(crate) fn progress_cell(&self) -> Arc<AtomicU8> {
        Arc::clone(&self.progress)
    }
}

// == Job Handler ==
/// Executes jobs of one type.
///
/// Returning an error marks the attempt as failed; the scheduler decides
/// whether to retry.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, ctx: JobContext) -> anyhow::Result<()>;
}

// == Closure Adapter ==
/// Adapts an async closure into a [`JobHandler`].
pub struct FnHandler<F>(F);

/// Wraps `f` so it can be registered as a handler.
///
/// ```ignore
/// scheduler.register_handler("ping", handler_fn(|ctx| async move {
///     tracing::info!("ping {}", ctx.id);
///     Ok(())
/// })).await;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(JobContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> JobHandler for FnHandler<F>
where
    F: Fn(JobContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, ctx: JobContext) -> anyhow::Result<()> {
        (self.0)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_progress_is_clamped() {
        let ctx = JobContext::new(Uuid::new_v4(), "t".into(), json!(null), 1);
        let cell = ctx.progress_cell();

        ctx.set_progress(40);
        assert_eq!(cell.load(Ordering::Relaxed), 40);

        ctx.set_progress(250);
        assert_eq!(ctx.progress(), 100);
    }

    #[tokio::test]
    async fn test_handler_fn_runs_closure() {
        let handler = handler_fn(|ctx: JobContext| async move {
            anyhow::ensure!(ctx.payload["ok"] == true, "payload not ok");
            Ok(())
        });

        let ok = JobContext::new(Uuid::new_v4(), "t".into(), json!({"ok": true}), 1);
        let bad = JobContext::new(Uuid::new_v4(), "t".into(), json!({"ok": false}), 1);

        assert!(handler.handle(ok).await.is_ok());
        let err = handler.handle(bad).await.unwrap_err();
        assert_eq!(err.to_string(), "payload not ok");
    }
}
