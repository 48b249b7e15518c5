//! API Handlers
//!
//! HTTP request handlers for the cache and job endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tokio::sync::RwLock;
use tracing::warn;

use crate::cache::{CacheFacade, CacheSnapshot, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::jobs::{
    register_cache_handlers, Job, JobId, JobMetrics, JobPriority, JobScheduler, CACHE_WARMUP_JOB,
};
use crate::models::{
    CancelResponse, ClearResponse, DeleteResponse, GetResponse, HealthResponse, ImportResponse,
    JobListQuery, ScheduleJobRequest, ScheduleJobResponse, SetRequest, SetResponse,
    StatsResponse, WarmupRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: SharedCache,
    pub scheduler: JobScheduler,
}

impl AppState {
    /// Creates a new AppState around an existing store and scheduler.
    ///
    /// No handlers are registered; see [`AppState::with_builtin_handlers`].
    pub fn new(cache: CacheStore, scheduler: JobScheduler) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            scheduler,
        }
    }

    /// Registers the built-in cache jobs on the scheduler.
    pub async fn with_builtin_handlers(self) -> Self {
        register_cache_handlers(&self.scheduler, &self.cache).await;
        self
    }

    /// Creates a new AppState from configuration with the built-in jobs registered.
    pub async fn from_config(config: &Config) -> Self {
        let cache = CacheStore::new(config.cache_config());
        let scheduler = JobScheduler::new(config.scheduler_config());
        Self::new(cache, scheduler).with_builtin_handlers().await
    }

    /// Category-aware view of the shared cache.
    pub fn facade(&self) -> CacheFacade {
        CacheFacade::new(self.cache.clone())
    }
}

// == Cache Handlers ==

/// Handler for PUT /cache
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let stored = state
        .cache
        .write()
        .await
        .set_with_tags(req.key.clone(), req.value, ttl, req.tags);
    if !stored {
        return Err(ApiError::Rejected(format!(
            "Entry '{}' does not fit in the cache",
            req.key
        )));
    }

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a hit updates LRU order and stats
    let value = state.cache.write().await.get(&key);

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(ApiError::NotFound(format!("Key '{}'", key))),
    }
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.write().await.delete(&key) {
        return Err(ApiError::NotFound(format!("Key '{}'", key)));
    }
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.len();
    cache.clear();
    warn!("Cache cleared over HTTP, {} entries dropped", removed);
    Json(ClearResponse { removed })
}

/// Handler for DELETE /cache/tags/:tag
pub async fn clear_tag_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<ClearResponse> {
    let removed = state.cache.write().await.clear_by_tag(&tag);
    Json(ClearResponse { removed })
}

/// Handler for GET /cache/export
pub async fn export_handler(State(state): State<AppState>) -> Json<CacheSnapshot> {
    Json(state.cache.read().await.export())
}

/// Handler for POST /cache/import
pub async fn import_handler(
    State(state): State<AppState>,
    Json(snapshot): Json<CacheSnapshot>,
) -> Json<ImportResponse> {
    let imported = state.cache.write().await.import(snapshot);
    Json(ImportResponse { imported })
}

/// Handler for POST /cache/warmup
///
/// Loading happens on the job processor, so this answers 202 right away.
pub async fn warmup_handler(
    State(state): State<AppState>,
    Json(req): Json<WarmupRequest>,
) -> Result<(StatusCode, Json<ScheduleJobResponse>)> {
    let payload = serde_json::to_value(&req).map_err(|e| ApiError::Internal(e.to_string()))?;
    let options = state
        .scheduler
        .default_options()
        .with_priority(JobPriority::High);

    let id = state
        .scheduler
        .schedule_job(CACHE_WARMUP_JOB, payload, options)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ScheduleJobResponse::new(id, CACHE_WARMUP_JOB)),
    ))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
///
/// Combines the cache health report with job scheduler metrics.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.cache.read().await.health_status();
    let jobs = state.scheduler.performance_metrics().await;
    Json(HealthResponse::new(cache, jobs))
}

// == Job Handlers ==

/// Handler for POST /jobs
pub async fn schedule_job_handler(
    State(state): State<AppState>,
    Json(req): Json<ScheduleJobRequest>,
) -> Result<(StatusCode, Json<ScheduleJobResponse>)> {
    if req.job_type.is_empty() {
        return Err(ApiError::InvalidRequest("Job type cannot be empty".to_string()));
    }

    let options = req.options(state.scheduler.default_options());
    let id = state
        .scheduler
        .schedule_job(&req.job_type, req.payload, options)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ScheduleJobResponse::new(id, &req.job_type)),
    ))
}

/// Handler for GET /jobs
pub async fn list_jobs_handler(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Json<Vec<Job>> {
    Json(state.scheduler.list_jobs(query.status).await)
}

/// Handler for GET /jobs/:id
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<Job>> {
    state
        .scheduler
        .get_job_status(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {}", id)))
}

/// Handler for DELETE /jobs/:id
///
/// Unknown ids are a 404. Known jobs that are no longer pending are a 409.
pub async fn cancel_job_handler(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<CancelResponse>> {
    if state.scheduler.cancel_job(id).await {
        return Ok(Json(CancelResponse::new(id)));
    }

    match state.scheduler.get_job_status(id).await {
        Some(job) => Err(ApiError::Conflict(format!(
            "Job {} is {} and cannot be cancelled",
            id, job.status
        ))),
        None => Err(ApiError::NotFound(format!("Job {}", id))),
    }
}

/// Handler for GET /jobs/metrics
pub async fn job_metrics_handler(State(state): State<AppState>) -> Json<JobMetrics> {
    Json(state.scheduler.performance_metrics().await)
}
