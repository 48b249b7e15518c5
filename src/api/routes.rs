//! API Routes
//!
//! Configures the Axum router with all cache and job endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cancel_job_handler, clear_handler, clear_tag_handler, delete_handler, export_handler,
    get_handler, health_handler, import_handler, job_metrics_handler, job_status_handler,
    list_jobs_handler, schedule_job_handler, set_handler, stats_handler, warmup_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static segments are matched before captures, so `/cache/export` is never a key lookup
    Router::new()
        .route("/cache", put(set_handler).delete(clear_handler))
        .route("/cache/export", get(export_handler))
        .route("/cache/import", post(import_handler))
        .route("/cache/warmup", post(warmup_handler))
        .route("/cache/tags/:tag", delete(clear_tag_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/jobs", post(schedule_job_handler).get(list_jobs_handler))
        .route("/jobs/metrics", get(job_metrics_handler))
        .route("/jobs/:id", get(job_status_handler).delete(cancel_job_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
