//! API Module
//!
//! HTTP handlers and routing for the cache and job scheduler REST API.
//!
//! # Endpoints
//! - `PUT /cache` - Store a JSON value with optional TTL and tags
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Delete a key
//! - `DELETE /cache` - Drop every entry
//! - `DELETE /cache/tags/:tag` - Drop every entry carrying a tag
//! - `GET /cache/export`, `POST /cache/import` - Snapshot live entries
//! - `POST /cache/warmup` - Queue a warm-up job
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Cache health and job metrics
//! - `POST /jobs`, `GET /jobs` - Schedule and list jobs
//! - `GET /jobs/:id`, `DELETE /jobs/:id` - Job status and cancellation
//! - `GET /jobs/metrics` - Scheduler metrics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
