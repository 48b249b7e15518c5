//! Error types for the cache and job scheduler
//!
//! Provides unified error handling using thiserror. Expected conditions such
//! as cache misses or unknown job ids are plain return values, not errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Job Error ==
/// Programmer errors raised when scheduling a job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// No handler is registered for the requested job type
    #[error("No handler registered for job type: {0}")]
    UnknownJobType(String),
}

// == Api Error Enum ==
/// Error type surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key or job not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Entry could not be stored
    #[error("Entry rejected: {0}")]
    Rejected(String),

    /// Request conflicts with the current state, e.g. cancelling a running job
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Scheduling failed
    #[error(transparent)]
    Job(#[from] JobError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Job(JobError::UnknownJobType(_)) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, ApiError>;
