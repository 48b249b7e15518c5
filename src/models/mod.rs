//! Request and Response models for the HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::{JobListQuery, ScheduleJobRequest, SetRequest, WarmupRequest};
pub use responses::{
    CancelResponse, ClearResponse, DeleteResponse, ErrorResponse, GetResponse, HealthResponse,
    ImportResponse, ScheduleJobResponse, SetResponse, StatsResponse,
};
