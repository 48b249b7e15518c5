//! Cache Scheduler - in-memory resource cache with a priority job scheduler
//!
//! Provides a TTL/LRU cache with tag invalidation and a single-slot background
//! job processor with delayed execution and bounded retries.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheFacade, CacheStore, SharedCache};
pub use config::Config;
pub use jobs::{JobScheduler, SchedulerConfig};
pub use tasks::{spawn_cleanup_task, BackgroundTasks};
