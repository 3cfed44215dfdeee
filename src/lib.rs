//! Scheduled job supervision library.
//!
//! Wraps periodic job runs with a correlation identifier, a time budget and
//! per-job health tracking, and exposes aggregate health over HTTP.

pub mod config;
pub mod context;
pub mod health;
pub mod http;
pub mod jobs;
pub mod lifecycle;
pub mod observability;

pub use config::SentinelConfig;
pub use context::{CorrelationContext, CorrelationScope};
pub use health::{HealthRecord, HealthRegistry, HealthReport, HealthStatus};
pub use http::HealthServer;
pub use jobs::{JobDescriptor, JobExecutor, Scheduler};
pub use lifecycle::Shutdown;
