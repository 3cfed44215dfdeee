//! Job health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Job run (jobs::executor):
//!     → registry.rs (find or create record for the job name)
//!     → record.rs (reset / mark healthy / mark unhealthy)
//!
//! Health query (http::server, manual callers):
//!     → registry.rs (point-in-time listing)
//!     → aggregate.rs (all healthy → UP, any degraded → RESTRICTED + reasons)
//! ```
//!
//! # Design Decisions
//! - One record per job name, created on first reference
//! - Health reads never block writers
//! - Job code may override health directly through the registry

pub mod aggregate;
pub mod record;
pub mod registry;

pub use aggregate::{aggregate, HealthReport};
pub use record::{HealthRecord, HealthSnapshot, HealthStatus, UNKNOWN_REASON};
pub use registry::HealthRegistry;
