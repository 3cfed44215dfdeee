//! Scheduled job execution subsystem.
//!
//! # Data Flow
//! ```text
//! trigger.rs (interval tick)
//!     → lock.rs (take the job's lease, or skip this tick)
//!     → blocking pool thread
//!     → executor.rs
//!         → correlation scope opened
//!         → health record reset, body invoked, budget checked
//!         → health record updated, scope closed
//!     → lease released
//! ```
//!
//! # Design Decisions
//! - The executor is a plain function call; no interception magic
//! - Body failures never reach the trigger
//! - Overruns are detected after the fact, bodies are never cancelled

pub mod command;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod lock;
pub mod trigger;

pub use descriptor::JobDescriptor;
pub use error::JobError;
pub use executor::{JobExecutor, MAX_EXECUTION_TIME_EXCEEDED};
pub use lock::{InProcessLock, JobLock, LockLease, NoopLock};
pub use trigger::{JobBody, ScheduledJob, Scheduler};
