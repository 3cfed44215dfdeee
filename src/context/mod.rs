//! Per-thread diagnostic context.
//!
//! # Data Flow
//! ```text
//! Scheduled run / nested call
//!     → correlation.rs (enter: create or reuse identifier, depth += 1)
//!     → mdc.rs (identifier stored under `correlation_id`)
//!     → log lines read the identifier while the scope is open
//!     → correlation.rs (exit: depth -= 1, identifier removed at depth 0)
//! ```
//!
//! # Design Decisions
//! - State is strictly thread-local; nothing is shared across threads
//! - Nested scopes reuse the outermost identifier
//! - Unbalanced exits are silently ignored

pub mod correlation;
pub mod mdc;

pub use correlation::{CorrelationContext, CorrelationScope, CORRELATION_ID_KEY};
