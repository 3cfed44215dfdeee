//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Register jobs → Start triggers → Serve health
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Trigger loops stop → Health server drains → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - In-flight job bodies are not cancelled; their trigger loop exits after
//!   the current run completes

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
