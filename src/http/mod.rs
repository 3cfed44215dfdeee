//! HTTP health endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request id assigned, request span opened)
//!     → handler reads the health registry
//!     → aggregate / per-job status mapped to UP or RESTRICTED
//!     → JSON response, x-request-id echoed back
//! ```

pub mod server;

pub use server::{router, HealthServer, X_REQUEST_ID};
