//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Job runs and HTTP requests produce:
//!     → logging.rs (structured log events, tagged with correlation ids)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
