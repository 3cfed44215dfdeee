//! Metrics collection and exposition.
//!
//! # Metrics
//! - `job_runs_total` (counter): completed runs by job and outcome
//! - `job_run_duration_seconds` (histogram): wall-clock duration per run
//! - `job_health` (gauge): 1=healthy, 0=degraded
//! - `job_runs_skipped_total` (counter): ticks skipped because the lock was held
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is optional and serves its own listener

use std::net::SocketAddr;
use std::time::Duration;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// How a job run ended, as seen by the metrics layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failure,
    Overrun,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::Failure => "failure",
            RunOutcome::Overrun => "overrun",
        }
    }
}

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_run(job: &str, outcome: RunOutcome, duration: Duration) {
    counter!("job_runs_total", "job" => job.to_string(), "outcome" => outcome.as_str())
        .increment(1);
    histogram!("job_run_duration_seconds", "job" => job.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_job_health(job: &str, healthy: bool) {
    gauge!("job_health", "job" => job.to_string()).set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_skipped(job: &str) {
    counter!("job_runs_skipped_total", "job" => job.to_string()).increment(1);
}
