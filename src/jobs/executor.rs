//! Scheduled job execution wrapper.
//!
//! # Responsibilities
//! - Tag every run with a fresh correlation identifier
//! - Measure run duration against the job's time budget
//! - Record success or failure in the job's health record
//! - Keep body failures (errors and panics) away from the trigger
//!
//! # Design Decisions
//! - The budget check runs after the body, so an overrun replaces the
//!   body's failure reason in the health record (the error is still logged)
//! - The executor never spawns threads; it blocks the caller for the
//!   whole body

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::context::{mdc, CorrelationScope};
use crate::health::{HealthRecord, HealthRegistry};
use crate::jobs::descriptor::JobDescriptor;
use crate::observability::metrics::{self, RunOutcome};

/// Reason recorded when a run exceeds its time budget.
pub const MAX_EXECUTION_TIME_EXCEEDED: &str = "Maximum execution time exceeded";

/// Wraps job invocations with correlation, timing, and health tracking.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    registry: Arc<HealthRegistry>,
}

impl JobExecutor {
    pub fn new(registry: Arc<HealthRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<HealthRegistry> {
        &self.registry
    }

    /// Run `body` as one scheduled run of `descriptor`.
    ///
    /// Returns the body's value, or `None` if it returned an error or
    /// panicked. Failures are recorded and logged, never propagated.
    pub fn run<T, E, F>(&self, descriptor: &JobDescriptor, body: F) -> Option<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        let record = self.registry.get_or_create(&descriptor.name);
        let start = Instant::now();

        let scope = CorrelationScope::enter(None);
        let correlation_id = scope.id();
        let span = tracing::info_span!(
            "job_run",
            job = %descriptor.name,
            correlation_id = %correlation_id
        );
        let _entered = span.enter();

        record.reset_outstanding_error();
        tracing::debug!("Job run started");

        let result = match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.record_failure(&record, descriptor, &correlation_id, &e.to_string());
                None
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.record_failure(&record, descriptor, &correlation_id, &message);
                None
            }
        };

        let elapsed = start.elapsed();
        let mut outcome = if result.is_some() {
            RunOutcome::Success
        } else {
            RunOutcome::Failure
        };

        if elapsed > descriptor.max_execution_time {
            tracing::warn!(
                job = %descriptor.name,
                correlation_id = %correlation_id,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = descriptor.max_execution_time.as_millis() as u64,
                "Job exceeded its maximum execution time"
            );
            record.mark_unhealthy(Some(MAX_EXECUTION_TIME_EXCEEDED));
            outcome = RunOutcome::Overrun;
        }

        record.mark_healthy_unless_outstanding();

        tracing::debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            outcome = outcome.as_str(),
            "Job run finished"
        );
        metrics::record_run(&descriptor.name, outcome, elapsed);
        metrics::record_job_health(&descriptor.name, record.is_healthy());

        result
    }

    fn record_failure(
        &self,
        record: &HealthRecord,
        descriptor: &JobDescriptor,
        correlation_id: &str,
        message: &str,
    ) {
        record.mark_unhealthy(Some(message));
        tracing::error!(
            job = %descriptor.name,
            correlation_id = %correlation_id,
            error = %message,
            diagnostics = ?mdc::snapshot(),
            "Job run failed"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CorrelationContext;
    use crate::health::{HealthStatus, UNKNOWN_REASON};
    use std::time::Duration;

    fn executor() -> JobExecutor {
        JobExecutor::new(Arc::new(HealthRegistry::new()))
    }

    #[test]
    fn test_success_returns_value_and_is_healthy() {
        let exec = executor();
        let job = JobDescriptor::new("report", Duration::from_secs(5));

        let value = exec.run(&job, || Ok::<_, String>(42));
        assert_eq!(value, Some(42));

        let snap = exec.registry().get("report").unwrap().snapshot();
        assert_eq!(snap.status, HealthStatus::Healthy);
        assert!(snap.reason.is_none());
    }

    #[test]
    fn test_error_is_recorded_and_swallowed() {
        let exec = executor();
        let job = JobDescriptor::new("sync", Duration::from_secs(5));

        let value: Option<()> = exec.run(&job, || Err("connection refused"));
        assert!(value.is_none());

        let snap = exec.registry().get("sync").unwrap().snapshot();
        assert_eq!(snap.status, HealthStatus::Degraded);
        assert_eq!(snap.reason.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_error_message_is_kept_verbatim() {
        let exec = executor();
        let job = JobDescriptor::new("gateway", Duration::from_secs(5));

        exec.run(&job, || Err::<(), _>("  upstream said: 502\n"));
        let snap = exec.registry().get("gateway").unwrap().snapshot();
        assert_eq!(snap.reason.as_deref(), Some("  upstream said: 502\n"));
    }

    #[test]
    fn test_failure_with_published_diagnostics() {
        let exec = executor();
        let job = JobDescriptor::new("batch", Duration::from_secs(5));

        exec.run(&job, || {
            mdc::put("batch_id", "b-17");
            Err::<(), _>("row 4 rejected")
        });
        mdc::remove("batch_id");

        let snap = exec.registry().get("batch").unwrap().snapshot();
        assert_eq!(snap.reason.as_deref(), Some("row 4 rejected"));
    }

    #[test]
    fn test_empty_error_message_is_unknown() {
        let exec = executor();
        let job = JobDescriptor::new("quiet", Duration::from_secs(5));

        exec.run(&job, || Err::<(), _>(String::new()));
        let snap = exec.registry().get("quiet").unwrap().snapshot();
        assert_eq!(snap.reason.as_deref(), Some(UNKNOWN_REASON));
    }

    #[test]
    fn test_panic_is_recorded() {
        let exec = executor();
        let job = JobDescriptor::new("crashy", Duration::from_secs(5));

        let value: Option<()> = exec.run(&job, || -> Result<(), String> { panic!("index out of range") });
        assert!(value.is_none());

        let snap = exec.registry().get("crashy").unwrap().snapshot();
        assert_eq!(snap.reason.as_deref(), Some("index out of range"));
        assert_eq!(CorrelationContext::depth(), 0);
    }

    #[test]
    fn test_overrun_degrades_successful_run() {
        let exec = executor();
        let job = JobDescriptor::new("slow", Duration::from_millis(10));

        let value = exec.run(&job, || {
            std::thread::sleep(Duration::from_millis(40));
            Ok::<_, String>("done")
        });
        assert_eq!(value, Some("done"));

        let snap = exec.registry().get("slow").unwrap().snapshot();
        assert_eq!(snap.status, HealthStatus::Degraded);
        assert_eq!(snap.reason.as_deref(), Some(MAX_EXECUTION_TIME_EXCEEDED));
    }

    #[test]
    fn test_overrun_replaces_failure_reason() {
        let exec = executor();
        let job = JobDescriptor::new("slow-and-broken", Duration::from_millis(10));

        exec.run(&job, || {
            std::thread::sleep(Duration::from_millis(40));
            Err::<(), _>("upstream 500")
        });

        let snap = exec.registry().get("slow-and-broken").unwrap().snapshot();
        assert_eq!(snap.reason.as_deref(), Some(MAX_EXECUTION_TIME_EXCEEDED));
    }

    #[test]
    fn test_each_run_gets_fresh_correlation_id() {
        let exec = executor();
        let job = JobDescriptor::new("ids", Duration::from_secs(5));

        let first = exec.run(&job, || Ok::<_, String>(CorrelationContext::current())).flatten();
        let second = exec.run(&job, || Ok::<_, String>(CorrelationContext::current())).flatten();

        assert!(first.is_some());
        assert!(second.is_some());
        assert_ne!(first, second);
        assert!(CorrelationContext::current().is_none());
    }

    #[test]
    fn test_run_inside_outer_scope_reuses_identifier() {
        let exec = executor();
        let job = JobDescriptor::new("nested", Duration::from_secs(5));

        let _outer = CorrelationScope::enter(Some("outer-id"));
        let seen = exec.run(&job, || Ok::<_, String>(CorrelationContext::current())).flatten();

        assert_eq!(seen.as_deref(), Some("outer-id"));
        assert_eq!(CorrelationContext::current().as_deref(), Some("outer-id"));
    }

    #[test]
    fn test_manual_unhealthy_inside_body_sticks() {
        let exec = executor();
        let job = JobDescriptor::new("self-managed", Duration::from_secs(5));
        let registry = exec.registry().clone();

        exec.run(&job, || {
            registry
                .get_or_create("self-managed")
                .mark_unhealthy(Some("partial batch"));
            Ok::<_, String>(())
        });

        let snap = exec.registry().get("self-managed").unwrap().snapshot();
        assert_eq!(snap.reason.as_deref(), Some("partial batch"));
    }

    #[test]
    fn test_success_clears_previous_failure() {
        let exec = executor();
        let job = JobDescriptor::new("Sync", Duration::from_secs(5));

        exec.run(&job, || Err::<(), _>("timeout talking to upstream"));
        let snap = exec.registry().get("Sync").unwrap().snapshot();
        assert_eq!(snap.status, HealthStatus::Degraded);
        assert_eq!(snap.reason.as_deref(), Some("timeout talking to upstream"));

        exec.run(&job, || Ok::<_, String>(()));
        let snap = exec.registry().get("Sync").unwrap().snapshot();
        assert_eq!(snap.status, HealthStatus::Healthy);
        assert!(snap.reason.is_none());
    }
}
