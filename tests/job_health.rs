//! End-to-end behavior of job runs and the health they leave behind.

use std::sync::{Arc, Barrier};
use std::time::Duration;

use job_sentinel::context::CorrelationContext;
use job_sentinel::health::{aggregate, HealthRegistry, HealthStatus};
use job_sentinel::jobs::{JobDescriptor, JobError, MAX_EXECUTION_TIME_EXCEEDED};

mod common;

#[test]
fn test_sync_job_fails_then_recovers() {
    let (registry, executor) = common::executor();
    let sync = common::job("Sync");

    let result: Option<()> = executor.run(&sync, || {
        Err(JobError::Failed("timeout talking to upstream".into()))
    });
    assert!(result.is_none());

    let snap = registry.get("Sync").unwrap().snapshot();
    assert_eq!(snap.status, HealthStatus::Degraded);
    assert_eq!(snap.reason.as_deref(), Some("timeout talking to upstream"));

    let report = aggregate(&registry);
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.details["Sync"], "timeout talking to upstream");

    executor.run(&sync, || Ok::<_, JobError>(()));

    let snap = registry.get("Sync").unwrap().snapshot();
    assert_eq!(snap.status, HealthStatus::Healthy);
    assert!(snap.reason.is_none());
    assert!(aggregate(&registry).is_healthy());
}

#[test]
fn test_budget_overrun_after_success() {
    let (registry, executor) = common::executor();
    let job = JobDescriptor::new("slow-export", Duration::from_millis(20));

    let value = executor.run(&job, || {
        std::thread::sleep(Duration::from_millis(60));
        Ok::<_, JobError>(7)
    });
    assert_eq!(value, Some(7));

    let snap = registry.get("slow-export").unwrap().snapshot();
    assert_eq!(snap.status, HealthStatus::Degraded);
    assert_eq!(snap.reason.as_deref(), Some(MAX_EXECUTION_TIME_EXCEEDED));
}

#[test]
fn test_error_without_message_is_unknown() {
    let (registry, executor) = common::executor();
    executor.run(&common::job("mute"), || Err::<(), _>(JobError::Failed(String::new())));

    let snap = registry.get("mute").unwrap().snapshot();
    assert_eq!(snap.reason.as_deref(), Some("Unknown"));
}

#[test]
fn test_health_is_readable_mid_run() {
    let (registry, executor) = common::executor();
    let started = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));

    // Leave a stale failure from a previous run.
    registry.get_or_create("long").mark_unhealthy(Some("previous failure"));

    let worker = {
        let started = started.clone();
        let release = release.clone();
        std::thread::spawn(move || {
            executor.run(&common::job("long"), || {
                started.wait();
                release.wait();
                Ok::<_, JobError>(())
            })
        })
    };

    started.wait();
    let record = registry.get("long").unwrap();
    // Mid-run the previous status is still reported, but the error slate is clean.
    assert_eq!(record.snapshot().reason.as_deref(), Some("previous failure"));
    assert!(!record.has_outstanding_error());
    release.wait();

    worker.join().unwrap();
    assert_eq!(record.snapshot().status, HealthStatus::Healthy);
}

#[test]
fn test_manual_override_through_registry() {
    let registry = HealthRegistry::new();
    registry.get_or_create("importer").mark_unhealthy(Some("3 rows rejected"));
    assert_eq!(
        aggregate(&registry).details.get("importer").map(String::as_str),
        Some("3 rows rejected")
    );

    registry.get_or_create("importer").mark_healthy();
    assert!(aggregate(&registry).is_healthy());
}

#[test]
fn test_parallel_runs_of_distinct_jobs() {
    let (registry, executor) = common::executor();
    let executor = Arc::new(executor);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let executor = executor.clone();
            std::thread::spawn(move || {
                let job = common::job(&format!("job-{}", i));
                let id = executor
                    .run(&job, || {
                        if i % 2 == 0 {
                            Ok(CorrelationContext::current())
                        } else {
                            Err(JobError::Failed(format!("job {} failed", i)))
                        }
                    })
                    .flatten();
                assert!(CorrelationContext::current().is_none());
                id
            })
        })
        .collect();

    let ids: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .flatten()
        .collect();
    assert_eq!(ids.len(), 4);

    let report = aggregate(&registry);
    assert_eq!(registry.len(), 8);
    assert_eq!(report.details.len(), 4);
    assert_eq!(report.details["job-3"], "job 3 failed");
}
