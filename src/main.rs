//! job-sentinel daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        JOB SENTINEL                           │
//!   │                                                               │
//!   │  ┌──────────┐   ┌────────┐   ┌──────────────────────────┐     │
//!   │  │ trigger  │──▶│  lock  │──▶│        executor          │     │
//!   │  │ interval │   │ lease  │   │ correlation + budget     │     │
//!   │  └──────────┘   └────────┘   └────────────┬─────────────┘     │
//!   │                                            │                  │
//!   │                                            ▼                  │
//!   │                                   ┌─────────────────┐         │
//!   │   GET /health  ◀──────────────────│ health registry │         │
//!   │   (axum)                          └─────────────────┘         │
//!   │                                                               │
//!   │  Cross-cutting: config · logging · metrics · lifecycle        │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use job_sentinel::config::{load_config, SentinelConfig};
use job_sentinel::health::HealthRegistry;
use job_sentinel::http::HealthServer;
use job_sentinel::jobs::{command, InProcessLock, JobExecutor, JobLock, NoopLock, ScheduledJob, Scheduler};
use job_sentinel::lifecycle::{signals, Shutdown};
use job_sentinel::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "job-sentinel")]
#[command(about = "Runs scheduled jobs and reports their health", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "JOB_SENTINEL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => SentinelConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "job-sentinel starting");
    tracing::info!(
        jobs = config.jobs.len(),
        health_bind = %config.health.bind_address,
        lock_enabled = config.lock.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = Arc::new(HealthRegistry::new());
    let executor = Arc::new(JobExecutor::new(registry.clone()));
    let lock: Arc<dyn JobLock> = if config.lock.enabled {
        Arc::new(InProcessLock::new())
    } else {
        Arc::new(NoopLock)
    };

    let mut scheduler = Scheduler::new(executor, lock, Duration::from_secs(config.lock.lease_secs));
    for job in config.jobs.iter().filter(|j| j.enabled) {
        scheduler.register(ScheduledJob {
            descriptor: job.descriptor(),
            interval: job.interval(),
            initial_delay: job.initial_delay(),
            body: command::body_for(job),
        })?;
    }

    let shutdown = Shutdown::new();
    let triggers = scheduler.start(&shutdown);

    let server = if config.health.enabled {
        let listener = TcpListener::bind(&config.health.bind_address).await?;
        let server = HealthServer::new(registry.clone());
        let rx = shutdown.subscribe();
        Some(tokio::spawn(async move { server.run(listener, rx).await }))
    } else {
        None
    };

    signals::shutdown_on_signal(&shutdown).await;

    for handle in triggers {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Trigger loop ended abnormally");
        }
    }
    if let Some(handle) = server {
        handle.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
