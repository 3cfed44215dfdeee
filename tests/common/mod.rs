//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use job_sentinel::health::HealthRegistry;
use job_sentinel::http::HealthServer;
use job_sentinel::jobs::{JobDescriptor, JobExecutor};
use job_sentinel::lifecycle::Shutdown;

/// Executor over a fresh registry.
#[allow(dead_code)]
pub fn executor() -> (Arc<HealthRegistry>, JobExecutor) {
    let registry = Arc::new(HealthRegistry::new());
    let executor = JobExecutor::new(registry.clone());
    (registry, executor)
}

/// Descriptor with a generous budget.
#[allow(dead_code)]
pub fn job(name: &str) -> JobDescriptor {
    JobDescriptor::new(name, Duration::from_secs(10))
}

/// Start a health server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_health_server(
    registry: Arc<HealthRegistry>,
    shutdown: &Shutdown,
) -> (SocketAddr, JoinHandle<Result<(), std::io::Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HealthServer::new(registry);
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });
    (addr, handle)
}
