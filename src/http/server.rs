//! HTTP server setup and handlers.
//!
//! # Responsibilities
//! - Create Axum Router with the health handlers
//! - Wire up middleware (request ID, tracing)
//! - Map job health to endpoint status: UP → 200, RESTRICTED → 503
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - Handler bodies are synchronous, so each runs inside a
//!   `CorrelationScope` keyed by the request id. The scope is never held
//!   across an `.await`; it is not `Send` and is bound to one thread

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::context::{mdc, CorrelationScope};
use crate::health::{aggregate, HealthRegistry, HealthSnapshot, HealthStatus};
use crate::lifecycle::ShutdownSignal;

/// Header carrying the request correlation identifier.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<HealthRegistry>,
}

/// Aggregate health response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub details: BTreeMap<String, String>,
}

/// Single job health response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobHealthResponse {
    pub name: String,
    pub status: String,
    pub reason: Option<String>,
}

impl JobHealthResponse {
    fn from_snapshot(name: String, snap: HealthSnapshot) -> Self {
        Self {
            name,
            status: snap.status.as_endpoint_str().to_string(),
            reason: snap.reason,
        }
    }
}

fn status_code(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Run `f` inside a correlation scope carrying the request's id.
///
/// `SetRequestIdLayer` runs first, so the header is normally present; a
/// missing or unreadable one gets a fresh identifier.
fn with_request_scope<R>(headers: &HeaderMap, f: impl FnOnce() -> R) -> R {
    let request_id = headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok());
    let _scope = CorrelationScope::enter(request_id);
    f()
}

/// Build the health router over `registry`.
pub fn router(registry: Arc<HealthRegistry>) -> Router {
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .route("/health", get(get_health))
        .route("/health/jobs/{name}", get(get_job_health))
        .route("/jobs", get(list_jobs))
        .with_state(AppState { registry })
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let correlation_id = req
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        correlation_id = %correlation_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}

/// HTTP server exposing job health.
pub struct HealthServer {
    router: Router,
}

impl HealthServer {
    pub fn new(registry: Arc<HealthRegistry>) -> Self {
        Self {
            router: router(registry),
        }
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Health endpoint listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!("Health endpoint stopped");
        Ok(())
    }
}

async fn get_health(State(state): State<AppState>, headers: HeaderMap) -> Response {
    with_request_scope(&headers, || health_response(&state.registry))
}

fn health_response(registry: &HealthRegistry) -> Response {
    let report = aggregate(registry);
    if !report.is_healthy() {
        tracing::debug!(
            degraded = report.details.len(),
            diagnostics = ?mdc::snapshot(),
            "Reporting restricted health"
        );
    }
    let body = HealthResponse {
        status: report.status.as_endpoint_str().to_string(),
        details: report.details,
    };
    (status_code(report.status), Json(body)).into_response()
}

async fn get_job_health(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    with_request_scope(&headers, || job_health_response(&state.registry, name))
}

fn job_health_response(registry: &HealthRegistry, name: String) -> Response {
    match registry.get(&name) {
        Some(record) => {
            let snap = record.snapshot();
            let code = status_code(snap.status);
            (code, Json(JobHealthResponse::from_snapshot(name, snap))).into_response()
        }
        None => {
            tracing::debug!(job = %name, diagnostics = ?mdc::snapshot(), "Unknown job requested");
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": format!("unknown job: {}", name) })),
            )
                .into_response()
        }
    }
}

async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobHealthResponse>> {
    let jobs = state
        .registry
        .iter_all()
        .into_iter()
        .map(|(name, record)| JobHealthResponse::from_snapshot(name, record.snapshot()))
        .collect();
    Json(jobs)
}
