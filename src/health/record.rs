//! Per-job health state.
//!
//! # States
//! - Healthy: last run succeeded within its time budget
//! - Degraded: last run failed or overran, with a reason attached
//!
//! # State Transitions
//! ```text
//! Healthy  → Degraded: mark_unhealthy(reason)
//! Degraded → Healthy:  mark_healthy(), or mark_healthy_unless_outstanding()
//!                      when no error was recorded since the last reset
//! Degraded → Degraded: mark_unhealthy(newer reason), last write wins
//! ```
//!
//! # Design Decisions
//! - Whole state lives behind one `ArcSwap`, so readers always see a
//!   consistent (status, reason) pair without taking a lock
//! - Mutations are compare-and-swap loops (`rcu`), linearizable per record

use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::Arc;

/// Reason recorded when a failure carries no usable message.
pub const UNKNOWN_REASON: &str = "Unknown";

/// Externally visible health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl HealthStatus {
    /// Status string reported by the health endpoint.
    pub fn as_endpoint_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "UP",
            HealthStatus::Degraded => "RESTRICTED",
        }
    }
}

/// Point-in-time view of a [`HealthRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct State {
    unhealthy: bool,
    outstanding_error: bool,
    reason: Option<Arc<str>>,
}

/// Mutable health state for one named job.
#[derive(Debug)]
pub struct HealthRecord {
    state: ArcSwap<State>,
}

impl HealthRecord {
    /// A new record starts healthy with no outstanding error.
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(State::default()),
        }
    }

    /// Mark healthy, clearing the reason and the outstanding error flag.
    pub fn mark_healthy(&self) {
        self.state.store(Arc::new(State::default()));
    }

    /// Mark degraded with `reason`, or [`UNKNOWN_REASON`] when absent or blank.
    pub fn mark_unhealthy(&self, reason: Option<&str>) {
        let reason: Arc<str> = match reason {
            Some(r) if !r.trim().is_empty() => Arc::from(r),
            _ => Arc::from(UNKNOWN_REASON),
        };
        self.state.store(Arc::new(State {
            unhealthy: true,
            outstanding_error: true,
            reason: Some(reason),
        }));
    }

    /// Clear only the outstanding error flag; status and reason are kept.
    pub fn reset_outstanding_error(&self) {
        self.state.rcu(|current| {
            let mut next = State::clone(current);
            next.outstanding_error = false;
            next
        });
    }

    /// Mark healthy unless an error was recorded since the last reset.
    ///
    /// The check and the update are one compare-and-swap, so an error
    /// recorded concurrently is never overwritten. Returns whether the
    /// record ended up healthy.
    pub fn mark_healthy_unless_outstanding(&self) -> bool {
        let previous = self.state.rcu(|current| {
            if current.outstanding_error {
                Arc::clone(current)
            } else {
                Arc::new(State::default())
            }
        });
        !previous.outstanding_error
    }

    /// Whether an error was recorded since the last reset.
    pub fn has_outstanding_error(&self) -> bool {
        self.state.load().outstanding_error
    }

    pub fn is_healthy(&self) -> bool {
        !self.state.load().unhealthy
    }

    /// Read the current status and reason. Never blocks.
    pub fn snapshot(&self) -> HealthSnapshot {
        let state = self.state.load();
        if state.unhealthy {
            HealthSnapshot {
                status: HealthStatus::Degraded,
                reason: state.reason.as_deref().map(str::to_string),
            }
        } else {
            HealthSnapshot {
                status: HealthStatus::Healthy,
                reason: None,
            }
        }
    }
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self::new()
    }
}
