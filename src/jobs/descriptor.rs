//! Job identity and time budget.

use std::time::Duration;

/// What the executor needs to know about a job besides its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    /// Stable identity, used as the health registry key.
    pub name: String,
    /// Runs longer than this are reported as degraded.
    pub max_execution_time: Duration,
}

impl JobDescriptor {
    pub fn new(name: impl Into<String>, max_execution_time: Duration) -> Self {
        Self {
            name: name.into(),
            max_execution_time,
        }
    }
}
