//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the daemon.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::jobs::JobDescriptor;

/// Root configuration for job-sentinel.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SentinelConfig {
    /// Health endpoint settings.
    pub health: HealthEndpointConfig,

    /// Scheduled job definitions.
    pub jobs: Vec<JobConfig>,

    /// Job lock settings.
    pub lock: LockConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthEndpointConfig {
    /// Serve the HTTP health endpoint.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for HealthEndpointConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A scheduled job.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JobConfig {
    /// Unique job name, also the health registry key.
    pub name: String,

    /// Seconds between runs.
    pub interval_secs: u64,

    /// Time budget per run in seconds.
    pub max_execution_secs: u64,

    /// Delay before the first run in seconds.
    pub initial_delay_secs: u64,

    /// Disabled jobs are validated but never scheduled.
    pub enabled: bool,

    /// Program and arguments to run. Empty means a heartbeat job.
    pub command: Vec<String>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            interval_secs: 60,
            max_execution_secs: 30,
            initial_delay_secs: 0,
            enabled: true,
            command: Vec::new(),
        }
    }
}

impl JobConfig {
    pub fn descriptor(&self) -> JobDescriptor {
        JobDescriptor::new(self.name.clone(), Duration::from_secs(self.max_execution_secs))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

/// Job lock configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockConfig {
    /// Prevent overlapping runs of the same job.
    pub enabled: bool,

    /// Lease length in seconds; a crashed holder is taken over after this.
    pub lease_secs: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lease_secs: 600,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
