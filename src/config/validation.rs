//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Job names must be present and unique
//! - Intervals, budgets and leases must be non-zero
//! - Addresses must parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SentinelConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::SentinelConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("job #{0} has an empty name")]
    EmptyJobName(usize),

    #[error("job '{0}' is defined more than once")]
    DuplicateJobName(String),

    #[error("job '{0}' has a zero interval")]
    ZeroInterval(String),

    #[error("job '{0}' has a zero execution budget")]
    ZeroBudget(String),

    #[error("lock lease must be greater than zero")]
    ZeroLease,

    #[error("invalid {field} address '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &SentinelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, job) in config.jobs.iter().enumerate() {
        if job.name.trim().is_empty() {
            errors.push(ValidationError::EmptyJobName(index));
            continue;
        }
        if !seen.insert(job.name.as_str()) {
            errors.push(ValidationError::DuplicateJobName(job.name.clone()));
        }
        if job.interval_secs == 0 {
            errors.push(ValidationError::ZeroInterval(job.name.clone()));
        }
        if job.max_execution_secs == 0 {
            errors.push(ValidationError::ZeroBudget(job.name.clone()));
        }
    }

    if config.lock.enabled && config.lock.lease_secs == 0 {
        errors.push(ValidationError::ZeroLease);
    }

    if config.health.enabled && config.health.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "health.bind_address",
            value: config.health.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
