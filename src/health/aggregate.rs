//! Aggregate health across all registered jobs.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::health::record::HealthStatus;
use crate::health::registry::HealthRegistry;

/// Combined view consumed by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Reason per degraded job. Healthy jobs are not listed.
    pub details: BTreeMap<String, String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Healthy only if every record is healthy; otherwise degraded with the
/// reason of each degraded job keyed by name.
pub fn aggregate(registry: &HealthRegistry) -> HealthReport {
    let details: BTreeMap<String, String> = registry
        .iter_all()
        .into_iter()
        .filter_map(|(name, record)| {
            let snap = record.snapshot();
            match snap.status {
                HealthStatus::Healthy => None,
                HealthStatus::Degraded => Some((name, snap.reason.unwrap_or_default())),
            }
        })
        .collect();

    let status = if details.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    HealthReport { status, details }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_is_healthy() {
        let report = aggregate(&HealthRegistry::new());
        assert!(report.is_healthy());
        assert!(report.details.is_empty());
    }

    #[test]
    fn test_any_degraded_job_degrades_aggregate() {
        let registry = HealthRegistry::new();
        registry.get_or_create("ok");
        registry.get_or_create("sync").mark_unhealthy(Some("upstream down"));
        registry.get_or_create("export").mark_unhealthy(None);

        let report = aggregate(&registry);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.details.len(), 2);
        assert_eq!(report.details["sync"], "upstream down");
        assert_eq!(report.details["export"], "Unknown");
        assert!(!report.details.contains_key("ok"));
    }

    #[test]
    fn test_recovery_restores_aggregate() {
        let registry = HealthRegistry::new();
        let record = registry.get_or_create("sync");
        record.mark_unhealthy(Some("boom"));
        assert!(!aggregate(&registry).is_healthy());

        record.mark_healthy();
        assert!(aggregate(&registry).is_healthy());
    }
}
