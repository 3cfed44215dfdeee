//! Named health record directory.
//!
//! # Responsibilities
//! - Hand out exactly one [`HealthRecord`] per job name
//! - Create records on first reference, atomically
//! - Provide a point-in-time listing for aggregation

use dashmap::DashMap;
use std::sync::Arc;

use crate::health::record::HealthRecord;

/// Concurrent job-name → health record map.
///
/// Entries are never removed; the set of job names is fixed at deployment.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    entries: DashMap<String, Arc<HealthRecord>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record for `name`, inserting a fresh one if missing.
    ///
    /// Concurrent callers with the same name always observe the same record.
    pub fn get_or_create(&self, name: &str) -> Arc<HealthRecord> {
        if let Some(existing) = self.entries.get(name) {
            return existing.value().clone();
        }

        self.entries
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(job = %name, "Registering health record");
                Arc::new(HealthRecord::new())
            })
            .value()
            .clone()
    }

    /// Non-creating lookup.
    pub fn get(&self, name: &str) -> Option<Arc<HealthRecord>> {
        self.entries.get(name).map(|r| r.value().clone())
    }

    /// Copy of all (name, record) pairs, sorted by name.
    ///
    /// Records added after the copy is taken are not included.
    pub fn iter_all(&self) -> Vec<(String, Arc<HealthRecord>)> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn names(&self) -> Vec<String> {
        self.iter_all().into_iter().map(|(name, _)| name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
