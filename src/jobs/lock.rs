//! Mutual exclusion for job runs.
//!
//! The trigger asks a [`JobLock`] before every run so that two runs of the
//! same job never overlap. A cluster deployment plugs in a lock backed by a
//! shared database; [`InProcessLock`] covers a single process.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Grants exclusive, time-limited leases keyed by job name.
pub trait JobLock: Send + Sync {
    /// Try to take the lease for `name`. Returns `None` while another holder
    /// has an unexpired lease.
    fn try_acquire(&self, name: &str, lease: Duration) -> Option<LockLease>;
}

/// A held lease. Released when dropped.
pub struct LockLease {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LockLease {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A lease with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl fmt::Debug for LockLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockLease")
            .field("attached", &self.release.is_some())
            .finish()
    }
}

impl Drop for LockLease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Held {
    token: u64,
    expires_at: Instant,
}

/// Lease table local to this process.
#[derive(Debug, Default)]
pub struct InProcessLock {
    held: Arc<DashMap<String, Held>>,
    next_token: AtomicU64,
}

impl InProcessLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` currently has an unexpired lease.
    pub fn is_held(&self, name: &str) -> bool {
        self.held
            .get(name)
            .map(|h| h.expires_at > Instant::now())
            .unwrap_or(false)
    }
}

impl JobLock for InProcessLock {
    fn try_acquire(&self, name: &str, lease: Duration) -> Option<LockLease> {
        let now = Instant::now();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let held = Held {
            token,
            expires_at: now + lease,
        };

        match self.held.entry(name.to_string()) {
            Entry::Occupied(mut e) => {
                if e.get().expires_at > now {
                    return None;
                }
                tracing::warn!(job = %name, "Taking over expired job lease");
                e.insert(held);
            }
            Entry::Vacant(e) => {
                e.insert(held);
            }
        }

        let table = self.held.clone();
        let name = name.to_string();
        Some(LockLease::new(move || {
            // A newer holder may have taken over after expiry; leave its entry alone.
            table.remove_if(&name, |_, h| h.token == token);
        }))
    }
}

/// Always grants. Used when locking is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLock;

impl JobLock for NoopLock {
    fn try_acquire(&self, _name: &str, _lease: Duration) -> Option<LockLease> {
        Some(LockLease::detached())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_until_released() {
        let lock = InProcessLock::new();
        let lease = lock.try_acquire("sync", Duration::from_secs(60)).unwrap();

        assert!(lock.is_held("sync"));
        assert!(lock.try_acquire("sync", Duration::from_secs(60)).is_none());
        // Other names are independent.
        assert!(lock.try_acquire("export", Duration::from_secs(60)).is_some());

        drop(lease);
        assert!(!lock.is_held("sync"));
        assert!(lock.try_acquire("sync", Duration::from_secs(60)).is_some());
    }

    #[test]
    fn test_expired_lease_can_be_taken_over() {
        let lock = InProcessLock::new();
        let stale = lock.try_acquire("sync", Duration::from_millis(5)).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let fresh = lock.try_acquire("sync", Duration::from_secs(60)).unwrap();
        // Releasing the stale lease must not free the new holder's entry.
        drop(stale);
        assert!(lock.is_held("sync"));

        drop(fresh);
        assert!(!lock.is_held("sync"));
    }

    #[test]
    fn test_noop_lock_always_grants() {
        let lock = NoopLock;
        let _a = lock.try_acquire("x", Duration::from_secs(1)).unwrap();
        assert!(lock.try_acquire("x", Duration::from_secs(1)).is_some());
    }
}
