//! Fixed-interval job trigger.
//!
//! # Responsibilities
//! - Fire each registered job on its own interval
//! - Skip a tick while the job's lock is held elsewhere
//! - Run bodies on the blocking pool so each run owns one OS thread
//! - Stop all loops on the shutdown signal

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::jobs::descriptor::JobDescriptor;
use crate::jobs::error::JobError;
use crate::jobs::executor::JobExecutor;
use crate::jobs::lock::JobLock;
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::observability::metrics;

/// A job body as the trigger sees it.
pub type JobBody = Arc<dyn Fn() -> Result<(), JobError> + Send + Sync>;

/// A job plus its schedule.
#[derive(Clone)]
pub struct ScheduledJob {
    pub descriptor: JobDescriptor,
    pub interval: Duration,
    pub initial_delay: Duration,
    pub body: JobBody,
}

impl std::fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("descriptor", &self.descriptor)
            .field("interval", &self.interval)
            .field("initial_delay", &self.initial_delay)
            .finish_non_exhaustive()
    }
}

/// Owns the registered jobs and drives them through the executor.
#[derive(Clone)]
pub struct Scheduler {
    executor: Arc<JobExecutor>,
    lock: Arc<dyn JobLock>,
    lease: Duration,
    jobs: Vec<Arc<ScheduledJob>>,
}

impl Scheduler {
    pub fn new(executor: Arc<JobExecutor>, lock: Arc<dyn JobLock>, lease: Duration) -> Self {
        Self {
            executor,
            lock,
            lease,
            jobs: Vec::new(),
        }
    }

    /// Register a job. Its health record is created immediately so the
    /// health endpoint lists it before the first run.
    ///
    /// A zero interval is rejected; the trigger loop could never tick it.
    pub fn register(&mut self, job: ScheduledJob) -> Result<(), JobError> {
        if job.interval.is_zero() {
            return Err(JobError::InvalidSchedule {
                job: job.descriptor.name,
                reason: "interval must be greater than zero",
            });
        }
        self.executor.registry().get_or_create(&job.descriptor.name);
        tracing::info!(
            job = %job.descriptor.name,
            interval_secs = job.interval.as_secs_f64(),
            budget_secs = job.descriptor.max_execution_time.as_secs_f64(),
            "Job registered"
        );
        self.jobs.push(Arc::new(job));
        Ok(())
    }

    pub fn jobs(&self) -> impl Iterator<Item = &ScheduledJob> {
        self.jobs.iter().map(|j| j.as_ref())
    }

    /// Spawn one trigger loop per job. Loops exit when `shutdown` fires.
    pub fn start(&self, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        self.jobs
            .iter()
            .map(|job| {
                let this = self.clone();
                let job = job.clone();
                let shutdown = shutdown.subscribe();
                tokio::spawn(async move { this.run_loop(job, shutdown).await })
            })
            .collect()
    }

    /// Fire the named job once, outside its schedule.
    ///
    /// Returns `Ok(false)` when the lock was held and the run was skipped.
    pub async fn run_once(&self, name: &str) -> Result<bool, JobError> {
        let job = self
            .jobs
            .iter()
            .find(|j| j.descriptor.name == name)
            .cloned()
            .ok_or_else(|| JobError::UnknownJob(name.to_string()))?;
        Ok(self.fire(&job).await)
    }

    async fn run_loop(&self, job: Arc<ScheduledJob>, mut shutdown: ShutdownSignal) {
        if !job.initial_delay.is_zero() {
            tokio::select! {
                _ = time::sleep(job.initial_delay) => {}
                _ = shutdown.recv() => return,
            }
        }

        let mut ticker = time::interval(job.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.fire(&job).await;
                }
                _ = shutdown.recv() => {
                    tracing::info!(job = %job.descriptor.name, "Trigger loop received shutdown signal, exiting");
                    break;
                }
            }
        }
    }

    async fn fire(&self, job: &Arc<ScheduledJob>) -> bool {
        let name = &job.descriptor.name;
        let lease = match self.lock.try_acquire(name, self.lease) {
            Some(lease) => lease,
            None => {
                tracing::debug!(job = %name, "Job lock held, skipping run");
                metrics::record_skipped(name);
                return false;
            }
        };

        let executor = self.executor.clone();
        let job = job.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _lease = lease;
            let body = job.body.clone();
            executor.run(&job.descriptor, move || body());
        });

        if let Err(e) = handle.await {
            tracing::error!(job = %name, error = %e, "Job task did not complete");
        }
        true
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("lease", &self.lease)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}
