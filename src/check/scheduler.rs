//! Batch scheduling of due projects over a bounded worker pool

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SubsecRound, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::check::checker::ReleaseChecker;
use crate::check::error::{CheckError, StoreError};
use crate::check::models::Run;
use crate::check::store::ProjectStore;
use crate::config::{DEFAULT_WORKERS, MonitorConfig};

/// Backends that refused requests, with the time they accept them again.
///
/// Every read and write happens under the one mutex and the guard never
/// outlives the method call, so it is never held across a backend request.
#[derive(Debug, Default)]
pub struct Blacklist {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking worker cannot leave the map half-written, so a poisoned
    // lock still holds usable data.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Expiry of the backend's entry if it is still in the future
    pub fn blocked_until(&self, backend: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lock()
            .get(backend)
            .copied()
            .filter(|until| *until > now)
    }

    /// Block `backend` until `until`, keeping a later existing expiry
    pub fn extend(&self, backend: &str, until: DateTime<Utc>) {
        let mut entries = self.lock();
        entries
            .entry(backend.to_string())
            .and_modify(|current| {
                if until > *current {
                    *current = until;
                }
            })
            .or_insert(until);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckOutcome {
    Success,
    Error,
    RateLimited,
}

#[derive(Debug, Default)]
struct RunSummary {
    success: usize,
    error: usize,
    ratelimit: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: CheckOutcome) {
        match outcome {
            CheckOutcome::Success => self.success += 1,
            CheckOutcome::Error => self.error += 1,
            CheckOutcome::RateLimited => self.ratelimit += 1,
        }
    }
}

/// Runs the release check of every due project
pub struct Scheduler<S: ProjectStore> {
    checker: Arc<ReleaseChecker<S>>,
    blacklist: Arc<Blacklist>,
    workers: usize,
}

impl<S: ProjectStore> Scheduler<S> {
    pub fn new(checker: Arc<ReleaseChecker<S>>) -> Self {
        Self {
            checker,
            blacklist: Arc::new(Blacklist::new()),
            workers: DEFAULT_WORKERS,
        }
    }

    /// Scheduler sized by the `scheduler` section of `config`
    pub fn from_config(checker: Arc<ReleaseChecker<S>>, config: &MonitorConfig) -> Self {
        Self::new(checker).with_workers(config.scheduler.workers)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Size of the worker pool, at least one
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Share a blacklist across schedulers, or keep one across batches
    pub fn with_blacklist(mut self, blacklist: Arc<Blacklist>) -> Self {
        self.blacklist = blacklist;
        self
    }

    pub fn blacklist(&self) -> &Arc<Blacklist> {
        &self.blacklist
    }

    /// Check every project due at batch start and record the run.
    ///
    /// The due list is read once. Each project is saved by its own worker,
    /// so one failing project never rolls back another.
    pub async fn run_batch(&self) -> Result<Run, StoreError> {
        let store = self.checker.store();
        // Runs are stored with millisecond precision
        let started_at = Utc::now().trunc_subsecs(3);
        let project_ids = store.due_project_ids(started_at)?;
        let total = project_ids.len();
        let run_id = store.start_run(started_at, total)?;

        info!(
            "Starting run {} with {} due projects on {} workers",
            run_id, total, self.workers
        );

        let outcomes: Vec<CheckOutcome> = stream::iter(project_ids)
            .map(|project_id| {
                let checker = Arc::clone(&self.checker);
                let blacklist = Arc::clone(&self.blacklist);
                tokio::spawn(async move { check_one(&checker, &blacklist, project_id).await })
            })
            .buffer_unordered(self.workers)
            .map(|joined| {
                joined
                    .inspect_err(|e| error!("Check task failed: {}", e))
                    .unwrap_or(CheckOutcome::Error)
            })
            .collect()
            .await;

        let mut summary = RunSummary::default();
        for outcome in outcomes {
            summary.record(outcome);
        }

        let run = Run {
            id: run_id,
            started_at,
            finished_at: Some(Utc::now().trunc_subsecs(3)),
            total,
            success: summary.success,
            error: summary.error,
            ratelimit: summary.ratelimit,
        };
        store.finish_run(&run)?;

        info!(
            "Finished run {}: {} succeeded, {} failed, {} rate limited",
            run.id, run.success, run.error, run.ratelimit
        );

        Ok(run)
    }
}

async fn check_one<S: ProjectStore>(
    checker: &ReleaseChecker<S>,
    blacklist: &Blacklist,
    project_id: i64,
) -> CheckOutcome {
    let project = match checker.store().get_project(project_id) {
        Ok(project) => project,
        Err(e) => {
            error!("Failed to load project {}: {}", project_id, e);
            return CheckOutcome::Error;
        }
    };

    if let Some(until) = blacklist.blocked_until(&project.backend, Utc::now()) {
        info!(
            "Skipping {}/{}: backend blacklisted until {}",
            project.backend, project.name, until
        );
        if let Err(e) = checker.store().reschedule(project.id, until) {
            error!(
                "Failed to reschedule {}/{}: {}",
                project.backend, project.name, e
            );
        }
        return CheckOutcome::RateLimited;
    }

    match checker.check_project(project, false).await {
        Ok(report) => {
            debug!(
                "Checked project {}: {} new versions",
                report.project_id,
                report.new_versions.len()
            );
            CheckOutcome::Success
        }
        Err(CheckError::RateLimited {
            backend,
            reset_time,
        }) => {
            warn!("Blacklisting backend {} until {}", backend, reset_time);
            blacklist.extend(&backend, reset_time);
            CheckOutcome::RateLimited
        }
        Err(e) => {
            error!("Failed to check project {}: {}", project_id, e);
            CheckOutcome::Error
        }
    }
}
