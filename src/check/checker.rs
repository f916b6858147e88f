//! Release check of a single project

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::check::backend::{BackendRegistry, UpstreamVersion};
use crate::check::error::{BackendError, CheckError, StoreError};
use crate::check::models::{Project, ProjectVersion};
use crate::check::notify::{Notifier, ProjectRef, VersionUpdate};
use crate::check::store::ProjectStore;
use crate::config::{DEFAULT_CHECK_INTERVAL_SECS, VERSION_MAX_LEN};
use crate::version::scheme::{SchemeRegistry, VersionScheme};
use crate::version::{Version, VersionOptions, max_version, sort_descending};

const LOG_RETRIEVED: &str = "Version retrieved correctly";
const LOG_NO_NEW_VERSION: &str = "No new version found";

/// Outcome of one successful check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub project_id: i64,
    /// Upstream versions not seen before this check
    pub new_versions: Vec<UpstreamVersion>,
    pub old_version: Option<String>,
    pub latest_version: Option<String>,
    /// Whether the latest version moved
    pub changed: bool,
}

/// Build the ordering objects for a project's stored history
pub fn project_versions(
    scheme: VersionScheme,
    options: &VersionOptions,
    stored: &[ProjectVersion],
) -> Vec<Version> {
    stored
        .iter()
        .map(|stored| {
            Version::new(scheme, stored.version.as_str(), options)
                .with_created_on(Some(stored.created_on))
                .with_commit_url(stored.commit_url.clone())
        })
        .collect()
}

/// Checks projects against their backend and records what changed
pub struct ReleaseChecker<S: ProjectStore> {
    store: Arc<S>,
    backends: BackendRegistry,
    schemes: SchemeRegistry,
    notifier: Arc<dyn Notifier>,
    check_interval: Duration,
}

impl<S: ProjectStore> ReleaseChecker<S> {
    /// Backend defaults are merged into `schemes`; explicitly configured ones win.
    pub fn new(
        store: Arc<S>,
        backends: BackendRegistry,
        mut schemes: SchemeRegistry,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        backends.register_scheme_defaults(&mut schemes);
        Self {
            store,
            backends,
            schemes,
            notifier,
            check_interval: Duration::seconds(DEFAULT_CHECK_INTERVAL_SECS),
        }
    }

    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Scheme used to order the versions of `project`
    pub fn scheme_for(&self, project: &Project) -> VersionScheme {
        self.schemes.resolve(
            project.version_scheme,
            project.ecosystem.as_deref(),
            &project.backend,
        )
    }

    /// Known versions of a project, newest first
    pub fn sorted_versions(&self, project: &Project) -> Result<Vec<Version>, StoreError> {
        let stored = self.store.get_versions(project.id)?;
        let versions = project_versions(
            self.scheme_for(project),
            &project.version_options(),
            &stored,
        );
        Ok(sort_descending(versions))
    }

    /// [`ReleaseChecker::sorted_versions`] without pre-releases
    pub fn stable_versions(&self, project: &Project) -> Result<Vec<Version>, StoreError> {
        Ok(self
            .sorted_versions(project)?
            .into_iter()
            .filter(|version| !version.prerelease())
            .collect())
    }

    /// Load a project and check it
    pub async fn check(&self, project_id: i64, dry_run: bool) -> Result<CheckReport, CheckError> {
        let project = self.store.get_project(project_id)?;
        self.check_project(project, dry_run).await
    }

    /// Fetch upstream versions of `project` and persist the outcome.
    ///
    /// A dry run computes the same report but writes and publishes nothing.
    pub async fn check_project(
        &self,
        mut project: Project,
        dry_run: bool,
    ) -> Result<CheckReport, CheckError> {
        let now = Utc::now();
        let scheme = self.scheme_for(&project);

        let Some(backend) = self.backends.get(&project.backend).cloned() else {
            let err = CheckError::UnknownBackend(project.backend.clone());
            self.record_failure(&mut project, err.to_string(), now, dry_run);
            return Err(err);
        };

        debug!(
            "Checking {}/{} with scheme {}",
            project.backend, project.name, scheme
        );

        let upstream = match backend.get_versions(&project).await {
            Ok(upstream) => upstream,
            Err(BackendError::RateLimited { reset_time }) => {
                warn!(
                    "Rate limited while checking {}/{} until {}",
                    project.backend, project.name, reset_time
                );
                project.check_successful = Some(false);
                project.last_check = Some(now);
                project.next_check = Some(reset_time);
                project.logs = Some(format!("Rate limited until {reset_time}"));
                self.save_failed_check(&project, now, dry_run);
                return Err(CheckError::RateLimited {
                    backend: project.backend,
                    reset_time,
                });
            }
            Err(BackendError::Plugin(message)) => {
                error!(
                    "Failed to fetch versions for {}/{}: {}",
                    project.backend, project.name, message
                );
                self.record_failure(&mut project, message.clone(), now, dry_run);
                return Err(CheckError::Backend {
                    backend: project.backend,
                    message,
                });
            }
        };

        let stored = self.store.get_versions(project.id)?;
        let new_versions = self.new_versions(&project, &stored, upstream);

        let options = project.version_options();
        let mut versions = project_versions(scheme, &options, &stored);
        versions.extend(new_versions.iter().map(|upstream| {
            Version::new(scheme, upstream.version.as_str(), &options)
                .with_created_on(Some(now))
                .with_commit_url(upstream.commit_url.clone())
        }));

        let old_version = project.latest_version.clone();
        let latest = max_version(&versions).map(Version::parse);
        let changed = latest
            .as_deref()
            .is_some_and(|latest| old_version.as_deref() != Some(latest));

        if changed {
            project.latest_version = latest;
        }
        project.check_successful = Some(true);
        project.error_counter = 0;
        project.last_check = Some(now);
        project.next_check = Some(now + self.check_interval);
        project.logs = Some(
            if new_versions.is_empty() {
                LOG_NO_NEW_VERSION
            } else {
                LOG_RETRIEVED
            }
            .to_string(),
        );

        if !dry_run {
            self.store.save_check(&project, &new_versions, now)?;
            info!(
                "Saved {} new versions for {}/{}",
                new_versions.len(),
                project.backend,
                project.name
            );

            if changed {
                self.notify(&project, old_version.clone(), &new_versions, versions);
            }
        }

        Ok(CheckReport {
            project_id: project.id,
            new_versions,
            old_version,
            latest_version: project.latest_version,
            changed,
        })
    }

    /// Upstream versions worth storing: non-empty, within the storage width,
    /// not filtered, not stored yet, first occurrence only
    fn new_versions(
        &self,
        project: &Project,
        stored: &[ProjectVersion],
        upstream: Vec<UpstreamVersion>,
    ) -> Vec<UpstreamVersion> {
        let known: HashSet<&str> = stored.iter().map(|v| v.version.as_str()).collect();
        let mut seen = HashSet::new();

        upstream
            .into_iter()
            .filter(|candidate| {
                let raw = candidate.version.as_str();
                if raw.trim().is_empty() {
                    return false;
                }
                if raw.chars().count() > VERSION_MAX_LEN {
                    warn!(
                        "Skipping oversized version of {}/{}: {}",
                        project.backend, project.name, raw
                    );
                    return false;
                }
                if project.is_filtered_out(raw) {
                    debug!("Filtered out {} of {}", raw, project.name);
                    return false;
                }
                !known.contains(raw) && seen.insert(raw.to_string())
            })
            .collect()
    }

    fn record_failure(
        &self,
        project: &mut Project,
        message: String,
        now: DateTime<Utc>,
        dry_run: bool,
    ) {
        project.check_successful = Some(false);
        project.error_counter += 1;
        project.last_check = Some(now);
        project.next_check = Some(now + self.check_interval);
        project.logs = Some(message);
        self.save_failed_check(project, now, dry_run);
    }

    /// The backend outcome must reach the caller, so a failed save is only logged
    fn save_failed_check(&self, project: &Project, now: DateTime<Utc>, dry_run: bool) {
        if dry_run {
            return;
        }
        if let Err(e) = self.store.save_check(project, &[], now) {
            error!(
                "Failed to save check state of {}/{}: {}",
                project.backend, project.name, e
            );
        }
    }

    fn notify(
        &self,
        project: &Project,
        old_version: Option<String>,
        new_versions: &[UpstreamVersion],
        versions: Vec<Version>,
    ) {
        let Some(new_version) = project.latest_version.clone() else {
            return;
        };

        let packages = self
            .store
            .get_packages(project.id)
            .inspect_err(|e| error!("Failed to load packages of {}: {}", project.name, e))
            .unwrap_or_default();

        let sorted = sort_descending(versions);
        let stable_versions = sorted
            .iter()
            .filter(|version| !version.prerelease())
            .map(Version::parse)
            .collect();

        let update = VersionUpdate {
            project: ProjectRef::from(project),
            old_version,
            new_version,
            upstream_versions: new_versions.iter().map(|v| v.version.clone()).collect(),
            packages,
            versions: sorted.iter().map(Version::parse).collect(),
            stable_versions,
        };

        if let Err(e) = self.notifier.publish(&update) {
            error!(
                "Failed to publish update of {}/{}: {}",
                project.backend, project.name, e
            );
        }
    }
}
