//! Notification of version changes

#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use tracing::info;

use crate::check::error::NotifyError;
use crate::check::models::{PackageMapping, Project};

/// Identity of the project a notification is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    pub id: i64,
    pub name: String,
    pub homepage: String,
    pub backend: String,
    pub ecosystem: Option<String>,
}

impl From<&Project> for ProjectRef {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            homepage: project.homepage.clone(),
            backend: project.backend.clone(),
            ecosystem: project.ecosystem.clone(),
        }
    }
}

/// Event emitted when the latest version of a project changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionUpdate {
    pub project: ProjectRef,
    pub old_version: Option<String>,
    pub new_version: String,
    /// Versions first seen during this check
    pub upstream_versions: Vec<String>,
    pub packages: Vec<PackageMapping>,
    /// Every known version, newest first
    pub versions: Vec<String>,
    /// [`VersionUpdate::versions`] without pre-releases
    pub stable_versions: Vec<String>,
}

/// Sink for version change events
#[cfg_attr(test, automock)]
pub trait Notifier: Send + Sync {
    fn publish(&self, update: &VersionUpdate) -> Result<(), NotifyError>;
}

/// Emits updates as structured log records
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn publish(&self, update: &VersionUpdate) -> Result<(), NotifyError> {
        let payload =
            serde_json::to_string(update).map_err(|e| NotifyError(e.to_string()))?;
        info!(
            target: "release_watch::notify",
            project = %update.project.name,
            old_version = update.old_version.as_deref().unwrap_or(""),
            new_version = %update.new_version,
            payload = %payload,
            "Project version updated"
        );
        Ok(())
    }
}
