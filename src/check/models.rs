//! Persisted records shared with the surrounding application

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::version::scheme::VersionScheme;
use crate::version::{VersionOptions, split_list};

/// A tracked upstream project with its polling settings and check state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub homepage: String,
    /// Name of the backend used to fetch upstream versions
    pub backend: String,
    pub ecosystem: Option<String>,
    /// Backend-specific location of the project (repository, feed, ...)
    pub version_url: Option<String>,
    pub regex: Option<String>,
    pub insecure: bool,
    pub releases_only: bool,
    pub version_scheme: Option<VersionScheme>,
    /// `;` separated prefixes stripped before parsing
    pub version_prefix: Option<String>,
    pub version_pattern: Option<String>,
    /// `;` separated substrings that mark a version as pre-release
    pub pre_release_filter: Option<String>,
    /// `;` separated substrings that drop an upstream version entirely
    pub version_filter: Option<String>,
    pub latest_version: Option<String>,
    pub last_check: Option<DateTime<Utc>>,
    pub next_check: Option<DateTime<Utc>>,
    /// Consecutive failed checks, rate limits excluded
    pub error_counter: i64,
    /// `None` until the first check
    pub check_successful: Option<bool>,
    pub archived: bool,
    /// Outcome message of the last check
    pub logs: Option<String>,
}

impl Project {
    pub fn new(name: &str, homepage: &str, backend: &str) -> Self {
        Self {
            name: name.to_string(),
            homepage: homepage.to_string(),
            backend: backend.to_string(),
            ..Self::default()
        }
    }

    pub fn version_options(&self) -> VersionOptions {
        VersionOptions::new()
            .with_prefix(self.version_prefix.as_deref())
            .with_pattern(self.version_pattern.as_deref())
            .with_pre_release_filter(self.pre_release_filter.as_deref())
    }

    /// Whether an upstream version is dropped by the project's version filter
    pub fn is_filtered_out(&self, version: &str) -> bool {
        split_list(self.version_filter.as_deref())
            .iter()
            .any(|filter| version.contains(filter.as_str()))
    }
}

/// One raw version string observed upstream for a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectVersion {
    pub project_id: i64,
    pub version: String,
    pub created_on: DateTime<Utc>,
    pub commit_url: Option<String>,
}

/// Downstream package of a project in a distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMapping {
    pub distro: String,
    pub package_name: String,
}

/// Aggregate counts of one scheduler batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total: usize,
    pub success: usize,
    pub error: usize,
    pub ratelimit: usize,
}
