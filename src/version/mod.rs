//! Version representation layer
//!
//! A [`Version`] wraps one raw upstream version string together with the
//! project settings needed to read it (prefixes, calendar pattern,
//! pre-release filters). It is never stored; it is rebuilt from the raw
//! string whenever an ordering is needed, so changing a project's prefix or
//! pattern reorders its whole history.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │   Version   │────▶│ VersionScheme│────▶│  ParsedVersion   │
//! │ (raw+opts)  │     │ (strategy)  │     │ (rpm, calver, ..)│
//! └─────────────┘     └─────────────┘     └──────────────────┘
//!                            ▲
//!                     ┌─────────────┐
//!                     │SchemeRegistry│
//!                     │ (defaults)  │
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`scheme`]: Scheme identifiers and default resolution
//! - [`schemes`]: Scheme-specific grammars (RPM, semantic, calendar, PEP 440)
//! - [`error`]: Parse and pattern errors

pub mod error;
pub mod scheme;
pub mod schemes;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::version::error::VersionError;
use crate::version::scheme::VersionScheme;
use crate::version::schemes::{ParsedVersion, has_prerelease_marker};

/// Split a semicolon-delimited setting into its non-empty entries
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Per-project settings that influence how a version string is read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionOptions {
    prefixes: Vec<String>,
    pattern: Option<String>,
    pre_release_filters: Vec<String>,
}

impl VersionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefixes from a `;` separated list.
    ///
    /// Longer prefixes are tried first so `release-v` wins over `release-`.
    pub fn with_prefix(mut self, prefix: Option<&str>) -> Self {
        self.prefixes = split_list(prefix);
        self.prefixes.sort_by(|a, b| b.len().cmp(&a.len()));
        self
    }

    pub fn with_pattern(mut self, pattern: Option<&str>) -> Self {
        self.pattern = pattern.filter(|p| !p.is_empty()).map(str::to_string);
        self
    }

    pub fn with_pre_release_filter(mut self, filter: Option<&str>) -> Self {
        self.pre_release_filters = split_list(filter);
        self
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn pre_release_filters(&self) -> &[String] {
        &self.pre_release_filters
    }
}

/// One upstream version, readable under a version scheme
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    scheme: VersionScheme,
    options: VersionOptions,
    created_on: Option<DateTime<Utc>>,
    commit_url: Option<String>,
}

impl Version {
    pub fn new(scheme: VersionScheme, raw: impl Into<String>, options: &VersionOptions) -> Self {
        Self {
            raw: raw.into(),
            scheme,
            options: options.clone(),
            created_on: None,
            commit_url: None,
        }
    }

    pub fn with_created_on(mut self, created_on: Option<DateTime<Utc>>) -> Self {
        self.created_on = created_on;
        self
    }

    pub fn with_commit_url(mut self, commit_url: Option<String>) -> Self {
        self.commit_url = commit_url;
        self
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> VersionScheme {
        self.scheme
    }

    pub fn options(&self) -> &VersionOptions {
        &self.options
    }

    pub fn created_on(&self) -> Option<DateTime<Utc>> {
        self.created_on
    }

    pub fn commit_url(&self) -> Option<&str> {
        self.commit_url.as_deref()
    }

    /// Another version with the same scheme and settings
    pub fn coerce(&self, raw: impl Into<String>) -> Version {
        Version::new(self.scheme, raw, &self.options)
    }

    /// Normalized version string.
    ///
    /// Strips the first (longest) matching prefix, then a bare `v` directly
    /// followed by a digit. Text without either comes back trimmed but
    /// otherwise unchanged.
    pub fn parse(&self) -> String {
        let mut version = self.raw.trim();

        if let Some(stripped) = self
            .options
            .prefixes
            .iter()
            .find_map(|prefix| version.strip_prefix(prefix.as_str()))
        {
            version = stripped.trim();
        }

        if let Some(rest) = version.strip_prefix('v') {
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                version = rest;
            }
        }

        version.to_string()
    }

    /// Structured form under this version's scheme
    pub fn parsed(&self) -> Result<ParsedVersion, VersionError> {
        ParsedVersion::parse(self.scheme, self)
    }

    /// Whether any configured pre-release filter occurs in the raw string
    pub fn matches_pre_release_filter(&self) -> bool {
        self.options
            .pre_release_filters
            .iter()
            .any(|filter| self.raw.contains(filter.as_str()))
    }

    pub fn prerelease(&self) -> bool {
        if self.matches_pre_release_filter() {
            return true;
        }
        match self.parsed() {
            Ok(parsed) => parsed.is_prerelease(),
            Err(_) => has_prerelease_marker(&self.parse()),
        }
    }

    pub fn postrelease(&self) -> bool {
        self.parsed().is_ok_and(|parsed| parsed.is_postrelease())
    }

    /// Order `self` against `other` using this version's scheme.
    ///
    /// Unparsable versions sort below parsable ones; two unparsable versions
    /// fall back to comparing their raw strings.
    pub fn compare(&self, other: &Version) -> Ordering {
        let left = self.parsed();
        let right = ParsedVersion::parse(self.scheme, other);

        match (left, right) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => self.raw.cmp(&other.raw),
        }
    }

    /// Whether this version is strictly greater than every one of `others`
    pub fn newer(&self, others: &[Version]) -> bool {
        others
            .iter()
            .all(|other| self.compare(other) == Ordering::Greater)
    }

    /// [`Version::newer`] for raw strings read with this version's settings
    pub fn newer_than_raw<S: AsRef<str>>(&self, others: &[S]) -> bool {
        others
            .iter()
            .all(|other| self.compare(&self.coerce(other.as_ref())) == Ordering::Greater)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// Sort versions newest first.
///
/// Insertion by `partition_point` keeps working for orders that skip missing
/// fields, where a comparison sort may reject the comparator.
pub fn sort_descending(versions: Vec<Version>) -> Vec<Version> {
    let mut sorted: Vec<Version> = Vec::with_capacity(versions.len());
    for version in versions {
        let idx = sorted.partition_point(|probe| probe.compare(&version) != Ordering::Less);
        sorted.insert(idx, version);
    }
    sorted
}

/// Greatest version of `versions`, if any
pub fn max_version<'a, I>(versions: I) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    versions.into_iter().fold(None, |max, version| match max {
        Some(current) if version.compare(current) != Ordering::Greater => Some(current),
        _ => Some(version),
    })
}
