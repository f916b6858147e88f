//! Version scheme identifiers and the scheme registry
//!
//! Schemes are compiled in; the registry only decides which one applies to a
//! project. Resolution order: project override, ecosystem default, backend
//! default, global default.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::version::error::VersionError;

/// Strategy used to parse and order the version strings of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionScheme {
    /// rpmvercmp field comparison with a trailing pre-release modifier
    #[default]
    Rpm,
    /// Semantic versioning (https://semver.org)
    Semantic,
    /// Calendar versioning driven by the project's version pattern
    Calendar,
    /// Python PEP 440 versions
    Pep440,
    /// Chronological order of the time a version was first seen
    Date,
    /// Plain string order of the normalized version
    Generic,
}

impl VersionScheme {
    pub const ALL: [VersionScheme; 6] = [
        VersionScheme::Rpm,
        VersionScheme::Semantic,
        VersionScheme::Calendar,
        VersionScheme::Pep440,
        VersionScheme::Date,
        VersionScheme::Generic,
    ];

    /// Returns the identifier stored in the database and used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionScheme::Rpm => "RPM",
            VersionScheme::Semantic => "Semantic",
            VersionScheme::Calendar => "Calendar",
            VersionScheme::Pep440 => "PEP 440",
            VersionScheme::Date => "Date",
            VersionScheme::Generic => "Generic",
        }
    }
}

impl fmt::Display for VersionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionScheme {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpm" => Ok(VersionScheme::Rpm),
            "semantic" | "semver" => Ok(VersionScheme::Semantic),
            "calendar" | "calver" => Ok(VersionScheme::Calendar),
            "pep 440" | "pep440" => Ok(VersionScheme::Pep440),
            "date" => Ok(VersionScheme::Date),
            "generic" => Ok(VersionScheme::Generic),
            _ => Err(VersionError::UnknownScheme(s.to_string())),
        }
    }
}

impl TryFrom<String> for VersionScheme {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionScheme> for String {
    fn from(scheme: VersionScheme) -> Self {
        scheme.as_str().to_string()
    }
}

/// Maps ecosystems and backends to their default version scheme
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemeRegistry {
    global_default: VersionScheme,
    ecosystems: HashMap<String, VersionScheme>,
    backends: HashMap<String, VersionScheme>,
}

impl SchemeRegistry {
    pub fn new(global_default: VersionScheme) -> Self {
        Self {
            global_default,
            ecosystems: HashMap::new(),
            backends: HashMap::new(),
        }
    }

    pub fn with_ecosystem(mut self, ecosystem: &str, scheme: VersionScheme) -> Self {
        self.ecosystems.insert(ecosystem.to_string(), scheme);
        self
    }

    pub fn with_backend(mut self, backend: &str, scheme: VersionScheme) -> Self {
        self.backends.insert(backend.to_string(), scheme);
        self
    }

    /// Record the default a backend declares for itself.
    ///
    /// A default configured explicitly for the same backend is kept.
    pub fn register_backend_default(&mut self, backend: &str, scheme: VersionScheme) {
        self.backends.entry(backend.to_string()).or_insert(scheme);
    }

    pub fn global_default(&self) -> VersionScheme {
        self.global_default
    }

    pub fn resolve(
        &self,
        project_scheme: Option<VersionScheme>,
        ecosystem: Option<&str>,
        backend: &str,
    ) -> VersionScheme {
        project_scheme
            .or_else(|| ecosystem.and_then(|name| self.ecosystems.get(name).copied()))
            .or_else(|| self.backends.get(backend).copied())
            .unwrap_or(self.global_default)
    }
}
