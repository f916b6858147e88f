//! Scheme-specific parsing and ordering
//!
//! Every scheme turns the normalized version string into a structured value
//! that is totally ordered. [`ParsedVersion`] dispatches between them.

pub mod calendar;
pub mod pep440;
pub mod rpm;
pub mod semantic;

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::version::Version;
use crate::version::error::VersionError;
use crate::version::scheme::VersionScheme;

pub use calendar::CalendarVersion;
pub use rpm::RpmVersion;

/// Trailing pre-release marker: optional dot, tag, optional number
static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)(?:\.?(rc|pre|beta|alpha|dev)([0-9]*))$").unwrap()
});

/// Pre-release modifier such as `rc1` or `beta`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    /// Lowercased tag text
    pub tag: String,
    /// Digits following the tag, if any
    pub number: Option<String>,
}

impl Modifier {
    pub fn new(tag: &str, number: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            number: (!number.is_empty()).then(|| number.to_string()),
        }
    }
}

impl Ord for Modifier {
    /// Tags compare as plain text, so `dev` sorts between `beta` and `pre`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.tag.cmp(&other.tag).then_with(|| match (&self.number, &other.number) {
            (Some(a), Some(b)) => cmp_numeric(a, b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        })
    }
}

impl PartialOrd for Modifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A release without modifier outranks any pre-release of the same core
pub fn cmp_modifiers(a: Option<&Modifier>, b: Option<&Modifier>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

/// Split a trailing pre-release modifier off a normalized version.
///
/// Returns the version core and the modifier, if any.
pub fn split_modifier(version: &str) -> (&str, Option<Modifier>) {
    let Some(caps) = MODIFIER_RE.captures(version) else {
        return (version, None);
    };
    let core = caps.get(1).map_or("", |m| m.as_str());
    let tag = caps.get(2).map_or("", |m| m.as_str());
    let number = caps.get(3).map_or("", |m| m.as_str());
    (core, Some(Modifier::new(tag, number)))
}

/// Whether the normalized version ends with a recognized pre-release marker
pub fn has_prerelease_marker(version: &str) -> bool {
    MODIFIER_RE.is_match(version)
}

/// Compare two ASCII digit runs as unbounded integers
pub fn cmp_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Structured form of a version under one scheme
#[derive(Debug, Clone)]
pub enum ParsedVersion {
    Rpm(RpmVersion),
    Semantic(semver::Version),
    Calendar(CalendarVersion),
    Pep440(pep508_rs::pep440_rs::Version),
    Date(DateTime<Utc>),
    Generic(String),
}

impl ParsedVersion {
    /// Parse `version` with the grammar of `scheme`.
    ///
    /// The prefixes, pattern and timestamp of `version` are used even when
    /// `scheme` is not the version's own scheme.
    pub fn parse(scheme: VersionScheme, version: &Version) -> Result<Self, VersionError> {
        if version.raw().trim().is_empty() {
            return Err(VersionError::InvalidVersion(version.raw().to_string()));
        }
        let normalized = version.parse();

        match scheme {
            VersionScheme::Rpm => RpmVersion::parse(&normalized).map(ParsedVersion::Rpm),
            VersionScheme::Semantic => semantic::parse(&normalized).map(ParsedVersion::Semantic),
            VersionScheme::Calendar => {
                CalendarVersion::parse(version.options().pattern(), &normalized)
                    .map(ParsedVersion::Calendar)
            }
            VersionScheme::Pep440 => pep440::parse(&normalized).map(ParsedVersion::Pep440),
            VersionScheme::Date => version
                .created_on()
                .map(ParsedVersion::Date)
                .ok_or_else(|| VersionError::InvalidVersion(version.raw().to_string())),
            VersionScheme::Generic => Ok(ParsedVersion::Generic(normalized)),
        }
    }

    pub fn is_prerelease(&self) -> bool {
        match self {
            ParsedVersion::Rpm(v) => v.is_prerelease(),
            ParsedVersion::Semantic(v) => !v.pre.is_empty(),
            ParsedVersion::Calendar(v) => v.is_prerelease(),
            ParsedVersion::Pep440(v) => pep440::is_prerelease(v),
            ParsedVersion::Date(_) => false,
            ParsedVersion::Generic(v) => has_prerelease_marker(v),
        }
    }

    pub fn is_postrelease(&self) -> bool {
        match self {
            ParsedVersion::Pep440(v) => v.is_post(),
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ParsedVersion::Rpm(_) => 0,
            ParsedVersion::Semantic(_) => 1,
            ParsedVersion::Calendar(_) => 2,
            ParsedVersion::Pep440(_) => 3,
            ParsedVersion::Date(_) => 4,
            ParsedVersion::Generic(_) => 5,
        }
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParsedVersion::Rpm(a), ParsedVersion::Rpm(b)) => a.cmp(b),
            (ParsedVersion::Semantic(a), ParsedVersion::Semantic(b)) => a.cmp(b),
            (ParsedVersion::Calendar(a), ParsedVersion::Calendar(b)) => a.cmp(b),
            (ParsedVersion::Pep440(a), ParsedVersion::Pep440(b)) => a.cmp(b),
            (ParsedVersion::Date(a), ParsedVersion::Date(b)) => a.cmp(b),
            (ParsedVersion::Generic(a), ParsedVersion::Generic(b)) => a.cmp(b),
            // Never produced by Version::compare, which parses both sides with one scheme
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParsedVersion {}
