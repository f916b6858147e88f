//! RPM version ordering
//!
//! The version core is compared with rpmvercmp rules: alternating runs of
//! letters and digits, anything else is a separator. A trailing `rc`, `pre`,
//! `beta`, `alpha` or `dev` modifier is split off first and ranks the version
//! below the same core without modifier.

use std::cmp::Ordering;

use crate::version::error::VersionError;
use crate::version::schemes::{Modifier, cmp_modifiers, cmp_numeric, split_modifier};

#[derive(Debug, Clone)]
pub struct RpmVersion {
    core: String,
    modifier: Option<Modifier>,
}

impl RpmVersion {
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        if version.is_empty() {
            return Err(VersionError::InvalidVersion(version.to_string()));
        }
        let (core, modifier) = split_modifier(version);
        Ok(Self {
            core: core.to_string(),
            modifier,
        })
    }

    pub fn core(&self) -> &str {
        &self.core
    }

    pub fn modifier(&self) -> Option<&Modifier> {
        self.modifier.as_ref()
    }

    pub fn is_prerelease(&self) -> bool {
        self.modifier.is_some()
    }
}

impl Ord for RpmVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        rpmvercmp(&self.core, &other.core)
            .then_with(|| cmp_modifiers(self.modifier.as_ref(), other.modifier.as_ref()))
    }
}

impl PartialOrd for RpmVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RpmVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RpmVersion {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Numeric(&'a str),
    Alpha(&'a str),
}

/// Split into letter and digit runs, dropping separators
fn segments(version: &str) -> Vec<Segment<'_>> {
    let bytes = version.as_bytes();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        if bytes[i].is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            segments.push(Segment::Numeric(&version[start..i]));
        } else if bytes[i].is_ascii_alphabetic() {
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            segments.push(Segment::Alpha(&version[start..i]));
        } else {
            i += 1;
        }
    }

    segments
}

/// Compare two version cores field by field.
///
/// A numeric field beats an alphabetic one; when every shared field is equal
/// the side with more fields is newer.
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = match (l, r) {
            (Segment::Numeric(l), Segment::Numeric(r)) => cmp_numeric(l, r),
            (Segment::Alpha(l), Segment::Alpha(r)) => l.cmp(r),
            (Segment::Numeric(_), Segment::Alpha(_)) => Ordering::Greater,
            (Segment::Alpha(_), Segment::Numeric(_)) => Ordering::Less,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len())
}
