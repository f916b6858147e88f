use semver::Version;

use crate::version::error::VersionError;

/// Parse a normalized version string into a semver::Version.
///
/// Partial versions are padded with zeros before parsing:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3" -> Version(1, 2, 3)
///
/// Prefix stripping happens before this; a leading `v` here is an error.
pub fn parse(version: &str) -> Result<Version, VersionError> {
    let (release, suffix) = match version.find(['-', '+']) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };
    let normalized = match release.split('.').count() {
        1 => format!("{release}.0.0{suffix}"),
        2 => format!("{release}.0{suffix}"),
        _ => version.to_string(),
    };
    Version::parse(&normalized).map_err(|_| VersionError::InvalidVersion(version.to_string()))
}
