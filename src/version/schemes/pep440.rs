//! PEP 440 versions via pep440_rs

use std::str::FromStr;

use pep508_rs::pep440_rs::Version;
use tracing::debug;

use crate::version::error::VersionError;

pub fn parse(version: &str) -> Result<Version, VersionError> {
    Version::from_str(version).map_err(|e| {
        debug!("Failed to parse PEP 440 version '{}': {}", version, e);
        VersionError::InvalidVersion(version.to_string())
    })
}

/// Alpha, beta, release candidate and dev releases count as pre-releases
pub fn is_prerelease(version: &Version) -> bool {
    version.is_pre() || version.is_dev()
}
