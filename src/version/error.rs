use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version: {0:?}")]
    InvalidVersion(String),

    #[error("Version {version:?} does not match pattern {pattern:?}: {reason}")]
    Pattern {
        pattern: String,
        version: String,
        reason: String,
    },

    #[error("Unknown version scheme: {0}")]
    UnknownScheme(String),
}

impl VersionError {
    pub(crate) fn pattern(pattern: &str, version: &str, reason: impl Into<String>) -> Self {
        VersionError::Pattern {
            pattern: pattern.to_string(),
            version: version.to_string(),
            reason: reason.into(),
        }
    }
}
