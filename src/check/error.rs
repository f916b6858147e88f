use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Project not found: {0}")]
    ProjectNotFound(i64),
}

/// Failure reported by a backend while fetching upstream versions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Rate limited until {reset_time}")]
    RateLimited { reset_time: DateTime<Utc> },

    #[error("{0}")]
    Plugin(String),
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Backend {backend} rate limited until {reset_time}")]
    RateLimited {
        backend: String,
        reset_time: DateTime<Utc>,
    },

    #[error("Backend {backend} failed: {message}")]
    Backend { backend: String, message: String },

    #[error("No backend registered with name {0}")]
    UnknownBackend(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);
