//! Backend trait for fetching upstream versions of a project

use std::collections::HashMap;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::check::error::BackendError;
use crate::check::models::Project;
use crate::version::scheme::{SchemeRegistry, VersionScheme};

/// Payload accepted from backends: a bare version or an object with a commit link
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum UpstreamPayload {
    Plain(String),
    Detailed {
        version: String,
        #[serde(default)]
        commit_url: Option<String>,
    },
}

/// One version observed upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UpstreamPayload")]
pub struct UpstreamVersion {
    pub version: String,
    pub commit_url: Option<String>,
}

impl UpstreamVersion {
    pub fn new(version: &str, commit_url: Option<&str>) -> Self {
        Self {
            version: version.to_string(),
            commit_url: commit_url.map(str::to_string),
        }
    }
}

impl From<UpstreamPayload> for UpstreamVersion {
    fn from(payload: UpstreamPayload) -> Self {
        match payload {
            UpstreamPayload::Plain(version) => Self {
                version,
                commit_url: None,
            },
            UpstreamPayload::Detailed {
                version,
                commit_url,
            } => Self {
                version,
                commit_url,
            },
        }
    }
}

impl From<&str> for UpstreamVersion {
    fn from(version: &str) -> Self {
        Self::new(version, None)
    }
}

/// Trait for fetching the versions a project has published upstream
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Name projects use to select this backend; also the blacklist key
    fn name(&self) -> &'static str;

    /// Scheme used when neither the project nor its ecosystem chooses one
    fn default_version_scheme(&self) -> Option<VersionScheme> {
        None
    }

    /// Fetches every version currently listed upstream
    ///
    /// # Returns
    /// * `Ok(Vec<UpstreamVersion>)` - Versions in upstream order
    /// * `Err(BackendError::RateLimited)` - The source refuses requests until `reset_time`
    /// * `Err(BackendError::Plugin)` - Any other failure
    async fn get_versions(&self, project: &Project) -> Result<Vec<UpstreamVersion>, BackendError>;
}

/// Backends available to the checker, keyed by name
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        self.backends.insert(backend.name().to_string(), backend);
    }

    pub fn with(mut self, backend: Arc<dyn Backend>) -> Self {
        self.register(backend);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Backend>> {
        self.backends.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Feed every backend's own default scheme into `schemes`
    pub fn register_scheme_defaults(&self, schemes: &mut SchemeRegistry) {
        for (name, backend) in &self.backends {
            if let Some(scheme) = backend.default_version_scheme() {
                schemes.register_backend_default(name, scheme);
            }
        }
    }
}
