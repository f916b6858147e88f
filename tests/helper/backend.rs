//! Backend and store test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use release_watch::check::backend::{Backend, BackendRegistry, UpstreamVersion};
use release_watch::check::checker::ReleaseChecker;
use release_watch::check::error::{BackendError, NotifyError};
use release_watch::check::models::Project;
use release_watch::check::notify::{Notifier, VersionUpdate};
use release_watch::check::store::Store;
use release_watch::version::scheme::{SchemeRegistry, VersionScheme};

/// In-memory backend answering per project name and recording every call
pub struct FakeBackend {
    name: &'static str,
    default_scheme: Option<VersionScheme>,
    responses: HashMap<String, Result<Vec<UpstreamVersion>, BackendError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            default_scheme: None,
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_scheme(mut self, scheme: VersionScheme) -> Self {
        self.default_scheme = Some(scheme);
        self
    }

    pub fn with_versions(mut self, project: &str, versions: &[&str]) -> Self {
        self.responses.insert(
            project.to_string(),
            Ok(versions.iter().map(|v| UpstreamVersion::from(*v)).collect()),
        );
        self
    }

    pub fn with_error(mut self, project: &str, error: BackendError) -> Self {
        self.responses.insert(project.to_string(), Err(error));
        self
    }

    /// Project names requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn default_version_scheme(&self) -> Option<VersionScheme> {
        self.default_scheme
    }

    async fn get_versions(&self, project: &Project) -> Result<Vec<UpstreamVersion>, BackendError> {
        self.calls.lock().unwrap().push(project.name.clone());
        self.responses
            .get(&project.name)
            .cloned()
            .unwrap_or_else(|| Err(BackendError::Plugin(format!("no versions for {}", project.name))))
    }
}

/// Notifier keeping every published update
#[derive(Default)]
pub struct RecordingNotifier {
    updates: Mutex<Vec<VersionUpdate>>,
}

impl RecordingNotifier {
    pub fn updates(&self) -> Vec<VersionUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, update: &VersionUpdate) -> Result<(), NotifyError> {
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}

/// Create a test store with projects and their stored versions
pub fn create_test_store(projects: &[(Project, Vec<&str>)]) -> (TempDir, Arc<Store>, Vec<i64>) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::new(&temp_dir.path().join("test.db")).unwrap();

    let ids = projects
        .iter()
        .map(|(project, versions)| {
            let id = store.insert_project(project).unwrap();
            let versions: Vec<UpstreamVersion> =
                versions.iter().map(|v| UpstreamVersion::from(*v)).collect();
            store.insert_versions(id, &versions, Utc::now()).unwrap();
            id
        })
        .collect();

    (temp_dir, Arc::new(store), ids)
}

pub fn project(name: &str, backend: &str) -> Project {
    Project::new(name, &format!("https://example.org/{name}"), backend)
}

pub fn create_test_checker(
    store: Arc<Store>,
    backends: Vec<Arc<FakeBackend>>,
    notifier: Arc<RecordingNotifier>,
) -> ReleaseChecker<Store> {
    let registry = backends
        .into_iter()
        .fold(BackendRegistry::new(), |registry, backend| registry.with(backend));
    ReleaseChecker::new(store, registry, SchemeRegistry::new(VersionScheme::Rpm), notifier)
}
