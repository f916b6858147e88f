use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, named_params};
use tracing::{debug, info, warn};

use crate::check::backend::UpstreamVersion;
use crate::check::error::StoreError;
use crate::check::models::{PackageMapping, Project, ProjectVersion, Run};
use crate::config::VERSION_MAX_LEN;
use crate::version::scheme::VersionScheme;

/// Trait for loading projects and persisting check results
#[cfg_attr(test, automock)]
pub trait ProjectStore: Send + Sync + 'static {
    fn get_project(&self, project_id: i64) -> Result<Project, StoreError>;

    /// Ids of non-archived projects whose next check is at or before `now`
    fn due_project_ids(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError>;

    /// Stored version history of a project
    fn get_versions(&self, project_id: i64) -> Result<Vec<ProjectVersion>, StoreError>;

    fn get_packages(&self, project_id: i64) -> Result<Vec<PackageMapping>, StoreError>;

    /// Persist the check state of `project` and its new versions in one transaction
    fn save_check(
        &self,
        project: &Project,
        new_versions: &[UpstreamVersion],
        created_on: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Move the next check of a project without touching anything else
    fn reschedule(&self, project_id: i64, next_check: DateTime<Utc>) -> Result<(), StoreError>;

    /// Record the start of a batch and return the run id
    fn start_run(&self, started_at: DateTime<Utc>, total: usize) -> Result<i64, StoreError>;

    fn finish_run(&self, run: &Run) -> Result<(), StoreError>;
}

fn to_ms(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

fn from_ms(idx: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

fn opt_from_ms(idx: usize, ms: Option<i64>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    ms.map(|ms| from_ms(idx, ms)).transpose()
}

const PROJECT_COLUMNS: &str = r#"
    id, name, homepage, backend, ecosystem, version_url, regex, insecure, releases_only,
    version_scheme, version_prefix, version_pattern, pre_release_filter, version_filter,
    latest_version, last_check, next_check, error_counter, check_successful, archived, logs
"#;

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let version_scheme: Option<String> = row.get("version_scheme")?;
    let version_scheme = version_scheme.and_then(|scheme| {
        scheme
            .parse::<VersionScheme>()
            .inspect_err(|e| warn!("Ignoring stored version scheme: {}", e))
            .ok()
    });

    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        homepage: row.get("homepage")?,
        backend: row.get("backend")?,
        ecosystem: row.get("ecosystem")?,
        version_url: row.get("version_url")?,
        regex: row.get("regex")?,
        insecure: row.get("insecure")?,
        releases_only: row.get("releases_only")?,
        version_scheme,
        version_prefix: row.get("version_prefix")?,
        version_pattern: row.get("version_pattern")?,
        pre_release_filter: row.get("pre_release_filter")?,
        version_filter: row.get("version_filter")?,
        latest_version: row.get("latest_version")?,
        last_check: opt_from_ms(15, row.get("last_check")?)?,
        next_check: opt_from_ms(16, row.get("next_check")?)?,
        error_counter: row.get("error_counter")?,
        check_successful: row.get("check_successful")?,
        archived: row.get("archived")?,
        logs: row.get("logs")?,
    })
}

fn count_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<usize> {
    let count: i64 = row.get(idx)?;
    usize::try_from(count).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, count))
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<Run> {
    Ok(Run {
        id: row.get(0)?,
        started_at: from_ms(1, row.get(1)?)?,
        finished_at: opt_from_ms(2, row.get(2)?)?,
        total: count_from_row(row, 3)?,
        success: count_from_row(row, 4)?,
        error: count_from_row(row, 5)?,
        ratelimit: count_from_row(row, 6)?,
    })
}

/// SQLite-backed project and version history store
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Opening project database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        debug!("Database connection established");

        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Project database initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                homepage TEXT NOT NULL,
                backend TEXT NOT NULL,
                ecosystem TEXT,
                version_url TEXT,
                regex TEXT,
                insecure INTEGER NOT NULL DEFAULT 0,
                releases_only INTEGER NOT NULL DEFAULT 0,
                version_scheme TEXT,
                version_prefix TEXT,
                version_pattern TEXT,
                pre_release_filter TEXT,
                version_filter TEXT,
                latest_version TEXT,
                last_check INTEGER,
                next_check INTEGER,
                error_counter INTEGER NOT NULL DEFAULT 0,
                check_successful INTEGER,
                archived INTEGER NOT NULL DEFAULT 0,
                logs TEXT,
                UNIQUE(name, homepage)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_next_check ON projects(next_check)",
            [],
        )?;

        conn.execute(
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS project_versions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    project_id INTEGER NOT NULL,
                    version TEXT NOT NULL CHECK (length(version) <= {VERSION_MAX_LEN}),
                    created_on INTEGER NOT NULL,
                    commit_url TEXT,
                    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
                    UNIQUE(project_id, version)
                )
                "#
            ),
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_project_id ON project_versions(project_id)",
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                distro TEXT NOT NULL,
                package_name TEXT NOT NULL,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
                UNIQUE(project_id, distro)
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at INTEGER NOT NULL,
                finished_at INTEGER,
                total INTEGER NOT NULL DEFAULT 0,
                success INTEGER NOT NULL DEFAULT 0,
                error INTEGER NOT NULL DEFAULT 0,
                ratelimit INTEGER NOT NULL DEFAULT 0
            )
            "#,
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }

    pub fn insert_project(&self, project: &Project) -> Result<i64, StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO projects (
                name, homepage, backend, ecosystem, version_url, regex, insecure, releases_only,
                version_scheme, version_prefix, version_pattern, pre_release_filter, version_filter,
                latest_version, last_check, next_check, error_counter, check_successful, archived, logs
            ) VALUES (
                :name, :homepage, :backend, :ecosystem, :version_url, :regex, :insecure, :releases_only,
                :version_scheme, :version_prefix, :version_pattern, :pre_release_filter, :version_filter,
                :latest_version, :last_check, :next_check, :error_counter, :check_successful, :archived, :logs
            )
            "#,
            named_params! {
                ":name": project.name,
                ":homepage": project.homepage,
                ":backend": project.backend,
                ":ecosystem": project.ecosystem,
                ":version_url": project.version_url,
                ":regex": project.regex,
                ":insecure": project.insecure,
                ":releases_only": project.releases_only,
                ":version_scheme": project.version_scheme.map(|s| s.as_str()),
                ":version_prefix": project.version_prefix,
                ":version_pattern": project.version_pattern,
                ":pre_release_filter": project.pre_release_filter,
                ":version_filter": project.version_filter,
                ":latest_version": project.latest_version,
                ":last_check": project.last_check.map(to_ms),
                ":next_check": project.next_check.map(to_ms),
                ":error_counter": project.error_counter,
                ":check_successful": project.check_successful,
                ":archived": project.archived,
                ":logs": project.logs,
            },
        )?;
        let id = conn.last_insert_rowid();
        debug!("Inserted project {} with id {}", project.name, id);
        Ok(id)
    }

    pub fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, StoreError> {
        let conn = self.lock_conn()?;
        let project = conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE name = ?1 ORDER BY id LIMIT 1"),
                [name],
                project_from_row,
            )
            .optional()?;
        Ok(project)
    }

    pub fn add_package(&self, project_id: i64, package: &PackageMapping) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO packages (project_id, distro, package_name) VALUES (?1, ?2, ?3)
            ON CONFLICT(project_id, distro) DO UPDATE SET package_name = excluded.package_name
            "#,
            (project_id, &package.distro, &package.package_name),
        )?;
        Ok(())
    }

    /// Add versions to a project's history, skipping ones already stored
    pub fn insert_versions(
        &self,
        project_id: i64,
        versions: &[UpstreamVersion],
        created_on: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        Self::insert_versions_tx(&tx, project_id, versions, created_on)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_versions_tx(
        tx: &Transaction<'_>,
        project_id: i64,
        versions: &[UpstreamVersion],
        created_on: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // Only the uniqueness conflict is skipped; the length CHECK still fails the insert
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO project_versions (project_id, version, created_on, commit_url)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(project_id, version) DO NOTHING
            "#,
        )?;
        for version in versions {
            stmt.execute((
                project_id,
                &version.version,
                to_ms(created_on),
                &version.commit_url,
            ))?;
        }
        Ok(())
    }

    /// Most recent runs first
    pub fn list_runs(&self, limit: usize) -> Result<Vec<Run>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, started_at, finished_at, total, success, error, ratelimit FROM runs ORDER BY id DESC LIMIT ?1",
        )?;
        let runs = stmt
            .query_map([limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}

impl ProjectStore for Store {
    fn get_project(&self, project_id: i64) -> Result<Project, StoreError> {
        let conn = self.lock_conn()?;
        conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            [project_id],
            project_from_row,
        )
        .optional()?
        .ok_or(StoreError::ProjectNotFound(project_id))
    }

    fn due_project_ids(&self, now: DateTime<Utc>) -> Result<Vec<i64>, StoreError> {
        let conn = self.lock_conn()?;
        // Never-checked projects have no next_check and are due immediately
        let mut stmt = conn.prepare(
            r#"
            SELECT id FROM projects
            WHERE archived = 0 AND (next_check IS NULL OR next_check <= ?1)
            ORDER BY next_check, id
            "#,
        )?;

        let ids = stmt
            .query_map([to_ms(now)], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        Ok(ids)
    }

    fn get_versions(&self, project_id: i64) -> Result<Vec<ProjectVersion>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT project_id, version, created_on, commit_url FROM project_versions
            WHERE project_id = ?1
            ORDER BY id
            "#,
        )?;

        let versions = stmt
            .query_map([project_id], |row| {
                Ok(ProjectVersion {
                    project_id: row.get(0)?,
                    version: row.get(1)?,
                    created_on: from_ms(2, row.get(2)?)?,
                    commit_url: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(versions)
    }

    fn get_packages(&self, project_id: i64) -> Result<Vec<PackageMapping>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT distro, package_name FROM packages WHERE project_id = ?1 ORDER BY distro",
        )?;

        let packages = stmt
            .query_map([project_id], |row| {
                Ok(PackageMapping {
                    distro: row.get(0)?,
                    package_name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(packages)
    }

    fn save_check(
        &self,
        project: &Project,
        new_versions: &[UpstreamVersion],
        created_on: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        debug!(
            "Saving check of {} with {} new versions",
            project.name,
            new_versions.len()
        );

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            r#"
            UPDATE projects SET
                latest_version = :latest_version,
                last_check = :last_check,
                next_check = :next_check,
                error_counter = :error_counter,
                check_successful = :check_successful,
                logs = :logs
            WHERE id = :id
            "#,
            named_params! {
                ":latest_version": project.latest_version,
                ":last_check": project.last_check.map(to_ms),
                ":next_check": project.next_check.map(to_ms),
                ":error_counter": project.error_counter,
                ":check_successful": project.check_successful,
                ":logs": project.logs,
                ":id": project.id,
            },
        )?;

        if updated == 0 {
            return Err(StoreError::ProjectNotFound(project.id));
        }

        Self::insert_versions_tx(&tx, project.id, new_versions, created_on)?;

        tx.commit()?;
        Ok(())
    }

    fn reschedule(&self, project_id: i64, next_check: DateTime<Utc>) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        let updated = conn.execute(
            "UPDATE projects SET next_check = ?1 WHERE id = ?2",
            (to_ms(next_check), project_id),
        )?;
        if updated == 0 {
            return Err(StoreError::ProjectNotFound(project_id));
        }
        Ok(())
    }

    fn start_run(&self, started_at: DateTime<Utc>, total: usize) -> Result<i64, StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO runs (started_at, total) VALUES (?1, ?2)",
            (to_ms(started_at), total as i64),
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn finish_run(&self, run: &Run) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            UPDATE runs SET finished_at = ?1, total = ?2, success = ?3, error = ?4, ratelimit = ?5
            WHERE id = ?6
            "#,
            (
                run.finished_at.map(to_ms),
                run.total as i64,
                run.success as i64,
                run.error as i64,
                run.ratelimit as i64,
                run.id,
            ),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = Store::new(&db_path).unwrap();
        (temp_dir, store)
    }

    fn project(name: &str) -> Project {
        Project::new(name, &format!("https://example.org/{name}"), "GitHub")
    }

    fn version_strings(store: &Store, project_id: i64) -> Vec<String> {
        store
            .get_versions(project_id)
            .unwrap()
            .into_iter()
            .map(|v| v.version)
            .collect()
    }

    #[test]
    fn insert_project_round_trips_all_fields() {
        let (_temp_dir, store) = create_test_store();
        let next_check = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let expected = Project {
            ecosystem: Some("pypi".to_string()),
            version_url: Some("owner/repo".to_string()),
            regex: Some("foo-(.*).tar.gz".to_string()),
            insecure: true,
            releases_only: true,
            version_scheme: Some(VersionScheme::Pep440),
            version_prefix: Some("foo-".to_string()),
            version_pattern: Some("YYYY.0M".to_string()),
            pre_release_filter: Some("nightly".to_string()),
            version_filter: Some("snapshot".to_string()),
            latest_version: Some("1.0".to_string()),
            next_check: Some(next_check),
            error_counter: 2,
            check_successful: Some(false),
            logs: Some("boom".to_string()),
            ..project("foo")
        };

        let id = store.insert_project(&expected).unwrap();
        let loaded = store.get_project(id).unwrap();

        assert_eq!(loaded, Project { id, ..expected });
    }

    #[test]
    fn get_project_reports_missing_project() {
        let (_temp_dir, store) = create_test_store();
        assert!(matches!(
            store.get_project(42),
            Err(StoreError::ProjectNotFound(42))
        ));
    }

    #[test]
    fn find_project_by_name_returns_first_match() {
        let (_temp_dir, store) = create_test_store();
        let id = store.insert_project(&project("foo")).unwrap();

        assert_eq!(store.find_project_by_name("foo").unwrap().map(|p| p.id), Some(id));
        assert!(store.find_project_by_name("bar").unwrap().is_none());
    }

    #[test]
    fn insert_versions_adds_only_new_versions() {
        let (_temp_dir, store) = create_test_store();
        let id = store.insert_project(&project("foo")).unwrap();
        let now = Utc::now();

        store
            .insert_versions(id, &["1.0".into(), "1.1".into()], now)
            .unwrap();
        store
            .insert_versions(id, &["1.1".into(), "1.2".into()], now)
            .unwrap();

        assert_eq!(version_strings(&store, id), vec!["1.0", "1.1", "1.2"]);
    }

    #[test]
    fn insert_versions_rejects_oversized_version() {
        let (_temp_dir, store) = create_test_store();
        let id = store.insert_project(&project("foo")).unwrap();
        let oversized = "1".repeat(VERSION_MAX_LEN + 1);

        let result = store.insert_versions(id, &[oversized.as_str().into()], Utc::now());

        assert!(matches!(result, Err(StoreError::Database(_))));
        assert!(version_strings(&store, id).is_empty());
    }

    #[test]
    fn due_project_ids_skips_archived_and_future_projects() {
        let (_temp_dir, store) = create_test_store();
        let now = Utc::now();

        let never_checked = store.insert_project(&project("never")).unwrap();
        let overdue = store
            .insert_project(&Project {
                next_check: Some(now - Duration::minutes(5)),
                ..project("overdue")
            })
            .unwrap();
        store
            .insert_project(&Project {
                next_check: Some(now + Duration::minutes(5)),
                ..project("later")
            })
            .unwrap();
        store
            .insert_project(&Project {
                archived: true,
                ..project("archived")
            })
            .unwrap();

        assert_eq!(
            store.due_project_ids(now).unwrap(),
            vec![never_checked, overdue]
        );
    }

    #[test]
    fn save_check_updates_state_and_versions_together() {
        let (_temp_dir, store) = create_test_store();
        let id = store.insert_project(&project("foo")).unwrap();
        let now = Utc::now();

        let mut checked = store.get_project(id).unwrap();
        checked.latest_version = Some("1.1".to_string());
        checked.last_check = Some(now);
        checked.next_check = Some(now + Duration::hours(1));
        checked.check_successful = Some(true);
        checked.logs = Some("Version retrieved correctly".to_string());

        store
            .save_check(
                &checked,
                &[UpstreamVersion::new("1.1", Some("https://example.org/c/1"))],
                now,
            )
            .unwrap();

        let loaded = store.get_project(id).unwrap();
        assert_eq!(loaded.latest_version.as_deref(), Some("1.1"));
        assert_eq!(loaded.check_successful, Some(true));
        assert_eq!(
            loaded.next_check.map(|t| t.timestamp_millis()),
            Some((now + Duration::hours(1)).timestamp_millis())
        );

        let versions = store.get_versions(id).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].commit_url.as_deref(), Some("https://example.org/c/1"));
    }

    #[test]
    fn save_check_rolls_back_when_a_version_fails() {
        let (_temp_dir, store) = create_test_store();
        let id = store.insert_project(&project("foo")).unwrap();
        let oversized = "9".repeat(VERSION_MAX_LEN + 1);

        let mut checked = store.get_project(id).unwrap();
        checked.latest_version = Some("2.0".to_string());

        let result = store.save_check(
            &checked,
            &["2.0".into(), oversized.as_str().into()],
            Utc::now(),
        );

        assert!(result.is_err());
        assert_eq!(store.get_project(id).unwrap().latest_version, None);
        assert!(version_strings(&store, id).is_empty());
    }

    #[test]
    fn reschedule_moves_next_check_only() {
        let (_temp_dir, store) = create_test_store();
        let id = store.insert_project(&project("foo")).unwrap();
        let until = DateTime::from_timestamp_millis(1_900_000_000_000).unwrap();

        store.reschedule(id, until).unwrap();

        let loaded = store.get_project(id).unwrap();
        assert_eq!(loaded.next_check, Some(until));
        assert_eq!(loaded.check_successful, None);
        assert!(matches!(
            store.reschedule(99, until),
            Err(StoreError::ProjectNotFound(99))
        ));
    }

    #[test]
    fn packages_are_listed_by_distro() {
        let (_temp_dir, store) = create_test_store();
        let id = store.insert_project(&project("foo")).unwrap();
        let fedora = PackageMapping {
            distro: "Fedora".to_string(),
            package_name: "python-foo".to_string(),
        };
        let arch = PackageMapping {
            distro: "Arch".to_string(),
            package_name: "foo".to_string(),
        };

        store.add_package(id, &fedora).unwrap();
        store.add_package(id, &arch).unwrap();

        assert_eq!(store.get_packages(id).unwrap(), vec![arch, fedora]);
    }

    #[test]
    fn runs_are_started_and_finished() {
        let (_temp_dir, store) = create_test_store();
        let started_at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let finished_at = DateTime::from_timestamp_millis(1_700_000_060_000).unwrap();

        let run_id = store.start_run(started_at, 5).unwrap();
        let started = store.list_runs(10).unwrap();
        assert_eq!(started[0].finished_at, None);
        assert_eq!(started[0].total, 5);

        let run = Run {
            id: run_id,
            started_at,
            finished_at: Some(finished_at),
            total: 5,
            success: 3,
            error: 1,
            ratelimit: 1,
        };
        store.finish_run(&run).unwrap();

        assert_eq!(store.list_runs(10).unwrap(), vec![run]);
    }

    #[test]
    fn deleting_project_cascades_to_versions() {
        let (_temp_dir, store) = create_test_store();
        let id = store.insert_project(&project("foo")).unwrap();
        store.insert_versions(id, &["1.0".into()], Utc::now()).unwrap();

        {
            let conn = store.lock_conn().unwrap();
            conn.execute("DELETE FROM projects WHERE id = ?1", [id]).unwrap();
        }

        assert!(version_strings(&store, id).is_empty());
    }
}
