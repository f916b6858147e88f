use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use release_watch::check::backend::BackendRegistry;
use release_watch::check::checker::ReleaseChecker;
use release_watch::check::notify::LogNotifier;
use release_watch::check::store::{ProjectStore, Store};
use release_watch::config::{MonitorConfig, log_path};
use release_watch::logging;
use release_watch::version::scheme::VersionScheme;
use release_watch::version::{Version, VersionOptions, sort_descending};

#[derive(Parser)]
#[command(name = "release-watch")]
#[command(version, about = "Upstream release monitoring toolkit")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to a file, by default in the data directory
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct VersionArgs {
    /// Version scheme (RPM, Semantic, Calendar, "PEP 440", Date, Generic)
    #[arg(long, default_value = "RPM")]
    scheme: VersionScheme,

    /// `;` separated prefixes stripped before parsing
    #[arg(long)]
    prefix: Option<String>,

    /// Calendar pattern, e.g. YYYY.0M.DD
    #[arg(long)]
    pattern: Option<String>,

    /// `;` separated substrings marking pre-releases
    #[arg(long)]
    pre_release_filter: Option<String>,
}

impl VersionArgs {
    fn version(&self, raw: &str) -> Version {
        let options = VersionOptions::new()
            .with_prefix(self.prefix.as_deref())
            .with_pattern(self.pattern.as_deref())
            .with_pre_release_filter(self.pre_release_filter.as_deref());
        Version::new(self.scheme, raw, &options)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Order two versions
    Compare {
        left: String,
        right: String,
        #[command(flatten)]
        version: VersionArgs,
    },
    /// Sort versions newest first
    Sort {
        #[arg(required = true)]
        versions: Vec<String>,
        #[command(flatten)]
        version: VersionArgs,
    },
    /// Recompute the latest version of a stored project
    Latest { project: String },
    /// List projects due for a check
    Due,
    /// Show recent scheduler runs
    Runs {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn open_checker(config: &MonitorConfig) -> anyhow::Result<ReleaseChecker<Store>> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {:?}", parent))?;
    }
    let store = Store::new(&db_path)?;

    Ok(ReleaseChecker::new(
        Arc::new(store),
        BackendRegistry::new(),
        config.versions.scheme_registry(),
        Arc::new(LogNotifier),
    )
    .with_check_interval(Duration::seconds(config.scheduler.check_interval)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .as_ref()
        .map(|path| path.clone().unwrap_or_else(log_path));
    let _guard = logging::init(log_file.as_deref(), cli.json_logs)?;

    let config = match &cli.config {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };

    match cli.command {
        Command::Compare {
            left,
            right,
            version,
        } => {
            let symbol = match version.version(&left).compare(&version.version(&right)) {
                Ordering::Less => "<",
                Ordering::Equal => "==",
                Ordering::Greater => ">",
            };
            println!("{left} {symbol} {right}");
        }
        Command::Sort { versions, version } => {
            let sorted = sort_descending(versions.iter().map(|raw| version.version(raw)).collect());
            for v in sorted {
                let marker = if v.prerelease() { " (pre-release)" } else { "" };
                println!("{}{}", v.raw(), marker);
            }
        }
        Command::Latest { project } => {
            let checker = open_checker(&config)?;
            let project = checker
                .store()
                .find_project_by_name(&project)?
                .with_context(|| format!("Project {project} not found"))?;
            let versions = checker.sorted_versions(&project)?;
            let stable = checker.stable_versions(&project)?;

            println!(
                "{} ({}): latest {}, stable {}, stored {}",
                project.name,
                checker.scheme_for(&project),
                versions.first().map(Version::parse).as_deref().unwrap_or("-"),
                stable.first().map(Version::parse).as_deref().unwrap_or("-"),
                project.latest_version.as_deref().unwrap_or("-"),
            );
        }
        Command::Due => {
            let checker = open_checker(&config)?;
            let store = checker.store();
            for id in store.due_project_ids(Utc::now())? {
                let project = store.get_project(id)?;
                println!("{}\t{}\t{}", project.id, project.backend, project.name);
            }
        }
        Command::Runs { limit } => {
            let checker = open_checker(&config)?;
            for run in checker.store().list_runs(limit)? {
                println!("{}", serde_json::to_string(&run)?);
            }
        }
    }

    Ok(())
}
