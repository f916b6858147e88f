//! Scheduler batch tests against a real store

mod helper;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use helper::{FakeBackend, RecordingNotifier, create_test_checker, create_test_store, project};
use release_watch::check::error::BackendError;
use release_watch::check::scheduler::Scheduler;
use release_watch::check::store::ProjectStore;

fn reset_time() -> DateTime<Utc> {
    Utc::now() + Duration::hours(2)
}

#[tokio::test(flavor = "multi_thread")]
async fn rate_limited_backend_is_skipped_for_rest_of_batch() {
    let (_temp_dir, store, ids) = create_test_store(&[
        (project("a", "GitHub"), vec![]),
        (project("b", "GitHub"), vec![]),
        (project("c", "PyPI"), vec![]),
    ]);
    let reset_time = DateTime::from_timestamp_millis(reset_time().timestamp_millis()).unwrap();

    let github = Arc::new(
        FakeBackend::new("GitHub")
            .with_error("a", BackendError::RateLimited { reset_time })
            .with_versions("b", &["1.0"]),
    );
    let pypi = Arc::new(FakeBackend::new("PyPI").with_versions("c", &["2.0"]));
    let checker = create_test_checker(
        store.clone(),
        vec![github.clone(), pypi.clone()],
        Arc::new(RecordingNotifier::default()),
    );
    let scheduler = Scheduler::new(Arc::new(checker)).with_workers(1);

    let run = scheduler.run_batch().await.unwrap();

    assert_eq!(run.total, 3);
    assert_eq!(run.success, 1);
    assert_eq!(run.ratelimit, 2);
    assert_eq!(run.error, 0);
    assert_eq!(github.calls(), vec!["a"]);
    assert_eq!(pypi.calls(), vec!["c"]);

    let a = store.get_project(ids[0]).unwrap();
    assert_eq!(a.next_check, Some(reset_time));
    assert_eq!(a.check_successful, Some(false));

    let b = store.get_project(ids[1]).unwrap();
    assert_eq!(b.next_check, Some(reset_time));
    assert_eq!(b.latest_version, None);

    let c = store.get_project(ids[2]).unwrap();
    assert_eq!(c.latest_version.as_deref(), Some("2.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn blacklist_outlives_the_batch() {
    let (_temp_dir, store, _ids) = create_test_store(&[(project("a", "GitHub"), vec![])]);
    let github = Arc::new(
        FakeBackend::new("GitHub")
            .with_error("a", BackendError::RateLimited { reset_time: reset_time() })
            .with_versions("late", &["1.0"]),
    );
    let checker = create_test_checker(
        store.clone(),
        vec![github.clone()],
        Arc::new(RecordingNotifier::default()),
    );
    let scheduler = Scheduler::new(Arc::new(checker)).with_workers(2);

    scheduler.run_batch().await.unwrap();
    let late = store.insert_project(&project("late", "GitHub")).unwrap();
    let run = scheduler.run_batch().await.unwrap();

    assert_eq!((run.total, run.ratelimit), (1, 1));
    assert_eq!(github.calls(), vec!["a"]);
    assert!(store.get_project(late).unwrap().next_check.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn failures_do_not_stop_other_workers() {
    let projects: Vec<_> = (0..20)
        .map(|i| (project(&format!("p{i}"), "GitHub"), vec!["0.1"]))
        .collect();
    let (_temp_dir, store, ids) = create_test_store(&projects);

    let github = (0..20).fold(FakeBackend::new("GitHub"), |backend, i| {
        if i % 5 == 0 {
            backend.with_error(&format!("p{i}"), BackendError::Plugin("boom".to_string()))
        } else {
            backend.with_versions(&format!("p{i}"), &["0.1", "0.2"])
        }
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let checker = create_test_checker(store.clone(), vec![Arc::new(github)], notifier.clone());
    let scheduler = Scheduler::new(Arc::new(checker)).with_workers(4);

    let run = scheduler.run_batch().await.unwrap();

    assert_eq!((run.total, run.success, run.error, run.ratelimit), (20, 16, 4, 0));
    assert_eq!(notifier.updates().len(), 16);
    for (i, id) in ids.iter().enumerate() {
        let saved = store.get_project(*id).unwrap();
        if i % 5 == 0 {
            assert_eq!(saved.error_counter, 1);
            assert_eq!(store.get_versions(*id).unwrap().len(), 1);
        } else {
            assert_eq!(saved.latest_version.as_deref(), Some("0.2"));
            assert_eq!(store.get_versions(*id).unwrap().len(), 2);
        }
    }

    let runs = store.list_runs(5).unwrap();
    assert_eq!(runs, vec![run]);
    assert!(runs[0].finished_at.is_some());
}
