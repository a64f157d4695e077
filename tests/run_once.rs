// tests/run_once.rs
mod common;

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use common::{fixture, FailingChecker, FailingNotifier, FixtureFetcher, RecordingNotifier, StaticChecker};
use ticker_sentinel::app::build_checkers;
use ticker_sentinel::config::{Rules, Settings};
use ticker_sentinel::{Runner, SignalChecker, StateStore};

fn store_in(dir: &tempfile::TempDir) -> StateStore {
    StateStore::new(dir.path().join("state/last_check.json"))
}

#[tokio::test]
async fn no_alerts_means_no_digest_but_state_still_saved() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let checkers: Vec<Box<dyn SignalChecker>> = vec![
        Box::new(StaticChecker { name: "a", alerts: vec![] }),
        Box::new(StaticChecker { name: "b", alerts: vec![] }),
    ];
    let before = Utc::now();
    let runner = Runner::new(checkers, Box::new(notifier.clone()), store_in(&dir), "Apple (AAPL)");

    let report = runner.run_once().await;

    assert!(report.alerts.is_empty());
    assert!(!report.dispatched);
    assert!(notifier.sent.lock().unwrap().is_empty());
    assert!(report.state_saved);
    assert!(report.saved_at >= before);
    let persisted = store_in(&dir).load(Utc::now()).await;
    assert_eq!(persisted.last_check, report.saved_at);
}

#[tokio::test]
async fn failing_checker_contributes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = RecordingNotifier::default();
    let checkers: Vec<Box<dyn SignalChecker>> = vec![
        Box::new(StaticChecker { name: "first", alerts: vec!["one", "two"] }),
        Box::new(FailingChecker),
        Box::new(StaticChecker { name: "last", alerts: vec!["three"] }),
    ];
    let runner = Runner::new(checkers, Box::new(notifier.clone()), store_in(&dir), "Apple (AAPL)");

    let report = runner.run_once().await;

    assert_eq!(report.failed_checkers, vec!["failing"]);
    let msgs: Vec<&str> = report.alerts.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(msgs, vec!["one", "two", "three"]);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "exactly one digest per run");
    assert!(sent[0].body().contains("one\n\ntwo\n\nthree"));
    assert!(report.state_saved);
}

#[tokio::test]
async fn delivery_failure_does_not_block_state() {
    let dir = tempfile::tempdir().unwrap();
    let checkers: Vec<Box<dyn SignalChecker>> =
        vec![Box::new(StaticChecker { name: "a", alerts: vec!["alert"] })];
    let runner = Runner::new(checkers, Box::new(FailingNotifier), store_in(&dir), "Apple (AAPL)");

    let report = runner.run_once().await;

    assert!(report.dispatched);
    assert!(report.delivery_error.as_deref().unwrap_or_default().contains("421"));
    assert!(report.state_saved);
    assert_eq!(store_in(&dir).load(Utc::now()).await.last_check, report.saved_at);
}

#[tokio::test]
async fn previous_state_sets_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let prior = Utc.with_ymd_and_hms(2025, 3, 1, 6, 0, 0).unwrap();
    store.save(prior).await;

    let runner = Runner::new(vec![], Box::new(RecordingNotifier::default()), store, "x");
    let report = runner.run_once().await;
    assert_eq!(report.last_check, prior);
    assert!(report.saved_at > prior);
}

#[tokio::test]
async fn first_run_window_is_a_day() {
    let dir = tempfile::tempdir().unwrap();
    let before = Utc::now();
    let runner = Runner::new(vec![], Box::new(RecordingNotifier::default()), store_in(&dir), "x");
    let report = runner.run_once().await;
    let expected = before - Duration::hours(24);
    assert!((report.last_check - expected).num_seconds().abs() <= 5);
}

#[tokio::test]
async fn all_sources_down_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        news_api_key: Some("k".into()),
        alpha_vantage_key: Some("k".into()),
        ..Settings::default()
    };
    let checkers = build_checkers(&Rules::default(), &settings, Arc::new(FixtureFetcher::new()));
    assert_eq!(checkers.len(), 4);

    let notifier = RecordingNotifier::default();
    let runner = Runner::new(checkers, Box::new(notifier.clone()), store_in(&dir), "Apple (AAPL)");
    let report = runner.run_once().await;

    assert_eq!(report.failed_checkers, vec!["insider", "filings", "news", "price"]);
    assert!(report.alerts.is_empty());
    assert!(notifier.sent.lock().unwrap().is_empty());
    assert!(report.state_saved);
}

#[tokio::test]
async fn full_pipeline_with_fixtures_orders_digest_by_checker() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store
        .save(Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap())
        .await;

    let fetch = FixtureFetcher::new()
        .route("output=atom", fixture("edgar_form4_feed.xml"))
        .route("0000320193-25-000041.txt", fixture("form4_watched_sale.txt"))
        .route("0000320193-25-000042.txt", fixture("form4_watched_small.txt"))
        .route("0000320193-25-000043.txt", fixture("form4_unwatched.txt"))
        .route("CIK0000320193.json", fixture("submissions.json"))
        .route("newsapi.org", fixture("newsapi_everything.json"))
        .route("alphavantage.co", fixture("alphavantage_daily.json"));
    let settings = Settings {
        news_api_key: Some("k".into()),
        alpha_vantage_key: Some("k".into()),
        ..Settings::default()
    };
    let checkers = build_checkers(&Rules::default(), &settings, Arc::new(fetch));
    let notifier = RecordingNotifier::default();
    let runner = Runner::new(checkers, Box::new(notifier.clone()), store, "Apple (AAPL)");

    let report = runner.run_once().await;
    assert!(report.failed_checkers.is_empty(), "{:?}", report.failed_checkers);

    let prefixes: Vec<&str> = report
        .alerts
        .iter()
        .map(|a| a.message.split_whitespace().next().unwrap_or_default())
        .collect();
    // insider(1), filings(2), news(2), price(1)
    assert_eq!(prefixes, vec!["INSIDER", "AAPL", "AAPL", "NEWS", "NEWS", "PRICE"]);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject(), "Apple (AAPL): 6 signal alerts");
}

#[tokio::test]
async fn missing_keys_disable_credentialed_checkers() {
    let checkers = build_checkers(&Rules::default(), &Settings::default(), Arc::new(FixtureFetcher::new()));
    let names: Vec<&str> = checkers.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["insider", "filings"]);
}
