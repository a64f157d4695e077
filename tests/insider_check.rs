// tests/insider_check.rs
mod common;

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use common::{fixture, FixtureFetcher};
use ticker_sentinel::checks::insider::{parse_feed, parse_ownership, InsiderChecker};
use ticker_sentinel::config::rules::{EntityRules, InsiderRules};
use ticker_sentinel::{AlertCategory, SignalChecker};

fn fetcher() -> FixtureFetcher {
    FixtureFetcher::new()
        .route("output=atom", fixture("edgar_form4_feed.xml"))
        .route("0000320193-25-000041.txt", fixture("form4_watched_sale.txt"))
        .route("0000320193-25-000042.txt", fixture("form4_watched_small.txt"))
        .route("0000320193-25-000043.txt", fixture("form4_unwatched.txt"))
}

#[test]
fn feed_fixture_parses_every_entry() {
    let entries = parse_feed(&fixture("edgar_form4_feed.xml")).expect("feed parses");
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].form.as_deref(), Some("4"));
    assert!(entries[0].link.ends_with("-index.htm"));
}

#[test]
fn ownership_document_fields() {
    let s = parse_ownership(&fixture("form4_watched_sale.txt"))
        .expect("form 4 parses")
        .expect("has a non-derivative transaction");
    assert_eq!(s.owner, "Cook Timothy D");
    assert_eq!(s.transaction_code, "S");
    assert_eq!(s.form_type, "4");
    assert_eq!(s.share_delta, -1500.0);
}

#[test]
fn derivative_only_filing_has_no_summary() {
    let parsed = parse_ownership(&fixture("form4_derivative_only.txt")).expect("form 4 parses");
    assert!(parsed.is_none());
}

#[tokio::test]
async fn derivative_only_filing_is_skipped_without_losing_alerts() {
    let fetch = FixtureFetcher::new()
        .route("output=atom", fixture("edgar_form4_feed.xml"))
        .route("0000320193-25-000041.txt", fixture("form4_watched_sale.txt"))
        .route("0000320193-25-000042.txt", fixture("form4_derivative_only.txt"))
        .route("0000320193-25-000043.txt", fixture("form4_unwatched.txt"));
    let checker = InsiderChecker::new(Arc::new(fetch), EntityRules::default(), InsiderRules::default());
    let last_check = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

    let alerts = checker.check(last_check).await.expect("derivative-only entry is not fatal");

    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].message.contains("Cook Timothy D"));
    assert!(alerts[0].message.contains("1500 shares"));
}

#[test]
fn malformed_ownership_xml_is_still_an_error() {
    let doc = "<ownershipDocument><reportingOwner><oops></ownershipDocument>";
    assert!(parse_ownership(doc).is_err());
}

#[tokio::test]
async fn only_large_watched_transactions_alert() {
    let fetch = Arc::new(fetcher());
    let checker = InsiderChecker::new(fetch.clone(), EntityRules::default(), InsiderRules::default());
    let last_check = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

    let alerts = checker.check(last_check).await.expect("insider check ok");

    // 1500 watched -> alert, 500 watched -> none, 5000 unwatched -> none
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].category, AlertCategory::Insider);
    assert!(alerts[0].message.contains("INSIDER SALE"));
    assert!(alerts[0].message.contains("Cook Timothy D"));
    assert!(alerts[0].message.contains("1500 shares"));

    // Form 144 and the older entry are never fetched.
    let requested = fetch.requested();
    assert_eq!(requested.len(), 4);
    assert!(!requested.iter().any(|u| u.contains("000039") || u.contains("000030")));
}

#[tokio::test]
async fn day_granularity_includes_same_day_entries() {
    // Late on the 10th UTC: entries stamped earlier that day still count.
    let checker = InsiderChecker::new(Arc::new(fetcher()), EntityRules::default(), InsiderRules::default());
    let last_check = Utc.with_ymd_and_hms(2025, 3, 10, 23, 59, 0).unwrap();
    assert_eq!(checker.check(last_check).await.unwrap().len(), 1);

    let next_day = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();
    assert!(checker.check(next_day).await.unwrap().is_empty());
}

#[tokio::test]
async fn detail_failure_aborts_the_checker() {
    let fetch = FixtureFetcher::new()
        .route("output=atom", fixture("edgar_form4_feed.xml"))
        .route("0000320193-25-000041.txt", fixture("form4_watched_sale.txt"));
    let checker = InsiderChecker::new(Arc::new(fetch), EntityRules::default(), InsiderRules::default());
    let last_check = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    assert!(checker.check(last_check).await.is_err());
}

#[tokio::test]
async fn feed_network_error_is_an_error() {
    let checker = InsiderChecker::new(
        Arc::new(FixtureFetcher::new()),
        EntityRules::default(),
        InsiderRules::default(),
    );
    assert!(checker.check(Utc::now()).await.is_err());
}
