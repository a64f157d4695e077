// src/app.rs
use anyhow::Result;
use std::sync::Arc;

use crate::checks::{FilingChecker, InsiderChecker, NewsChecker, PriceChecker, SignalChecker};
use crate::config::{Rules, Settings};
use crate::fetch::{Fetch, HttpFetcher};
use crate::notify::{Notifier, NotifierMux};
use crate::runner::Runner;
use crate::sentiment::LexiconScorer;
use crate::state::StateStore;

/// Checkers in digest order. Credential-gated ones are left out when their
/// key is missing.
pub fn build_checkers(
    rules: &Rules,
    settings: &Settings,
    fetch: Arc<dyn Fetch>,
) -> Vec<Box<dyn SignalChecker>> {
    let mut checkers: Vec<Box<dyn SignalChecker>> = vec![
        Box::new(InsiderChecker::new(
            fetch.clone(),
            rules.entity.clone(),
            rules.insider.clone(),
        )),
        Box::new(FilingChecker::new(
            fetch.clone(),
            rules.entity.clone(),
            rules.filings.clone(),
        )),
    ];

    match &settings.news_api_key {
        Some(key) => checkers.push(Box::new(NewsChecker::new(
            fetch.clone(),
            Arc::new(LexiconScorer::new()),
            rules.entity.clone(),
            rules.news.clone(),
            key.clone(),
        ))),
        None => tracing::warn!(checker = "news", "NEWS_API_KEY not set, checker disabled"),
    }

    match &settings.alpha_vantage_key {
        Some(key) => checkers.push(Box::new(PriceChecker::new(
            fetch,
            rules.entity.clone(),
            rules.price.clone(),
            key.clone(),
        ))),
        None => tracing::warn!(checker = "price", "ALPHA_VANTAGE_API_KEY not set, checker disabled"),
    }

    checkers
}

/// Production wiring: real HTTP, delivery channels from the environment.
pub fn build_runner(rules: &Rules, settings: &Settings) -> Result<Runner> {
    let fetch: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(settings)?);
    let mux = NotifierMux::from_env()?;
    if mux.is_empty() {
        tracing::warn!("no delivery channel configured (SMTP_HOST / SLACK_WEBHOOK_URL)");
    }
    let notifier: Box<dyn Notifier> = Box::new(mux);
    Ok(Runner::new(
        build_checkers(rules, settings, fetch),
        notifier,
        StateStore::new(settings.state_path.clone()),
        rules.entity.label(),
    ))
}
