// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use ticker_sentinel::fetch::Fetch;
use ticker_sentinel::{Alert, AlertCategory, Digest, Notifier, SignalChecker};

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|e| panic!("fixture {name}: {e}"))
}

/// Serves canned bodies for URLs containing a key; anything else is a
/// network error. Every requested URL is recorded.
#[derive(Default)]
pub struct FixtureFetcher {
    routes: Vec<(String, String)>,
    pub requested: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url_contains: &str, body: String) -> Self {
        self.routes.push((url_contains.to_string(), body));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetch for FixtureFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.routes
            .iter()
            .find(|(k, _)| url.contains(k.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| anyhow!("simulated network error for {url}"))
    }
}

pub struct StaticChecker {
    pub name: &'static str,
    pub alerts: Vec<&'static str>,
}

#[async_trait::async_trait]
impl SignalChecker for StaticChecker {
    async fn check(&self, _last_check: DateTime<Utc>) -> Result<Vec<Alert>> {
        Ok(self
            .alerts
            .iter()
            .map(|m| Alert::new(AlertCategory::Filing, *m))
            .collect())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub struct FailingChecker;

#[async_trait::async_trait]
impl SignalChecker for FailingChecker {
    async fn check(&self, _last_check: DateTime<Utc>) -> Result<Vec<Alert>> {
        Err(anyhow!("connection refused"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Records every digest it is handed.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<Digest>>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        self.sent.lock().unwrap().push(digest.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _digest: &Digest) -> Result<()> {
        Err(anyhow!("smtp 421 service not available"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
