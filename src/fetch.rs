// src/fetch.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::config::Settings;

/// The only way checkers reach the network.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.http_timeout)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let rsp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("GET {}", redact(url)))?
            .error_for_status()
            .map_err(|e| e.without_url())
            .with_context(|| format!("non-2xx from {}", redact(url)))?;
        rsp.text().await.context("reading response body")
    }
}

/// Strip the query string so API keys never reach the logs.
pub fn redact(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}
