use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{Digest, Notifier};
use crate::config::env_non_empty;

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn from_env() -> Option<Self> {
        env_non_empty("SLACK_WEBHOOK_URL").map(Self::new)
    }

    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let text = format!("*{}*\n{}", digest.subject(), digest.body());
        let body = serde_json::json!({ "text": text });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("slack post")?
            .error_for_status()
            .map_err(|e| e.without_url())
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
