// src/notify/mod.rs
pub mod email;
pub mod slack;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::alert::Alert;

pub use email::EmailNotifier;
pub use slack::SlackNotifier;

/// Everything one run found, rendered as a single plain-text message.
#[derive(Debug, Clone)]
pub struct Digest {
    pub entity: String,
    pub generated_at: DateTime<Utc>,
    pub alerts: Vec<Alert>,
}

impl Digest {
    pub fn new(entity: impl Into<String>, generated_at: DateTime<Utc>, alerts: Vec<Alert>) -> Self {
        Self {
            entity: entity.into(),
            generated_at,
            alerts,
        }
    }

    pub fn subject(&self) -> String {
        let n = self.alerts.len();
        format!(
            "{}: {n} signal alert{}",
            self.entity,
            if n == 1 { "" } else { "s" }
        )
    }

    /// Header, alerts separated by blank lines, footer.
    pub fn body(&self) -> String {
        let alerts = self
            .alerts
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "Signal digest for {}\n\n{alerts}\n\n--\nGenerated {} by ticker-sentinel\n",
            self.entity,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, digest: &Digest) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fans a digest out to every configured channel.
#[derive(Default)]
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Email and Slack, each only when its environment is present.
    pub fn from_env() -> Result<Self> {
        let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
        if let Some(email) = EmailNotifier::from_env()? {
            channels.push(Box::new(email));
        }
        if let Some(slack) = SlackNotifier::from_env() {
            channels.push(Box::new(slack));
        }
        Ok(Self { channels })
    }

    pub fn with_channel(mut self, n: Box<dyn Notifier>) -> Self {
        self.channels.push(n);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait::async_trait]
impl Notifier for NotifierMux {
    /// Tries every channel; fails if any one of them failed.
    async fn send(&self, digest: &Digest) -> Result<()> {
        if self.channels.is_empty() {
            tracing::info!(
                alerts = digest.alerts.len(),
                "no delivery channel configured, digest follows\n{}",
                digest.body()
            );
            return Ok(());
        }

        let mut failed = Vec::new();
        for ch in &self.channels {
            match ch.send(digest).await {
                Ok(()) => tracing::info!(channel = ch.name(), "digest delivered"),
                Err(e) => {
                    tracing::warn!(channel = ch.name(), error = ?e, "digest delivery failed");
                    failed.push(ch.name());
                }
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("delivery failed on: {}", failed.join(", ")))
        }
    }

    fn name(&self) -> &'static str {
        "mux"
    }
}
