// src/notify/email.rs
use anyhow::{anyhow, Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{Digest, Notifier};
use crate::config::env_non_empty;

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailNotifier {
    pub fn new(mailer: AsyncSmtpTransport<Tokio1Executor>, from: Mailbox, to: Vec<Mailbox>) -> Self {
        Self { mailer, from, to }
    }

    /// `None` when `SMTP_HOST` is unset; an error when it is set but the rest
    /// of the mail configuration is missing or malformed.
    pub fn from_env() -> Result<Option<Self>> {
        let Some(host) = env_non_empty("SMTP_HOST") else {
            return Ok(None);
        };
        let require = |key: &str| env_non_empty(key).ok_or_else(|| anyhow!("{key} missing"));
        let user = require("SMTP_USER")?;
        let pass = require("SMTP_PASS")?;
        let from: Mailbox = require("NOTIFY_EMAIL_FROM")?
            .parse()
            .context("invalid NOTIFY_EMAIL_FROM")?;
        let to = parse_recipients(&require("NOTIFY_EMAIL_TO")?)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(Credentials::new(user, pass))
            .build();

        Ok(Some(Self::new(mailer, from, to)))
    }

    pub fn build_message(&self, digest: &Digest) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(digest.subject())
            .header(header::ContentType::TEXT_PLAIN);
        for rcpt in &self.to {
            builder = builder.to(rcpt.clone());
        }
        builder.body(digest.body()).context("build email")
    }
}

/// Comma separated list, at least one address.
pub fn parse_recipients(raw: &str) -> Result<Vec<Mailbox>> {
    let to = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Mailbox>().with_context(|| format!("invalid recipient {s}")))
        .collect::<Result<Vec<_>>>()?;
    if to.is_empty() {
        return Err(anyhow!("NOTIFY_EMAIL_TO has no addresses"));
    }
    Ok(to)
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let msg = self.build_message(digest)?;
        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
