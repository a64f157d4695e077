// src/checks/news.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;

use crate::alert::{Alert, AlertCategory};
use crate::checks::SignalChecker;
use crate::config::rules::{EntityRules, NewsRules};
use crate::fetch::Fetch;
use crate::sentiment::{clean_text, SentimentScorer};

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

pub fn parse_articles(json: &str) -> Result<Vec<Article>> {
    let rsp: NewsResponse = serde_json::from_str(json).context("parsing news response")?;
    if rsp.status != "ok" {
        return Err(anyhow!(
            "news api status {}: {}",
            rsp.status,
            rsp.message.unwrap_or_default()
        ));
    }
    Ok(rsp.articles)
}

/// `("Apple" OR AAPL) AND (earnings OR lawsuit ...)`
pub fn build_query(entity: &EntityRules, keywords: &[String]) -> String {
    let subject = format!("(\"{}\" OR {})", entity.name, entity.ticker);
    let kws: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    if kws.is_empty() {
        return subject;
    }
    format!("{subject} AND ({})", kws.join(" OR "))
}

/// Alert text for one article, if its sentiment is strong enough.
pub fn classify(article: &Article, scorer: &dyn SentimentScorer, threshold: f32) -> Option<String> {
    let title = article.title.as_deref().unwrap_or_default();
    let text = format!("{title} {}", article.description.as_deref().unwrap_or_default());
    let score = scorer.compound(&text);
    if score.abs() <= threshold {
        return None;
    }
    let label = if score > 0.0 { "POSITIVE" } else { "NEGATIVE" };
    let link = article.url.as_deref().unwrap_or("(no link)");
    Some(match article.published_at.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(at) => format!("NEWS {label} ({score:+.2}): {}\n{link} ({at})", clean_text(title)),
        None => format!("NEWS {label} ({score:+.2}): {}\n{link}", clean_text(title)),
    })
}

pub struct NewsChecker {
    fetch: Arc<dyn Fetch>,
    scorer: Arc<dyn SentimentScorer>,
    entity: EntityRules,
    rules: NewsRules,
    api_key: String,
}

impl NewsChecker {
    pub fn new(
        fetch: Arc<dyn Fetch>,
        scorer: Arc<dyn SentimentScorer>,
        entity: EntityRules,
        rules: NewsRules,
        api_key: String,
    ) -> Self {
        Self {
            fetch,
            scorer,
            entity,
            rules,
            api_key,
        }
    }

    pub fn request_url(&self, last_check: DateTime<Utc>) -> Result<Url> {
        let from = last_check.date_naive().format("%Y-%m-%d").to_string();
        let page_size = self.rules.max_articles.to_string();
        Url::parse_with_params(
            &self.rules.endpoint,
            &[
                ("q", build_query(&self.entity, &self.rules.keywords).as_str()),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("language", self.rules.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .context("building news url")
    }
}

#[async_trait]
impl SignalChecker for NewsChecker {
    async fn check(&self, last_check: DateTime<Utc>) -> Result<Vec<Alert>> {
        let url = self.request_url(last_check)?;
        let body = self
            .fetch
            .get_text(url.as_str())
            .await
            .context("fetching news")?;
        let articles = parse_articles(&body)?;
        tracing::debug!(count = articles.len(), "news articles");

        Ok(articles
            .iter()
            .take(self.rules.max_articles)
            .filter_map(|a| classify(a, self.scorer.as_ref(), self.rules.sentiment_threshold))
            .map(|text| Alert::new(AlertCategory::News, text))
            .collect())
    }

    fn name(&self) -> &'static str {
        "news"
    }
}
