// src/checks/price.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::alert::{Alert, AlertCategory};
use crate::checks::SignalChecker;
use crate::config::rules::{EntityRules, PriceRules};
use crate::fetch::Fetch;

#[derive(Debug, Deserialize)]
struct DailySeries {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, DailyBar>>,
    #[serde(rename = "Error Message")]
    error: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

/// Closes keyed by trading day, newest first.
pub fn parse_closes(json: &str) -> Result<Vec<(String, f64)>> {
    let raw: DailySeries = serde_json::from_str(json).context("parsing daily series")?;
    let series = match raw.series {
        Some(s) => s,
        None => {
            let why = raw
                .error
                .or(raw.note)
                .or(raw.information)
                .unwrap_or_else(|| "missing time series".to_string());
            return Err(anyhow!("price api: {why}"));
        }
    };
    let mut out = Vec::with_capacity(series.len());
    for (day, bar) in series.into_iter().rev() {
        let close: f64 = bar
            .close
            .trim()
            .parse()
            .with_context(|| format!("close for {day} not numeric"))?;
        if !close.is_finite() {
            return Err(anyhow!("close for {day} not finite: {}", bar.close.trim()));
        }
        out.push((day, close));
    }
    Ok(out)
}

pub fn pct_change(prior: f64, latest: f64) -> f64 {
    (latest - prior) / prior * 100.0
}

/// Compares the two most recent closes, whatever days they fall on.
pub fn evaluate(closes: &[(String, f64)], ticker: &str, rules: &PriceRules) -> Option<String> {
    let [(day, latest), (_, prior), ..] = closes else {
        return None;
    };
    if *prior == 0.0 {
        return None;
    }
    let change = pct_change(*prior, *latest);
    // Threshold applies to the two-decimal figure the alert shows.
    let shown = (change.abs() * 100.0).round() / 100.0;
    if shown < rules.pct_threshold {
        return None;
    }
    let (arrow, dir) = if change > 0.0 { ("▲", "up") } else { ("▼", "down") };
    Some(format!(
        "PRICE MOVE {arrow} {ticker} {dir} {shown:.2}% to {latest:.2} (prior close {prior:.2}, {day})"
    ))
}

pub struct PriceChecker {
    fetch: Arc<dyn Fetch>,
    entity: EntityRules,
    rules: PriceRules,
    api_key: String,
}

impl PriceChecker {
    pub fn new(fetch: Arc<dyn Fetch>, entity: EntityRules, rules: PriceRules, api_key: String) -> Self {
        Self {
            fetch,
            entity,
            rules,
            api_key,
        }
    }

    fn request_url(&self) -> Result<Url> {
        Url::parse_with_params(
            &self.rules.endpoint,
            &[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", self.entity.ticker.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .context("building price url")
    }
}

#[async_trait]
impl SignalChecker for PriceChecker {
    /// Not windowed: always latest vs. prior close, `last_check` is ignored.
    async fn check(&self, _last_check: DateTime<Utc>) -> Result<Vec<Alert>> {
        let url = self.request_url()?;
        let body = self
            .fetch
            .get_text(url.as_str())
            .await
            .context("fetching daily series")?;
        let closes = parse_closes(&body)?;
        if closes.len() < 2 {
            tracing::debug!(records = closes.len(), "not enough closes to compare");
        }
        Ok(evaluate(&closes, &self.entity.ticker, &self.rules)
            .map(|text| Alert::new(AlertCategory::PriceMove, text))
            .into_iter()
            .collect())
    }

    fn name(&self) -> &'static str {
        "price"
    }
}
