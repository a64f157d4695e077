// src/checks/filings.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::alert::{Alert, AlertCategory};
use crate::checks::SignalChecker;
use crate::config::rules::{EntityRules, FilingRules};
use crate::fetch::Fetch;

#[derive(Debug, Deserialize)]
struct Submissions {
    filings: SubmissionFilings,
}

#[derive(Debug, Deserialize)]
struct SubmissionFilings {
    recent: RecentFilings,
}

/// Column-oriented: index `i` across the arrays is one filing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecentFilings {
    pub form: Vec<String>,
    pub filing_date: Vec<String>,
    pub primary_doc_description: Vec<String>,
}

pub fn parse_recent(json: &str) -> Result<RecentFilings> {
    let s: Submissions = serde_json::from_str(json).context("parsing submissions index")?;
    Ok(s.filings.recent)
}

/// 10-Q filings alert unconditionally; 8-K filings only with an earnings
/// description. The asymmetry is current behaviour, kept on purpose.
pub fn is_material(form: &str, description: &str, rules: &FilingRules) -> bool {
    let form = form.trim();
    if form == rules.quarterly_form {
        return true;
    }
    form == rules.current_form
        && description
            .to_lowercase()
            .contains(&rules.earnings_keyword.to_lowercase())
}

pub fn material_filings(
    recent: &RecentFilings,
    since: NaiveDate,
    rules: &FilingRules,
) -> Vec<String> {
    let mut out = Vec::new();
    for (i, (form, date_raw)) in recent.form.iter().zip(&recent.filing_date).enumerate() {
        let Ok(date) = NaiveDate::parse_from_str(date_raw.trim(), "%Y-%m-%d") else {
            tracing::debug!(date = %date_raw, "skipping filing with unparsable date");
            continue;
        };
        if date < since {
            continue;
        }
        let description = recent
            .primary_doc_description
            .get(i)
            .map(String::as_str)
            .unwrap_or_default();
        if is_material(form, description, rules) {
            let desc = if description.trim().is_empty() { "(no description)" } else { description.trim() };
            out.push(format!("FILING {form} filed {date}: {desc}"));
        }
    }
    out
}

pub struct FilingChecker {
    fetch: Arc<dyn Fetch>,
    entity: EntityRules,
    rules: FilingRules,
}

impl FilingChecker {
    pub fn new(fetch: Arc<dyn Fetch>, entity: EntityRules, rules: FilingRules) -> Self {
        Self {
            fetch,
            entity,
            rules,
        }
    }
}

#[async_trait]
impl SignalChecker for FilingChecker {
    async fn check(&self, last_check: DateTime<Utc>) -> Result<Vec<Alert>> {
        let url = self.rules.index_url_for(&self.entity);
        let body = self
            .fetch
            .get_text(&url)
            .await
            .context("fetching submissions index")?;
        let recent = parse_recent(&body)?;
        Ok(material_filings(&recent, last_check.date_naive(), &self.rules)
            .into_iter()
            .map(|text| Alert::new(AlertCategory::Filing, format!("{} {text}", self.entity.ticker)))
            .collect())
    }

    fn name(&self) -> &'static str {
        "filings"
    }
}
