//! Insider transactions from the EDGAR ownership (Form 4) feed.
//!
//! Feed entries are "new" at day granularity: an entry dated on the same
//! calendar day as the last check is re-examined on the next run.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::sync::Arc;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::alert::{Alert, AlertCategory};
use crate::checks::SignalChecker;
use crate::config::rules::{EntityRules, InsiderRules};
use crate::fetch::Fetch;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    link: Option<AtomLink>,
    updated: Option<String>,
    category: Option<AtomCategory>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: String,
}

#[derive(Debug, Deserialize)]
struct AtomCategory {
    #[serde(rename = "@term")]
    term: String,
}

/// A feed entry reduced to what the checker needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub form: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Calendar date of an RFC 3339 timestamp, in the timestamp's own offset.
fn parse_entry_date(ts: &str) -> Option<NaiveDate> {
    let dt = OffsetDateTime::parse(ts.trim(), &Rfc3339).ok()?;
    NaiveDate::from_ymd_opt(dt.year(), u8::from(dt.month()) as u32, dt.day() as u32)
}

pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let feed: AtomFeed = from_str(xml).context("parsing ownership atom feed")?;
    Ok(feed
        .entry
        .into_iter()
        .filter_map(|e| {
            let link = e.link?.href;
            Some(FeedEntry {
                title: e.title.unwrap_or_default(),
                link,
                form: e.category.map(|c| c.term),
                date: e.updated.as_deref().and_then(parse_entry_date),
            })
        })
        .collect())
}

/// Ownership filing dated on or after `since`. Undated entries are skipped.
pub fn is_new_ownership_filing(entry: &FeedEntry, since: NaiveDate, rules: &InsiderRules) -> bool {
    let by_form = entry
        .form
        .as_deref()
        .is_some_and(|f| rules.ownership_forms.iter().any(|o| o == f.trim()));
    let by_link = !rules.link_marker.is_empty()
        && entry
            .link
            .to_ascii_lowercase()
            .contains(&rules.link_marker.to_ascii_lowercase());
    (by_form || by_link) && entry.date.is_some_and(|d| d >= since)
}

/// EDGAR index pages link to `...-index.htm`; the full submission sits next
/// to it as `.txt` and embeds the ownership XML.
pub fn filing_text_url(link: &str) -> String {
    for suffix in ["-index.html", "-index.htm"] {
        if let Some(base) = link.strip_suffix(suffix) {
            return format!("{base}.txt");
        }
    }
    link.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnershipDocument {
    #[serde(default)]
    reporting_owner: Vec<ReportingOwner>,
    non_derivative_table: Option<NonDerivativeTable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportingOwner {
    reporting_owner_id: ReportingOwnerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportingOwnerId {
    rpt_owner_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NonDerivativeTable {
    #[serde(default)]
    non_derivative_transaction: Vec<NonDerivativeTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NonDerivativeTransaction {
    transaction_coding: Option<TransactionCoding>,
    transaction_amounts: TransactionAmounts,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionCoding {
    transaction_form_type: Option<String>,
    transaction_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionAmounts {
    transaction_shares: ValueField,
    transaction_acquired_disposed_code: Option<ValueField>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: String,
}

/// First non-derivative transaction of a Form 4, with a signed share delta.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipSummary {
    pub owner: String,
    pub form_type: String,
    pub transaction_code: String,
    /// Negative when the shares were disposed of.
    pub share_delta: f64,
}

/// `Ok(None)` for well-formed filings with no non-derivative transaction
/// (option grants, holdings-only reports).
pub fn parse_ownership(doc: &str) -> Result<Option<OwnershipSummary>> {
    let start = doc
        .find("<ownershipDocument")
        .ok_or_else(|| anyhow!("no ownershipDocument in filing"))?;
    let end_tag = "</ownershipDocument>";
    let end = doc[start..]
        .find(end_tag)
        .map(|i| start + i + end_tag.len())
        .ok_or_else(|| anyhow!("unterminated ownershipDocument"))?;

    let parsed: OwnershipDocument =
        from_str(&doc[start..end]).context("parsing ownershipDocument xml")?;

    let owner = parsed
        .reporting_owner
        .iter()
        .map(|o| o.reporting_owner_id.rpt_owner_name.trim())
        .collect::<Vec<_>>()
        .join(" / ");

    let Some(tx) = parsed
        .non_derivative_table
        .and_then(|t| t.non_derivative_transaction.into_iter().next())
    else {
        return Ok(None);
    };

    let shares: f64 = tx
        .transaction_amounts
        .transaction_shares
        .value
        .trim()
        .parse()
        .context("transaction shares not numeric")?;
    let disposed = tx
        .transaction_amounts
        .transaction_acquired_disposed_code
        .is_some_and(|c| c.value.trim().eq_ignore_ascii_case("D"));
    let coding = tx.transaction_coding;

    Ok(Some(OwnershipSummary {
        owner,
        form_type: coding
            .as_ref()
            .and_then(|c| c.transaction_form_type.clone())
            .unwrap_or_default(),
        transaction_code: coding
            .and_then(|c| c.transaction_code)
            .unwrap_or_default(),
        share_delta: if disposed { -shares } else { shares },
    }))
}

/// Alert text when the summary crosses the share threshold for a watched owner.
pub fn evaluate(summary: &OwnershipSummary, rules: &InsiderRules, ticker: &str) -> Option<String> {
    let shares = summary.share_delta.abs();
    if shares <= rules.share_threshold {
        return None;
    }
    // Raw substring match: name order, punctuation and case must line up.
    if !rules.watch_list.iter().any(|n| summary.owner.contains(n.as_str())) {
        return None;
    }
    // Keyed on the transaction code: transactionFormType is always "4" here.
    let is_purchase =
        summary.transaction_code.contains(rules.purchase_code.as_str()) && summary.share_delta > 0.0;
    let side = if is_purchase { "PURCHASE" } else { "SALE" };
    Some(format!(
        "INSIDER {side}: {} {ticker} {shares:.0} shares (Form {})",
        summary.owner,
        if summary.form_type.is_empty() { "4" } else { summary.form_type.as_str() },
    ))
}

pub struct InsiderChecker {
    fetch: Arc<dyn Fetch>,
    entity: EntityRules,
    rules: InsiderRules,
}

impl InsiderChecker {
    pub fn new(fetch: Arc<dyn Fetch>, entity: EntityRules, rules: InsiderRules) -> Self {
        Self {
            fetch,
            entity,
            rules,
        }
    }
}

#[async_trait]
impl SignalChecker for InsiderChecker {
    async fn check(&self, last_check: DateTime<Utc>) -> Result<Vec<Alert>> {
        let since = last_check.date_naive();
        let feed_url = self.rules.feed_url_for(&self.entity);
        let xml = self
            .fetch
            .get_text(&feed_url)
            .await
            .context("fetching ownership feed")?;
        let entries = parse_feed(&xml)?;

        let mut out = Vec::new();
        for entry in entries
            .iter()
            .filter(|e| is_new_ownership_filing(e, since, &self.rules))
        {
            let doc = self
                .fetch
                .get_text(&filing_text_url(&entry.link))
                .await
                .with_context(|| format!("fetching filing detail for {}", entry.title))?;
            let Some(summary) = parse_ownership(&doc)
                .with_context(|| format!("reading filing {}", entry.link))?
            else {
                tracing::debug!(link = %entry.link, "no non-derivative transaction, skipping");
                continue;
            };

            tracing::debug!(
                owner = %summary.owner,
                delta = summary.share_delta,
                code = %summary.transaction_code,
                "ownership filing"
            );

            if let Some(text) = evaluate(&summary, &self.rules, &self.entity.ticker) {
                out.push(Alert::new(
                    AlertCategory::Insider,
                    format!("{text}\n{}", entry.link),
                ));
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "insider"
    }
}
