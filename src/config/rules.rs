// src/config/rules.rs
use serde::{Deserialize, Serialize};

/// Every threshold, keyword and watched name the checkers use.
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub entity: EntityRules,
    pub insider: InsiderRules,
    pub filings: FilingRules,
    pub news: NewsRules,
    pub price: PriceRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRules {
    /// Display name, also used in the news query.
    pub name: String,
    pub ticker: String,
    /// EDGAR central index key, zero padded to 10 digits when used in URLs.
    pub cik: String,
}

impl Default for EntityRules {
    fn default() -> Self {
        Self {
            name: "Apple".to_string(),
            ticker: "AAPL".to_string(),
            cik: "0000320193".to_string(),
        }
    }
}

impl EntityRules {
    pub fn cik_padded(&self) -> String {
        format!("{:0>10}", self.cik.trim())
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.ticker)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsiderRules {
    /// Alerts need |shares| strictly above this.
    pub share_threshold: f64,
    /// Raw substrings matched against the reporting owner name (case-sensitive).
    pub watch_list: Vec<String>,
    /// Feed category terms that mark a beneficial-ownership filing.
    pub ownership_forms: Vec<String>,
    /// Alternative marker looked for in the entry link (case-insensitive).
    pub link_marker: String,
    /// Transaction code that flags an open-market purchase.
    pub purchase_code: String,
    /// Overrides the EDGAR Atom feed derived from the entity CIK.
    pub feed_url: Option<String>,
}

impl Default for InsiderRules {
    fn default() -> Self {
        Self {
            share_threshold: 1000.0,
            watch_list: vec![
                "Cook Timothy".to_string(),
                "Maestri Luca".to_string(),
                "O'BRIEN DEIRDRE".to_string(),
                "WILLIAMS JEFFREY E".to_string(),
            ],
            ownership_forms: vec!["4".to_string(), "4/A".to_string()],
            link_marker: "form4".to_string(),
            purchase_code: "P".to_string(),
            feed_url: None,
        }
    }
}

impl InsiderRules {
    pub fn feed_url_for(&self, entity: &EntityRules) -> String {
        match &self.feed_url {
            Some(u) => u.clone(),
            None => format!(
                "https://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&CIK={}&type=4&dateb=&owner=include&count=40&output=atom",
                entity.cik_padded()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilingRules {
    /// Always alerts, whatever the description says.
    pub quarterly_form: String,
    /// Alerts only when the description mentions `earnings_keyword`.
    pub current_form: String,
    pub earnings_keyword: String,
    pub index_url: Option<String>,
}

impl Default for FilingRules {
    fn default() -> Self {
        Self {
            quarterly_form: "10-Q".to_string(),
            current_form: "8-K".to_string(),
            earnings_keyword: "earnings".to_string(),
            index_url: None,
        }
    }
}

impl FilingRules {
    pub fn index_url_for(&self, entity: &EntityRules) -> String {
        match &self.index_url {
            Some(u) => u.clone(),
            None => format!(
                "https://data.sec.gov/submissions/CIK{}.json",
                entity.cik_padded()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsRules {
    pub keywords: Vec<String>,
    pub max_articles: usize,
    /// Absolute compound score an article must exceed.
    pub sentiment_threshold: f32,
    pub language: String,
    pub endpoint: String,
}

impl Default for NewsRules {
    fn default() -> Self {
        Self {
            keywords: vec![
                "earnings".to_string(),
                "lawsuit".to_string(),
                "acquisition".to_string(),
                "guidance".to_string(),
                "downgrade".to_string(),
                "upgrade".to_string(),
                "recall".to_string(),
                "investigation".to_string(),
            ],
            max_articles: 10,
            sentiment_threshold: 0.3,
            language: "en".to_string(),
            endpoint: "https://newsapi.org/v2/everything".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceRules {
    /// Percent move (absolute) that triggers an alert, inclusive.
    pub pct_threshold: f64,
    pub endpoint: String,
}

impl Default for PriceRules {
    fn default() -> Self {
        Self {
            pct_threshold: 5.0,
            endpoint: "https://www.alphavantage.co/query".to_string(),
        }
    }
}
