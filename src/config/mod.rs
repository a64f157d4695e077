// src/config/mod.rs
pub mod rules;

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use rules::Rules;

pub const ENV_RULES_PATH: &str = "SENTINEL_RULES_PATH";
pub const DEFAULT_STATE_PATH: &str = "state/last_check.json";
const DEFAULT_USER_AGENT: &str = "ticker-sentinel/0.1 (ops@example.com)";

/// Load rules from an explicit path. Supports TOML or JSON formats.
pub fn load_rules_from(path: &Path) -> Result<Rules> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading rules from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_rules(&content, ext.as_str())
}

/// Load rules using env var + fallbacks:
/// 1) $SENTINEL_RULES_PATH
/// 2) config/sentinel.toml
/// 3) config/sentinel.json
/// 4) built-in defaults
pub fn load_rules_default() -> Result<Rules> {
    if let Ok(p) = std::env::var(ENV_RULES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_rules_from(&pb);
        }
        return Err(anyhow!("{ENV_RULES_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/sentinel.toml");
    if toml_p.exists() {
        return load_rules_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sentinel.json");
    if json_p.exists() {
        return load_rules_from(&json_p);
    }
    Ok(Rules::default())
}

fn parse_rules(s: &str, hint_ext: &str) -> Result<Rules> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing rules json");
    }
    match toml::from_str::<Rules>(s) {
        Ok(r) => Ok(r),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported rules format: {toml_err}")),
    }
}

/// Out-of-band runtime values: paths, credentials, network settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub state_path: PathBuf,
    pub http_timeout: Duration,
    /// Descriptive client label; EDGAR rejects anonymous clients.
    pub user_agent: String,
    pub news_api_key: Option<String>,
    pub alpha_vantage_key: Option<String>,
    pub metrics_textfile: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            http_timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            news_api_key: None,
            alpha_vantage_key: None,
            metrics_textfile: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            state_path: env_non_empty("SENTINEL_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(d.state_path),
            http_timeout: env_non_empty("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(d.http_timeout),
            user_agent: env_non_empty("SEC_USER_AGENT").unwrap_or(d.user_agent),
            news_api_key: env_non_empty("NEWS_API_KEY"),
            alpha_vantage_key: env_non_empty("ALPHA_VANTAGE_API_KEY"),
            metrics_textfile: env_non_empty("METRICS_TEXTFILE_PATH").map(PathBuf::from),
        }
    }
}

pub(crate) fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
