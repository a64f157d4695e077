// src/checks/mod.rs
pub mod filings;
pub mod insider;
pub mod news;
pub mod price;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::alert::Alert;

pub use filings::FilingChecker;
pub use insider::InsiderChecker;
pub use news::NewsChecker;
pub use price::PriceChecker;

/// One external signal mapped to zero or more alerts.
/// Checkers keep no state between runs; errors are contained by the runner.
#[async_trait::async_trait]
pub trait SignalChecker: Send + Sync {
    async fn check(&self, last_check: DateTime<Utc>) -> Result<Vec<Alert>>;
    fn name(&self) -> &'static str;
}
