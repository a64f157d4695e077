//! One poll-diff-alert cycle: load state, run every checker, send one digest,
//! persist the new last-check timestamp.
//!
//! No failure below this point aborts the run; state is always saved.

use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};

use crate::alert::Alert;
use crate::checks::SignalChecker;
use crate::notify::{Digest, Notifier};
use crate::state::StateStore;

#[derive(Debug, Clone)]
pub struct RunReport {
    /// The window start used by the checkers.
    pub last_check: DateTime<Utc>,
    /// In checker order, then result order.
    pub alerts: Vec<Alert>,
    pub failed_checkers: Vec<&'static str>,
    pub dispatched: bool,
    pub delivery_error: Option<String>,
    pub saved_at: DateTime<Utc>,
    pub state_saved: bool,
}

pub struct Runner {
    checkers: Vec<Box<dyn SignalChecker>>,
    notifier: Box<dyn Notifier>,
    store: StateStore,
    entity: String,
}

impl Runner {
    pub fn new(
        checkers: Vec<Box<dyn SignalChecker>>,
        notifier: Box<dyn Notifier>,
        store: StateStore,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            checkers,
            notifier,
            store,
            entity: entity.into(),
        }
    }

    pub async fn run_once(&self) -> RunReport {
        crate::telemetry::ensure_metrics_described();

        let state = self.store.load(Utc::now()).await;
        tracing::info!(last_check = %state.last_check.to_rfc3339(), checkers = self.checkers.len(), "run start");

        let (alerts, failed_checkers) = collect_alerts(&self.checkers, state.last_check).await;

        let mut dispatched = false;
        let mut delivery_error = None;
        if alerts.is_empty() {
            tracing::info!("no alerts, nothing to send");
        } else {
            let digest = Digest::new(self.entity.clone(), Utc::now(), alerts.clone());
            dispatched = true;
            match self.notifier.send(&digest).await {
                Ok(()) => {
                    counter!("digest_sent_total").increment(1);
                }
                Err(e) => {
                    tracing::error!(error = ?e, alerts = alerts.len(), "digest delivery failed");
                    counter!("digest_failures_total").increment(1);
                    delivery_error = Some(format!("{e:#}"));
                }
            }
        }

        // Run completion, not alert content, decides the next window.
        let saved_at = Utc::now();
        let state_saved = self.store.save(saved_at).await;
        gauge!("last_run_ts").set(saved_at.timestamp() as f64);

        tracing::info!(
            alerts = alerts.len(),
            failed = failed_checkers.len(),
            dispatched,
            state_saved,
            state_path = %self.store.path().display(),
            "run complete"
        );

        RunReport {
            last_check: state.last_check,
            alerts,
            failed_checkers,
            dispatched,
            delivery_error,
            saved_at,
            state_saved,
        }
    }
}

/// Runs checkers sequentially; a failing checker contributes nothing.
pub async fn collect_alerts(
    checkers: &[Box<dyn SignalChecker>],
    last_check: DateTime<Utc>,
) -> (Vec<Alert>, Vec<&'static str>) {
    let mut alerts = Vec::new();
    let mut failed = Vec::new();
    for c in checkers {
        let t0 = std::time::Instant::now();
        counter!("checker_runs_total", "checker" => c.name()).increment(1);
        let res = c.check(last_check).await;
        histogram!("checker_duration_ms", "checker" => c.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);

        match res {
            Ok(found) => {
                tracing::info!(checker = c.name(), alerts = found.len(), "checker done");
                for a in &found {
                    counter!("alerts_total", "category" => a.category.as_str()).increment(1);
                }
                alerts.extend(found);
            }
            Err(e) => {
                tracing::warn!(checker = c.name(), error = ?e, "checker failed");
                counter!("checker_errors_total", "checker" => c.name()).increment(1);
                failed.push(c.name());
            }
        }
    }
    (alerts, failed)
}
