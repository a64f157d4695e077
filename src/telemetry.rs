// src/telemetry.rs
use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::path::Path;

/// One-time metric descriptions so every series carries help text.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("checker_runs_total", "Checker invocations.");
        describe_counter!(
            "checker_errors_total",
            "Checker fetch/parse failures (zero alerts contributed)."
        );
        describe_counter!("alerts_total", "Alerts produced, by category.");
        describe_counter!("digest_sent_total", "Digests handed to delivery.");
        describe_counter!("digest_failures_total", "Digest delivery failures.");
        describe_histogram!("checker_duration_ms", "Checker wall time in milliseconds.");
        describe_gauge!("last_run_ts", "Unix ts of the last completed run.");
    });
}

/// Install a Prometheus recorder without a listener; see `write_textfile`.
pub fn install() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("prometheus: install recorder")?;
    ensure_metrics_described();
    Ok(handle)
}

/// Write the exposition text for a node-exporter textfile collector (tmp + rename).
pub fn write_textfile(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let tmp = path.with_extension("prom.tmp");
    std::fs::write(&tmp, handle.render())
        .with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("renaming to {}", path.display()))?;
    Ok(())
}
