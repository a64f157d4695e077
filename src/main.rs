//! ticker-sentinel: one poll-diff-alert cycle per invocation.
//! Meant to be driven by cron or a systemd timer; takes no arguments.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticker_sentinel::{app, config, telemetry};

/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// line-delimited JSON for log shippers.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ticker_sentinel=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let prom = match telemetry::install() {
        Ok(h) => Some(h),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let rules = config::load_rules_default()?;
    let settings = config::Settings::from_env();
    tracing::info!(
        entity = %rules.entity.label(),
        state = %settings.state_path.display(),
        "config loaded"
    );

    let runner = app::build_runner(&rules, &settings)?;
    let report = runner.run_once().await;
    if !report.failed_checkers.is_empty() {
        tracing::warn!(failed = ?report.failed_checkers, "some checkers contributed nothing");
    }

    if let (Some(handle), Some(path)) = (prom.as_ref(), settings.metrics_textfile.as_deref()) {
        if let Err(e) = telemetry::write_textfile(handle, path) {
            tracing::warn!(error = ?e, "metrics textfile not written");
        }
    }
    Ok(())
}
