// src/state.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// The one fact carried between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub last_check: DateTime<Utc>,
}

impl RunState {
    /// Fallback when nothing usable is on disk: one day back from `now`.
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self {
            last_check: now - Duration::hours(24),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: missing or unreadable state means "no prior run".
    pub async fn load(&self, now: DateTime<Utc>) -> RunState {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no run state, using default");
                return RunState::default_at(now);
            }
        };
        match serde_json::from_str::<RunState>(&raw) {
            Ok(st) => st,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt run state, using default");
                RunState::default_at(now)
            }
        }
    }

    /// Overwrites the state record. Failures are logged, never returned.
    pub async fn save(&self, last_check: DateTime<Utc>) -> bool {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir).await {
                tracing::warn!("state dir: {e:#}");
            }
        }
        let body = match serde_json::to_vec_pretty(&RunState { last_check }) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("encode state: {e:#}");
                return false;
            }
        };
        match fs::write(&self.path, body).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "write state: {e:#}");
                false
            }
        }
    }
}
