// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod alert;
pub mod app;
pub mod checks;
pub mod config;
pub mod fetch;
pub mod notify;
pub mod runner;
pub mod sentiment;
pub mod state;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::alert::{Alert, AlertCategory};
pub use crate::checks::SignalChecker;
pub use crate::notify::{Digest, Notifier, NotifierMux};
pub use crate::runner::{RunReport, Runner};
pub use crate::state::{RunState, StateStore};
