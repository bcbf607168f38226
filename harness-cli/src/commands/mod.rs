//! CLI command implementations

pub mod doctor;
pub mod logs;
pub mod query;
pub mod stats;
pub mod strategy;
pub mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use harness_core::config::Config;
use harness_core::{HarnessContext, LogEvent, LoggingService};

/// Get the event log for CLI operations
///
/// Returns None if the log cannot be opened (logging never blocks a command)
pub fn get_logger() -> Option<LoggingService> {
    let harness_dir = get_harness_dir().ok()?;
    std::fs::create_dir_all(&harness_dir).ok()?;
    LoggingService::new(&harness_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::debug!(error = %e, "event log write failed");
        }
    }
}

/// Harness directory from `TMS_HARNESS_DIR` or `~/.tms-harness`
pub fn get_harness_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TMS_HARNESS_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".tms-harness"))
        .context("Could not find home directory; set TMS_HARNESS_DIR")
}

/// Read configuration and select the query strategy
pub async fn get_context(prefer_local: Option<bool>) -> Result<HarnessContext> {
    let config = Config::from_env().context("Invalid harness configuration")?;
    HarnessContext::new(config, prefer_local)
        .await
        .context("Failed to initialize query strategy")
}
