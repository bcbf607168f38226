//! Event log - structured harness events stored in DuckDB
//!
//! Events are kept in `logs.duckdb` inside the harness directory. Only
//! operational metadata is recorded: event name, strategy name, command and
//! error text. Query results, account identifiers and database secrets are
//! never written.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::log_migrations::LOG_MIGRATIONS;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Current unix time in milliseconds; zero if the clock is before the epoch
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Timestamp in the low 48 bits, per-millisecond counter in the high 16
fn generate_id() -> u64 {
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    ((now_ms() as u64) << 16) | counter
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// An event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            strategy: None,
            command: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Set the query strategy that served the request
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub strategy: Option<String>,
    pub command: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

const ENTRY_COLUMNS: &str = "id, timestamp, app_version, platform, event, strategy, command, \
                             error_message, error_details";

/// Service for structured event logging
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in `harness_dir` and apply pending
    /// migrations
    pub fn new(harness_dir: &Path, app_version: impl Into<String>) -> Result<Self> {
        let db_path = harness_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;

        let service = Self {
            conn: Mutex::new(conn),
            db_path,
            app_version: app_version.into(),
            platform: detect_platform(),
        };

        service.run_migrations()?;

        Ok(service)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("event log lock poisoned: {}", e))
    }

    /// Apply embedded migrations not yet listed in `sys_migrations`.
    ///
    /// The bookkeeping table comes from the first migration, so an empty
    /// database has nothing applied.
    fn run_migrations(&self) -> Result<()> {
        let conn = self.lock()?;

        let has_bookkeeping = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM information_schema.tables \
                 WHERE table_name = 'sys_migrations'",
                [],
                |row| row.get::<_, bool>(0),
            )
            .unwrap_or(false);

        let applied: Vec<String> = if has_bookkeeping {
            let mut stmt = conn.prepare("SELECT migration_name FROM sys_migrations")?;
            let names = stmt.query_map([], |row| row.get(0))?;
            names.collect::<duckdb::Result<_>>()?
        } else {
            Vec::new()
        };

        for (name, sql) in LOG_MIGRATIONS {
            if applied.iter().any(|a| a == name) {
                continue;
            }
            conn.execute_batch(sql)
                .with_context(|| format!("event log migration {} failed", name))?;
            conn.execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
        }

        Ok(())
    }

    /// Record an event; version, platform and timestamp are filled in here
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            &format!(
                "INSERT INTO sys_logs ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                ENTRY_COLUMNS
            ),
            duckdb::params![
                generate_id(),
                now_ms(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.strategy,
                &event.command,
                &event.error_message,
                &event.error_details,
            ],
        )?;

        Ok(())
    }

    fn query_entries(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_logs {} ORDER BY timestamp DESC, id DESC LIMIT ?",
            ENTRY_COLUMNS, filter
        ))?;

        let entries = stmt
            .query_map([limit as i64], |row| {
                Ok(LogEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    app_version: row.get(2)?,
                    platform: row.get(3)?,
                    event: row.get(4)?,
                    strategy: row.get(5)?,
                    command: row.get(6)?,
                    error_message: row.get(7)?,
                    error_details: row.get(8)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    /// Most recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query_entries("", limit)
    }

    /// Most recent entries that carry an error
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query_entries("WHERE error_message IS NOT NULL", limit)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Delete entries older than `timestamp_ms` (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_logging_service_creation() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "1.0.0").unwrap();

        assert!(service.db_path().exists());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let dir = tempdir().unwrap();
        {
            let service = LoggingService::new(dir.path(), "1.0.0").unwrap();
            service.log(LogEvent::new("first")).unwrap();
        }
        let service = LoggingService::new(dir.path(), "1.0.1").unwrap();
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_log_with_context() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "2.0.0").unwrap();

        service
            .log(
                LogEvent::new("summary_completed")
                    .with_strategy("LocalPostgres(localhost:5432/event_history)")
                    .with_command("summary"),
            )
            .unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "summary_completed");
        assert_eq!(
            entries[0].strategy.as_deref(),
            Some("LocalPostgres(localhost:5432/event_history)")
        );
        assert_eq!(entries[0].command.as_deref(), Some("summary"));
        assert_eq!(entries[0].app_version, "2.0.0");
    }

    #[test]
    fn test_errors_are_listed_separately() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "1.0.0").unwrap();

        service.log(LogEvent::new("command_executed").with_command("stats")).unwrap();
        service
            .log(
                LogEvent::new("summary_failed")
                    .with_error("Database query timeout (>10s)")
                    .with_error_details("timeout"),
            )
            .unwrap();

        let errors = service.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "summary_failed");
        assert_eq!(errors[0].error_details.as_deref(), Some("timeout"));
        assert_eq!(service.get_recent(10).unwrap().len(), 2);
    }

    #[test]
    fn test_count_and_delete() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "1.0.0").unwrap();

        for event in ["event1", "event2", "event3"] {
            service.log(LogEvent::new(event)).unwrap();
        }

        assert_eq!(service.count().unwrap(), 3);
        assert_eq!(service.delete_before(0).unwrap(), 0);

        let deleted = service.delete_before(now_ms() + 1000).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(service.count().unwrap(), 0);
    }
}
