//! Logs command - view and manage the harness event log

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use harness_core::services::logging::now_ms;
use harness_core::LoggingService;

use super::get_harness_dir;
use crate::output;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// List recent events, newest first
    List {
        /// Maximum number of events
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only events that carry an error
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old events
    Clear {
        /// Age in days beyond which events are deleted
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show event counts and where the log is stored
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn get_logging_service() -> Result<LoggingService> {
    let harness_dir = get_harness_dir()?;
    std::fs::create_dir_all(&harness_dir)?;
    LoggingService::new(&harness_dir, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::{TimeZone, Utc};
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<ExitCode> {
    let service = get_logging_service()?;
    match command {
        LogsCommands::List { limit, errors, json } => list(&service, limit, errors, json)?,
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&service, older_than_days, force, json)?,
        LogsCommands::Stats { json } => stats(&service, json)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn list(service: &LoggingService, limit: usize, errors_only: bool, json: bool) -> Result<()> {
    let entries = if errors_only {
        service.get_errors(limit)?
    } else {
        service.get_recent(limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        output::info("Event log is empty.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Event", "Command", "Strategy", ""]);
    for entry in &entries {
        let flag = if entry.error_message.is_some() { "!".red().to_string() } else { String::new() };
        table.add_row(vec![
            format_timestamp(entry.timestamp),
            entry.event.clone(),
            entry.command.clone().unwrap_or_default(),
            entry.strategy.clone().unwrap_or_default(),
            flag,
        ]);
    }
    println!("{}", table);

    // Spell out the newest failures below the table
    let failed: Vec<_> = entries.iter().filter(|e| e.error_message.is_some()).take(3).collect();
    if !failed.is_empty() {
        println!();
        println!("{}", "Latest failures:".red().bold());
        for entry in failed {
            let message = entry.error_message.as_deref().unwrap_or_default();
            match &entry.error_details {
                Some(details) => println!(
                    "  {} {} ({}): {}",
                    format_timestamp(entry.timestamp).dimmed(),
                    entry.event,
                    details,
                    message
                ),
                None => println!(
                    "  {} {}: {}",
                    format_timestamp(entry.timestamp).dimmed(),
                    entry.event,
                    message
                ),
            }
        }
    }
    Ok(())
}

fn clear(service: &LoggingService, older_than_days: u64, force: bool, json: bool) -> Result<()> {
    let cutoff_ms = now_ms() - (older_than_days as i64 * DAY_MS);

    if !force && !json {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete event log entries older than {} days?", older_than_days))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Nothing deleted.");
            return Ok(());
        }
    }

    let deleted = service.delete_before(cutoff_ms)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        output::success(&format!("Deleted {} event log entries", deleted));
    }
    Ok(())
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let total = service.count()?;
    let failures = service.get_errors(1000)?.len();
    let path = service.db_path();
    let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    if json {
        let value = serde_json::json!({
            "total_entries": total,
            "error_count": failures,
            "database_path": path.to_string_lossy(),
            "database_size_bytes": size_bytes,
        });
        println!("{}", value);
        return Ok(());
    }

    let mut table = output::create_table();
    table.add_row(vec!["Entries".to_string(), total.to_string()]);
    table.add_row(vec!["With errors".to_string(), failures.to_string()]);
    table.add_row(vec!["Database".to_string(), path.display().to_string()]);
    table.add_row(vec!["Size".to_string(), output::format_size(size_bytes)]);
    println!("{}", "Event Log".bold());
    println!("{}", table);
    Ok(())
}
