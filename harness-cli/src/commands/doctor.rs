//! Doctor command - transaction store health checks

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Color};
use harness_core::LogEvent;
use serde_json::Value;

use super::{get_context, get_logger, log_event};
use crate::output;

/// Format a detail JSON value for display
fn format_detail(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                _ => format!("{}: {}", k, v),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

pub async fn run(prefer_local: Option<bool>, verbose: bool, json: bool) -> Result<ExitCode> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("doctor"));

    let ctx = get_context(prefer_local).await?;
    let result = ctx.doctor_service.run_checks().await?;

    if result.summary.errors > 0 {
        log_event(
            &logger,
            LogEvent::new("doctor_failed")
                .with_command("doctor")
                .with_strategy(&result.strategy)
                .with_error(format!("{} check(s) failed", result.summary.errors)),
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", "Transaction Store Health Check".bold());
        println!("Strategy: {}", result.strategy.dimmed());
        println!();

        let mut table = output::create_table();
        table.set_header(vec!["Check", "Status", "Message"]);

        for (check_name, check_result) in &result.checks {
            let status_cell = match check_result.status.as_str() {
                "pass" => Cell::new("PASS").fg(Color::Green),
                "warning" => Cell::new("WARN").fg(Color::Yellow),
                "error" => Cell::new("ERROR").fg(Color::Red),
                _ => Cell::new(&check_result.status),
            };

            table.add_row(vec![
                Cell::new(check_name),
                status_cell,
                Cell::new(&check_result.message),
            ]);

            if verbose {
                for detail in check_result.details.iter().flatten() {
                    table.add_row(vec![
                        Cell::new(""),
                        Cell::new(""),
                        Cell::new(format!("  - {}", format_detail(detail))),
                    ]);
                }
            }
        }

        println!("{}", table);
        println!();
        println!(
            "Summary: {} passed, {} warnings, {} errors",
            result.summary.passed.to_string().green(),
            result.summary.warnings.to_string().yellow(),
            result.summary.errors.to_string().red(),
        );
    }

    Ok(if result.summary.errors > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
