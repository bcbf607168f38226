//! Stats command - dashboard statistics

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use harness_core::LogEvent;

use super::{get_context, get_logger, log_event};
use crate::output;

pub async fn run(prefer_local: Option<bool>, json: bool) -> Result<ExitCode> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("stats"));

    let ctx = get_context(prefer_local).await?;
    let stats = ctx.query_service.get_stats().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Dashboard Statistics".bold());
    println!("Strategy: {}", ctx.query_service.strategy_name().dimmed());
    println!();

    if stats.total_tests == 0 {
        output::warning("No messages recorded (or the store could not be read)");
    }

    let mut table = output::create_table();
    table.add_row(vec!["Messages recorded".to_string(), stats.total_tests.to_string()]);
    table.add_row(vec!["Successful".to_string(), stats.success_count.to_string()]);
    table.add_row(vec!["Failed".to_string(), stats.failure_count.to_string()]);
    table.add_row(vec!["Success rate".to_string(), format!("{:.1}%", stats.success_rate)]);
    table.add_row(vec!["Average amount".to_string(), output::format_amount(stats.avg_amount)]);
    if let Some(latest) = &stats.latest_transaction {
        table.add_row(vec!["Latest message".to_string(), latest.clone()]);
    }
    println!("{}", table);

    if !stats.tests_by_type.is_empty() {
        println!();
        println!("{}", "By message type".bold());
        for (label, counts) in &stats.tests_by_type {
            println!("  • {}: {}", label, counts.count);
        }
    }

    Ok(ExitCode::SUCCESS)
}
