//! Summary command - debtor and creditor aggregates of transfer requests

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use harness_core::{LogEvent, SummaryResult, TransactionRecord};

use super::{get_context, get_logger, log_event};
use crate::output;

fn records_table(title: &str, records: &[TransactionRecord]) {
    println!("{}", title.bold());
    if records.is_empty() {
        println!("  (none)");
        println!();
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Account", "Transactions", "Total amount"]);
    for record in records {
        table.add_row(vec![
            record.account.clone(),
            record.tx_count.to_string(),
            output::format_amount(record.total_amount),
        ]);
    }
    println!("{}", table);
    println!();
}

pub async fn run(prefer_local: Option<bool>, json: bool) -> Result<ExitCode> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("summary"));

    let ctx = get_context(prefer_local).await?;
    let result = ctx.query_service.get_transaction_summary().await;

    if let SummaryResult::Error(failure) = &result {
        log_event(
            &logger,
            LogEvent::new("summary_failed")
                .with_command("summary")
                .with_strategy(&failure.strategy)
                .with_error(&failure.message)
                .with_error_details(format!("{:?}", failure.kind)),
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(if result.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    match result {
        SummaryResult::Success(summary) => {
            println!("{}", "Transfer Request Summary".bold());
            println!("Strategy: {}", summary.strategy.dimmed());
            println!("Total transfer requests: {}", summary.total_transactions);
            println!();
            records_table("Top debtors", &summary.debtors);
            records_table("Top creditors", &summary.creditors);
            Ok(ExitCode::SUCCESS)
        }
        SummaryResult::Error(failure) => {
            output::error(&failure.message);
            eprintln!("Strategy: {}", failure.strategy);
            Ok(ExitCode::FAILURE)
        }
    }
}
