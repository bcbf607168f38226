//! Query command - execute SQL against the transaction history

use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use harness_core::LogEvent;

use super::{get_context, get_logger, log_event};
use crate::output;

pub async fn run(
    prefer_local: Option<bool>,
    sql: Option<&str>,
    file: Option<&Path>,
    csv: bool,
) -> Result<ExitCode> {
    // Get SQL from: argument, file, or stdin
    let sql_content = if let Some(sql) = sql {
        sql.to_string()
    } else if let Some(file_path) = file {
        std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read SQL file: {:?}", file_path))?
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read SQL from stdin")?;
        buffer
    } else {
        anyhow::bail!("No SQL query provided. Use positional argument, --file, or pipe from stdin.");
    };

    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("query"));

    let ctx = get_context(prefer_local).await?;
    let strategy = ctx.query_service.strategy_name();

    let result = match ctx.query_service.execute(&sql_content, csv).await {
        Ok(result) => result,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("query_failed")
                    .with_command("query")
                    .with_strategy(&strategy)
                    .with_error(e.to_string()),
            );
            return Err(e).context("Query failed");
        }
    };

    print!("{}", result.stdout);

    if !result.success() {
        log_event(
            &logger,
            LogEvent::new("query_failed")
                .with_command("query")
                .with_strategy(&strategy)
                .with_error(format!("exit code {}", result.exit_code)),
        );
        output::error(result.stderr.trim());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
