//! Strategy command - show how queries would reach the database

use std::process::ExitCode;

use anyhow::{Context, Result};
use harness_core::config::Config;
use harness_core::services::{detect_container, select_mode};
use harness_core::StrategyKind;
use serde_json::json;

use super::get_context;
use crate::output;

pub async fn run(prefer_local: Option<bool>, json: bool) -> Result<ExitCode> {
    let config = Config::from_env().context("Invalid harness configuration")?;
    let in_container = detect_container(&config);
    let mode = select_mode(&config, prefer_local.unwrap_or(config.prefer_local));

    // Building the context runs the same client check a real query would
    let selected = get_context(prefer_local)
        .await
        .map(|ctx| ctx.query_service.strategy_name());

    if json {
        let value = json!({
            "mode": mode,
            "in_container": in_container,
            "strategy": selected.as_ref().ok(),
            "error": selected.as_ref().err().map(|e| format!("{:#}", e)),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(if selected.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let mode_label = match mode {
        StrategyKind::Container => "container (docker exec)",
        StrategyKind::Direct => "direct (psql over the network)",
    };
    println!("Mode: {}", mode_label);
    if in_container {
        output::info("Running inside a container: direct mode forced");
    }

    match selected {
        Ok(name) => {
            output::success(&format!("Strategy: {}", name));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            output::error(&format!("{:#}", e));
            Ok(ExitCode::FAILURE)
        }
    }
}
