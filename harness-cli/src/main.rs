//! TMS harness CLI - query the transaction-monitoring service's history

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{doctor, logs, query, stats, strategy, summary};

/// TMS harness - inspect what the monitoring service has recorded
#[derive(Parser)]
#[command(name = "tms-harness", version, about, long_about = None)]
struct Cli {
    /// Query the database directly instead of through its container
    /// (default: USE_LOCAL_POSTGRES)
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show debtor and creditor summaries of transfer requests
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show dashboard statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Execute SQL against the transaction history
    Query {
        /// SQL query to execute
        sql: Option<String>,
        /// Read SQL from file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Comma-separated fields
        #[arg(long)]
        csv: bool,
    },

    /// Run transaction store health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which query strategy would be used
    Strategy {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let prefer_local = cli.local.then_some(true);

    match cli.command {
        Commands::Summary { json } => summary::run(prefer_local, json).await,
        Commands::Stats { json } => stats::run(prefer_local, json).await,
        Commands::Query { sql, file, csv } => {
            query::run(prefer_local, sql.as_deref(), file.as_deref(), csv).await
        }
        Commands::Doctor { verbose, json } => doctor::run(prefer_local, verbose, json).await,
        Commands::Strategy { json } => strategy::run(prefer_local, json).await,
        Commands::Logs { command } => logs::run(command),
    }
}
