//! Harness Core - query layer for the transaction-monitoring test harness
//!
//! Follows a hexagonal layout:
//!
//! - **domain**: records, summaries, message types, errors
//! - **ports**: the `QueryStrategy` trait
//! - **adapters**: container (`docker exec`) and direct (`psql`) strategies
//! - **services**: query service, strategy selection, health checks, event log

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::sync::Arc;

use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, FailureKind, Result};
pub use domain::{
    parse_tabular_result, MessageType, QueryFailure, StatsSummary, SummaryResult,
    TransactionRecord, TransactionSummary,
};
pub use ports::{QueryOutput, QueryStrategy, StrategyKind};
pub use services::{LogEvent, LoggingService};

/// Main context for harness operations
///
/// Holds the configuration and the services bound to the selected strategy.
pub struct HarnessContext {
    pub config: Config,
    pub query_service: QueryService,
    pub doctor_service: DoctorService,
}

impl HarnessContext {
    /// Select a strategy and build the services around it.
    ///
    /// `prefer_local` of `None` falls back to `config.prefer_local`.
    pub async fn new(config: Config, prefer_local: Option<bool>) -> Result<Self> {
        let prefer_local = prefer_local.unwrap_or(config.prefer_local);
        let strategy = create_strategy(&config, prefer_local).await?;

        Ok(Self {
            query_service: QueryService::new(Arc::clone(&strategy)),
            doctor_service: DoctorService::new(strategy),
            config,
        })
    }
}
