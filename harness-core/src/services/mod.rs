//! Service layer - business logic orchestration
//!
//! Services work against the [`QueryStrategy`](crate::ports::QueryStrategy)
//! port and never care which execution path is behind it.

mod doctor;
pub mod factory;
pub mod logging;
mod query;

pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use factory::{create_service, create_strategy, detect_container, select_mode};
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use query::{counterparty_query, stats_query, total_query, QueryService, SUMMARY_LIMIT};
