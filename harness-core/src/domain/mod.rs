//! Core domain types
//!
//! Pure data structures and parsing - no I/O or external dependencies.

mod message_type;
mod record;
mod summary;
pub mod result;

pub use message_type::MessageType;
pub use record::{parse_tabular_result, TransactionRecord};
pub use summary::{QueryFailure, StatsSummary, SummaryResult, TransactionSummary, TypeCount};
