//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, not on how a query reaches the database.

mod query_strategy;

pub use query_strategy::{QueryOutput, QueryStrategy, StrategyKind};
