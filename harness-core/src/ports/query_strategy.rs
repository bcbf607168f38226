//! Query strategy port - how a query reaches the transaction store

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::result::Result;

/// Raw outcome of one query client invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl QueryOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Which execution path a strategy uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Query client runs inside the database container
    Container,
    /// Query client connects to the database over the network
    Direct,
}

/// Executable query backend
///
/// Implementations run one query per call and keep no results between calls.
/// A non-zero client exit is reported through `QueryOutput::exit_code`, not
/// as an `Err`. Errors are reserved for timeouts and for clients that could
/// not be run at all.
#[async_trait]
pub trait QueryStrategy: Send + Sync {
    /// Run `query` with tuple-only, unaligned output; comma-separated fields
    /// when `csv_mode` is set
    async fn execute(&self, query: &str, csv_mode: bool) -> Result<QueryOutput>;

    /// Descriptive identifier for diagnostics
    fn name(&self) -> String;

    fn kind(&self) -> StrategyKind;
}
