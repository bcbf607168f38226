//! Result and error types for the core library

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// `Timeout` and `Transport` are kept apart from each other and from a
/// non-zero client exit (which is not an error at all, see
/// [`QueryOutput`](crate::ports::QueryOutput)).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database query timeout (>{}s)", .0.as_secs())]
    Timeout(Duration),

    #[error("Query client failed: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("SQL syntax error: {0}")]
    Syntax(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Classify this error for a structured failure result
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::Timeout(_) => FailureKind::Timeout,
            Error::Transport(_) => FailureKind::Transport,
            _ => FailureKind::Internal,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong when a query round-trip did not produce data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The query client exited non-zero
    Execution,
    /// The query did not finish within the configured bound
    Timeout,
    /// The query client could not be started or awaited
    Transport,
    /// Anything else, e.g. unreadable client output
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = Error::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Database query timeout (>10s)");
        assert_eq!(err.failure_kind(), FailureKind::Timeout);
    }

    #[test]
    fn test_failure_kinds_are_distinct() {
        assert_eq!(Error::transport("psql: not found").failure_kind(), FailureKind::Transport);
        assert_eq!(Error::Parse("bad".into()).failure_kind(), FailureKind::Internal);
        assert_ne!(FailureKind::Execution, FailureKind::Timeout);
    }

    #[test]
    fn test_failure_kind_serializes_lowercase() {
        let json = serde_json::to_string(&FailureKind::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
    }
}
