//! Structured results handed to presentation layers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::message_type::MessageType;
use super::record::TransactionRecord;
use super::result::FailureKind;

/// Counterparty summary of transfer requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_transactions: u64,
    pub debtors: Vec<TransactionRecord>,
    pub creditors: Vec<TransactionRecord>,
    pub strategy: String,
}

/// A query round-trip that did not produce data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub kind: FailureKind,
    pub message: String,
    pub strategy: String,
}

/// Either a summary or a failure; never a panic or a bare error.
///
/// Serializes with a `status` tag of `success` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SummaryResult {
    Success(TransactionSummary),
    Error(QueryFailure),
}

impl SummaryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SummaryResult::Success(_))
    }

    /// Name of the strategy that served (or failed) the request
    pub fn strategy(&self) -> &str {
        match self {
            SummaryResult::Success(s) => &s.strategy,
            SummaryResult::Error(f) => &f.strategy,
        }
    }
}

/// Per message type counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    pub count: u64,
    pub success: u64,
}

/// Dashboard statistics
///
/// `Default` is the all-zero value shown whenever the store cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_tests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub success_rate: f64,
    pub avg_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_transaction: Option<String>,
    pub tests_by_type: BTreeMap<String, TypeCount>,
}

impl StatsSummary {
    /// Build stats from the single comma-delimited row of the stats query:
    /// `total, <count per MessageType::ALL>, avg_amount, latest`.
    ///
    /// Every stored message is treated as a success; the store has no
    /// failure outcome to join against.
    pub fn from_row(row: &str) -> Self {
        let row = row.trim();
        if row.is_empty() {
            return Self::default();
        }

        let parts: Vec<&str> = row.split(',').collect();
        let int_at = |i: usize| -> u64 {
            parts.get(i).and_then(|p| p.trim().parse().ok()).unwrap_or(0)
        };

        let total = int_at(0);

        let mut tests_by_type = BTreeMap::new();
        for (offset, message_type) in MessageType::ALL.iter().enumerate() {
            let count = int_at(offset + 1);
            if count > 0 {
                tests_by_type.insert(
                    message_type.label().to_string(),
                    TypeCount { count, success: count },
                );
            }
        }

        let avg_index = MessageType::ALL.len() + 1;
        let avg_amount = parts
            .get(avg_index)
            .and_then(|p| p.trim().parse::<f64>().ok())
            .map(|a| (a * 100.0).round() / 100.0)
            .unwrap_or(0.0);

        let latest_transaction = parts
            .get(avg_index + 1)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Self {
            total_tests: total,
            success_count: total,
            failure_count: 0,
            success_rate: if total > 0 { 100.0 } else { 0.0 },
            avg_amount,
            latest_transaction,
            tests_by_type,
        }
    }
}
