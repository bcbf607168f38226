//! Aggregated counterparty rows parsed from tuple-only query output

use serde::{Deserialize, Serialize};

/// One counterparty aggregate: how many transfers and how much money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub account: String,
    pub tx_count: u64,
    pub total_amount: f64,
}

impl TransactionRecord {
    /// Parse a single `account,count[,amount]` line.
    ///
    /// Returns `None` for lines that are not a record: no delimiter, fewer
    /// than two fields, or a numeric field that is present but unreadable.
    /// Empty or missing numeric fields become zero.
    pub fn from_line(line: &str) -> Option<Self> {
        if line.is_empty() || !line.contains(',') {
            return None;
        }

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 2 {
            return None;
        }

        Some(Self {
            account: parts[0].to_string(),
            tx_count: parse_field(parts[1])?,
            total_amount: match parts.get(2) {
                Some(p) => parse_field(p)?,
                None => 0.0,
            },
        })
    }
}

/// Zero for an empty field (psql prints NULL that way), `None` for garbage
fn parse_field<T: std::str::FromStr + Default>(field: &str) -> Option<T> {
    let field = field.trim();
    if field.is_empty() {
        return Some(T::default());
    }
    field.parse().ok()
}

/// Parse comma-delimited tuple-only output into records.
///
/// Blank lines and malformed partial rows are skipped so they cannot corrupt
/// the aggregate lists.
pub fn parse_tabular_result(raw: &str) -> Vec<TransactionRecord> {
    raw.trim()
        .lines()
        .filter_map(TransactionRecord::from_line)
        .collect()
}
