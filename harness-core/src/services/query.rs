//! Query service - counterparty summaries, dashboard stats, raw SQL

use std::sync::Arc;

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use tracing::{debug, warn};

use crate::domain::result::{Error, FailureKind, Result};
use crate::domain::{
    parse_tabular_result, MessageType, QueryFailure, StatsSummary, SummaryResult,
    TransactionSummary,
};
use crate::ports::{QueryOutput, QueryStrategy};

/// Rows returned per counterparty list
pub const SUMMARY_LIMIT: usize = 20;

/// Aggregate transfer requests per party in `column` (`source` or `destination`).
///
/// Filtered to the transfer request type: status reports repeat the amount
/// with a different party mapping and would be counted twice.
pub fn counterparty_query(column: &str) -> String {
    format!(
        "SELECT {column} AS account, COUNT(*) AS tx_count, SUM(amt) AS total_amount \
         FROM transaction \
         WHERE {column} IS NOT NULL AND {column} != '' \
         AND txtp = '{txtp}' \
         GROUP BY {column} \
         ORDER BY tx_count DESC \
         LIMIT {limit};",
        column = column,
        txtp = MessageType::TRANSFER_REQUEST.code(),
        limit = SUMMARY_LIMIT,
    )
}

pub fn total_query() -> String {
    format!(
        "SELECT COUNT(*) AS total FROM transaction WHERE txtp = '{}';",
        MessageType::TRANSFER_REQUEST.code()
    )
}

/// One row: total, a count per [`MessageType::ALL`], average amount, latest
/// creation time
pub fn stats_query() -> String {
    let per_type: Vec<String> = MessageType::ALL
        .iter()
        .map(|t| {
            format!(
                "COUNT(CASE WHEN txtp = '{}' THEN 1 END) AS {}_count",
                t.code(),
                t.label().replace('.', "")
            )
        })
        .collect();

    format!(
        "SELECT COUNT(*) AS total_count, {}, AVG(amt) AS avg_amount, \
         MAX(credttm) AS latest_transaction FROM transaction;",
        per_type.join(", ")
    )
}

/// Check SQL syntax before handing it to the query client
fn validate_sql_syntax(sql: &str) -> Result<()> {
    let dialect = PostgreSqlDialect {};
    Parser::parse_sql(&dialect, sql).map_err(|e| {
        let msg = e.to_string();
        Error::Syntax(msg.trim_start_matches("sql parser error: ").to_string())
    })?;
    Ok(())
}

/// Query service over a replaceable strategy
///
/// Every call is a live, self-contained round-trip. `set_strategy` takes
/// `&mut self`, so swapping the strategy cannot overlap a running call on the
/// same service; callers sharing a service must serialize swaps themselves.
pub struct QueryService {
    strategy: Arc<dyn QueryStrategy>,
}

impl QueryService {
    pub fn new(strategy: Arc<dyn QueryStrategy>) -> Self {
        Self { strategy }
    }

    /// Switch the query strategy at runtime
    pub fn set_strategy(&mut self, strategy: Arc<dyn QueryStrategy>) {
        debug!(from = %self.strategy.name(), to = %strategy.name(), "switching strategy");
        self.strategy = strategy;
    }

    pub fn strategy(&self) -> &Arc<dyn QueryStrategy> {
        &self.strategy
    }

    pub fn strategy_name(&self) -> String {
        self.strategy.name()
    }

    /// Execute arbitrary SQL after a syntax check
    pub async fn execute(&self, sql: &str, csv_mode: bool) -> Result<QueryOutput> {
        validate_sql_syntax(sql)?;
        self.strategy.execute(sql, csv_mode).await
    }

    /// Debtor and creditor aggregates plus the transfer request total.
    ///
    /// The three queries run in order and the first failure ends the request.
    /// Never panics and never returns a bare error.
    pub async fn get_transaction_summary(&self) -> SummaryResult {
        match self.try_transaction_summary().await {
            Ok(summary) => SummaryResult::Success(summary),
            Err(failure) => {
                warn!(
                    strategy = %failure.strategy,
                    kind = ?failure.kind,
                    message = %failure.message,
                    "transaction summary failed"
                );
                SummaryResult::Error(failure)
            }
        }
    }

    async fn try_transaction_summary(
        &self,
    ) -> std::result::Result<TransactionSummary, QueryFailure> {
        let debtors = self
            .run_step("Debtor", &counterparty_query("source"), true)
            .await?;
        let creditors = self
            .run_step("Creditor", &counterparty_query("destination"), true)
            .await?;
        let total = self.run_step("Total", &total_query(), false).await?;

        let total = total.trim();
        let total_transactions = if total.is_empty() {
            0
        } else {
            total.parse::<u64>().map_err(|_| {
                let err = Error::Parse(format!("unexpected total count output: {}", total));
                self.failure(err.failure_kind(), err.to_string())
            })?
        };

        Ok(TransactionSummary {
            total_transactions,
            debtors: parse_tabular_result(&debtors),
            creditors: parse_tabular_result(&creditors),
            strategy: self.strategy.name(),
        })
    }

    /// Run one summary query, returning stdout on a zero exit
    async fn run_step(
        &self,
        label: &str,
        query: &str,
        csv_mode: bool,
    ) -> std::result::Result<String, QueryFailure> {
        let output = self
            .strategy
            .execute(query, csv_mode)
            .await
            .map_err(|e| self.failure(e.failure_kind(), e.to_string()))?;

        if !output.success() {
            return Err(self.failure(
                FailureKind::Execution,
                format!("{} query failed: {}", label, output.stderr.trim()),
            ));
        }

        Ok(output.stdout)
    }

    fn failure(&self, kind: FailureKind, message: String) -> QueryFailure {
        QueryFailure {
            kind,
            message,
            strategy: self.strategy.name(),
        }
    }

    /// Dashboard statistics; all zero when the store cannot be read
    pub async fn get_stats(&self) -> StatsSummary {
        match self.strategy.execute(&stats_query(), true).await {
            Ok(output) if output.success() => {
                let row = output
                    .stdout
                    .lines()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or("");
                StatsSummary::from_row(row)
            }
            Ok(output) => {
                warn!(
                    strategy = %self.strategy.name(),
                    exit_code = output.exit_code,
                    stderr = %output.stderr.trim(),
                    "stats query failed"
                );
                StatsSummary::default()
            }
            Err(e) => {
                warn!(strategy = %self.strategy.name(), error = %e, "stats query failed");
                StatsSummary::default()
            }
        }
    }
}
