//! Doctor service - transaction store health checks

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::result::Result;
use crate::domain::MessageType;
use crate::ports::QueryStrategy;

/// Doctor service for health checks
pub struct DoctorService {
    strategy: Arc<dyn QueryStrategy>,
}

impl DoctorService {
    pub fn new(strategy: Arc<dyn QueryStrategy>) -> Self {
        Self { strategy }
    }

    /// Run one query and return trimmed stdout, or the reason it failed
    async fn scalar(&self, sql: &str) -> std::result::Result<String, String> {
        match self.strategy.execute(sql, false).await {
            Ok(output) if output.success() => Ok(output.stdout.trim().to_string()),
            Ok(output) => Err(output.stderr.trim().to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn count_type(&self, message_type: MessageType) -> std::result::Result<u64, String> {
        let raw = self
            .scalar(&format!(
                "SELECT COUNT(*) FROM transaction WHERE txtp = '{}';",
                message_type.code()
            ))
            .await?;
        raw.parse::<u64>()
            .map_err(|_| format!("unexpected count output: {}", raw))
    }

    /// Run all health checks
    pub async fn run_checks(&self) -> Result<DoctorResult> {
        let mut checks = BTreeMap::new();

        // Connectivity
        let connected = self.scalar("SELECT 1;").await;
        checks.insert(
            "connectivity".to_string(),
            match &connected {
                Ok(_) => CheckResult::pass("Database reachable"),
                Err(e) => CheckResult::error("Database unreachable", Some(vec![json!({"error": e})])),
            },
        );

        if connected.is_ok() {
            // Transaction table
            let table = self.scalar("SELECT COUNT(*) FROM transaction;").await;
            let table_ok = table.is_ok();
            checks.insert(
                "transaction_table".to_string(),
                match table {
                    Ok(count) => CheckResult::pass(format!("{} row(s) in transaction table", count)),
                    Err(e) => CheckResult::error(
                        "transaction table not readable",
                        Some(vec![json!({"error": e})]),
                    ),
                },
            );

            // Requests vs status reports. Summaries count requests only; a
            // mismatch means status reports are not all paired duplicates.
            if table_ok {
                let requests = self.count_type(MessageType::Pacs008).await;
                let reports = self.count_type(MessageType::Pacs002).await;
                let check = match (requests, reports) {
                    (Ok(requests), Ok(reports)) if requests == reports => CheckResult::pass(
                        format!("{} request(s), each with a status report", requests),
                    ),
                    (Ok(requests), Ok(reports)) => CheckResult::warning(
                        format!(
                            "{} request(s) but {} status report(s); summaries count requests only",
                            requests, reports
                        ),
                        Some(vec![json!({"pacs008_count": requests, "pacs002_count": reports})]),
                    ),
                    (Err(e), _) | (_, Err(e)) => CheckResult::error(
                        "Could not count message types",
                        Some(vec![json!({"error": e})]),
                    ),
                };
                checks.insert("status_report_pairing".to_string(), check);
            }
        }

        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        Ok(DoctorResult {
            strategy: self.strategy.name(),
            checks,
            summary: DoctorSummary { passed, warnings, errors },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub strategy: String,
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            status: "pass".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warning(message: impl Into<String>, details: Option<Vec<serde_json::Value>>) -> Self {
        Self {
            status: "warning".to_string(),
            message: message.into(),
            details,
        }
    }

    fn error(message: impl Into<String>, details: Option<Vec<serde_json::Value>>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::result::Error;
    use crate::ports::{QueryOutput, StrategyKind};

    /// Answers counts per message type from fixed numbers
    struct CountingStrategy {
        requests: u64,
        reports: u64,
        reachable: bool,
    }

    #[async_trait]
    impl QueryStrategy for CountingStrategy {
        async fn execute(&self, query: &str, _csv_mode: bool) -> Result<QueryOutput> {
            if !self.reachable {
                return Err(Error::transport("connection refused"));
            }
            let stdout = if query.contains(MessageType::Pacs008.code()) {
                self.requests.to_string()
            } else if query.contains(MessageType::Pacs002.code()) {
                self.reports.to_string()
            } else if query.contains("FROM transaction") {
                (self.requests + self.reports).to_string()
            } else {
                "1".to_string()
            };
            Ok(QueryOutput { exit_code: 0, stdout: format!("{}\n", stdout), stderr: String::new() })
        }

        fn name(&self) -> String {
            "Counting".to_string()
        }

        fn kind(&self) -> StrategyKind {
            StrategyKind::Direct
        }
    }

    #[tokio::test]
    async fn test_balanced_store_passes() {
        let doctor = DoctorService::new(Arc::new(CountingStrategy { requests: 3, reports: 3, reachable: true }));
        let result = doctor.run_checks().await.unwrap();
        assert_eq!(result.summary.passed, 3);
        assert_eq!(result.summary.errors, 0);
        assert_eq!(result.strategy, "Counting");
    }

    #[tokio::test]
    async fn test_unpaired_reports_warn() {
        let doctor = DoctorService::new(Arc::new(CountingStrategy { requests: 3, reports: 5, reachable: true }));
        let result = doctor.run_checks().await.unwrap();
        assert_eq!(result.checks["status_report_pairing"].status, "warning");
        assert_eq!(result.summary.warnings, 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_errors() {
        let doctor = DoctorService::new(Arc::new(CountingStrategy { requests: 0, reports: 0, reachable: false }));
        let result = doctor.run_checks().await.unwrap();
        assert_eq!(result.checks.len(), 1);
        assert_eq!(result.checks["connectivity"].status, "error");
        assert_eq!(result.summary.errors, 1);
    }
}
