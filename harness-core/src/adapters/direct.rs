//! Direct strategy: run psql against a network-reachable database

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::psql;
use crate::config::{Config, DirectConfig};
use crate::domain::result::Result;
use crate::ports::{QueryOutput, QueryStrategy, StrategyKind};

/// Queries a database by host and port
pub struct DirectStrategy {
    target: DirectConfig,
    psql_bin: String,
    password: Option<String>,
    timeout: Duration,
}

impl DirectStrategy {
    pub fn new(target: DirectConfig, config: &Config) -> Self {
        Self {
            target,
            psql_bin: config.psql_bin.clone(),
            password: config.password.clone(),
            timeout: config.query_timeout,
        }
    }

    /// Arguments passed to psql
    pub fn args(&self, query: &str, csv_mode: bool) -> Vec<String> {
        let mut args = vec![
            "-h".to_string(),
            self.target.host.clone(),
            "-p".to_string(),
            self.target.port.to_string(),
            "-U".to_string(),
            self.target.user.clone(),
            "-d".to_string(),
            self.target.database.clone(),
        ];
        args.extend(psql::output_flags(csv_mode).iter().map(|f| f.to_string()));
        args.push("-c".to_string());
        args.push(query.to_string());
        args
    }
}

#[async_trait]
impl QueryStrategy for DirectStrategy {
    async fn execute(&self, query: &str, csv_mode: bool) -> Result<QueryOutput> {
        debug!(strategy = %self.name(), csv_mode, "executing query");
        let mut command = Command::new(&self.psql_bin);
        command.args(self.args(query, csv_mode));
        psql::run_client(command, self.password.as_deref(), self.timeout).await
    }

    fn name(&self) -> String {
        format!(
            "LocalPostgres({}:{}/{})",
            self.target.host, self.target.port, self.target.database
        )
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> DirectStrategy {
        let target = DirectConfig {
            host: "localhost".to_string(),
            port: 5430,
            user: "tester".to_string(),
            database: "event_history".to_string(),
        };
        DirectStrategy::new(target, &Config::default())
    }

    #[test]
    fn test_name() {
        assert_eq!(strategy().name(), "LocalPostgres(localhost:5430/event_history)");
        assert_eq!(strategy().kind(), StrategyKind::Direct);
    }

    #[test]
    fn test_args_plain() {
        let args = strategy().args("SELECT 1;", false);
        assert_eq!(
            args,
            vec![
                "-h", "localhost", "-p", "5430", "-U", "tester", "-d", "event_history",
                "-t", "-A", "-c", "SELECT 1;"
            ]
        );
    }

    #[test]
    fn test_args_csv() {
        let args = strategy().args("SELECT 1;", true);
        let flags: Vec<&str> = args[8..12].iter().map(String::as_str).collect();
        assert_eq!(flags, ["-t", "-A", "-F", ","]);
    }
}
