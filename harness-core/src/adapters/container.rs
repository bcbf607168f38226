//! Container strategy: run psql inside the database container

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::psql::{self, PASSWORD_VAR};
use crate::config::{Config, ContainerConfig};
use crate::domain::result::{Error, Result};
use crate::ports::{QueryOutput, QueryStrategy, StrategyKind};

/// Queries a database that is only reachable through `docker exec`
pub struct ContainerStrategy {
    target: ContainerConfig,
    docker_bin: String,
    password: Option<String>,
    timeout: Duration,
}

impl ContainerStrategy {
    pub fn new(target: ContainerConfig, config: &Config) -> Self {
        Self {
            target,
            docker_bin: config.docker_bin.clone(),
            password: config.password.clone(),
            timeout: config.query_timeout,
        }
    }

    /// Like [`new`](Self::new), but fails when the container client does not
    /// answer `--version` cleanly. Meant to run once at construction, before
    /// any query.
    pub async fn connect(target: ContainerConfig, config: &Config) -> Result<Self> {
        if !psql::client_available(&config.docker_bin, psql::PROBE_TIMEOUT).await {
            return Err(Error::config(format!(
                "{} CLI not found; cannot query container '{}'. \
                 Set USE_LOCAL_POSTGRES=true or run outside a container.",
                config.docker_bin, target.container_name
            )));
        }
        Ok(Self::new(target, config))
    }

    /// Arguments passed to the container client
    pub fn args(&self, query: &str, csv_mode: bool) -> Vec<String> {
        let mut args = vec!["exec".to_string(), "-i".to_string()];
        if self.password.is_some() {
            // Forwarded by name; the value never appears on the command line
            args.push("-e".to_string());
            args.push(PASSWORD_VAR.to_string());
        }
        args.extend([
            self.target.container_name.clone(),
            "psql".to_string(),
            "-U".to_string(),
            self.target.user.clone(),
            "-d".to_string(),
            self.target.database.clone(),
        ]);
        args.extend(psql::output_flags(csv_mode).iter().map(|f| f.to_string()));
        args.push("-c".to_string());
        args.push(query.to_string());
        args
    }
}

#[async_trait]
impl QueryStrategy for ContainerStrategy {
    async fn execute(&self, query: &str, csv_mode: bool) -> Result<QueryOutput> {
        debug!(strategy = %self.name(), csv_mode, "executing query");
        let mut command = Command::new(&self.docker_bin);
        command.args(self.args(query, csv_mode));
        psql::run_client(command, self.password.as_deref(), self.timeout).await
    }

    fn name(&self) -> String {
        format!(
            "FullDocker({}:{})",
            self.target.container_name, self.target.database
        )
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Container
    }
}
