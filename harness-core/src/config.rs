//! Configuration management
//!
//! All environment variables are read once into [`Config`]; strategies and
//! services only ever see the resulting values. Tests build a `Config` from an
//! injected lookup instead of the process environment.
//!
//! | Variable                   | Default           |
//! |----------------------------|-------------------|
//! | `DB_HOST`                  | `tazama-postgres` |
//! | `DB_PORT` / `PGPORT`       | `5432`            |
//! | `DB_USER`                  | `postgres`        |
//! | `DB_NAME`                  | `event_history`   |
//! | `DB_PASSWORD` / `PGPASSWORD` | unset           |
//! | `POSTGRES_CONTAINER`       | `tazama-postgres` |
//! | `IN_DOCKER`                | `false`           |
//! | `USE_LOCAL_POSTGRES`       | `false`           |
//! | `HARNESS_CONTAINER_MARKER` | `/.dockerenv`     |
//! | `DB_QUERY_TIMEOUT_SECS`    | `10`              |
//! | `PSQL_BIN`                 | `psql`            |
//! | `DOCKER_BIN`               | `docker`          |

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::result::{Error, Result};

pub const DEFAULT_DB_HOST: &str = "tazama-postgres";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "event_history";
pub const DEFAULT_CONTAINER: &str = "tazama-postgres";
pub const DEFAULT_CONTAINER_MARKER: &str = "/.dockerenv";
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Network-reachable database instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            database: DEFAULT_DB_NAME.to_string(),
        }
    }
}

/// Database living in a sibling container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    pub container_name: String,
    pub database: String,
    /// psql user inside the container
    pub user: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            container_name: DEFAULT_CONTAINER.to_string(),
            database: DEFAULT_DB_NAME.to_string(),
            user: DEFAULT_DB_USER.to_string(),
        }
    }
}

/// Harness configuration
#[derive(Clone)]
pub struct Config {
    pub direct: DirectConfig,
    pub container: ContainerConfig,
    /// Database secret, handed to the query client through its environment
    pub password: Option<String>,
    /// `USE_LOCAL_POSTGRES`: caller preference when no `--local` flag is given
    pub prefer_local: bool,
    /// `IN_DOCKER`: explicit "this process runs inside a container" flag
    pub in_container: bool,
    /// File whose presence means this process runs inside a container
    pub container_marker: PathBuf,
    pub query_timeout: Duration,
    pub psql_bin: String,
    pub docker_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            direct: DirectConfig::default(),
            container: ContainerConfig::default(),
            password: None,
            prefer_local: false,
            in_container: false,
            container_marker: PathBuf::from(DEFAULT_CONTAINER_MARKER),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            psql_bin: "psql".to_string(),
            docker_bin: "docker".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("direct", &self.direct)
            .field("container", &self.container)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("prefer_local", &self.prefer_local)
            .field("in_container", &self.in_container)
            .field("container_marker", &self.container_marker)
            .field("query_timeout", &self.query_timeout)
            .field("psql_bin", &self.psql_bin)
            .field("docker_bin", &self.docker_bin)
            .finish()
    }
}

impl Config {
    /// Load config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load config from a fixed set of variables
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_vars(|key| vars.get(key).cloned())
    }

    /// Load config through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("DB_PORT").or_else(|| get("PGPORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::config(format!("invalid database port: {raw}")))?,
            None => DEFAULT_DB_PORT,
        };

        let query_timeout = match get("DB_QUERY_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(Error::config(format!("invalid query timeout: {raw}")));
                }
            },
            None => DEFAULT_QUERY_TIMEOUT,
        };

        let database = get("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        Ok(Self {
            direct: DirectConfig {
                host: get("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                port,
                user: get("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
                database: database.clone(),
            },
            container: ContainerConfig {
                container_name: get("POSTGRES_CONTAINER")
                    .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
                database,
                user: DEFAULT_DB_USER.to_string(),
            },
            password: get("DB_PASSWORD").or_else(|| get("PGPASSWORD")),
            prefer_local: get("USE_LOCAL_POSTGRES").map(|v| is_truthy(&v)).unwrap_or(false),
            in_container: get("IN_DOCKER").map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false),
            container_marker: get("HARNESS_CONTAINER_MARKER")
                .map(PathBuf::from)
                .unwrap_or(defaults.container_marker),
            query_timeout,
            psql_bin: get("PSQL_BIN").unwrap_or(defaults.psql_bin),
            docker_bin: get("DOCKER_BIN").unwrap_or(defaults.docker_bin),
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
