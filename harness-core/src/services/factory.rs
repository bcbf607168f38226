//! Strategy selection - decide once, at construction, how queries travel

use std::sync::Arc;

use tracing::info;

use crate::adapters::{ContainerStrategy, DirectStrategy};
use crate::config::Config;
use crate::domain::result::Result;
use crate::ports::{QueryStrategy, StrategyKind};
use crate::services::QueryService;

/// Whether this process itself runs inside a container
pub fn detect_container(config: &Config) -> bool {
    config.in_container || config.container_marker.exists()
}

/// Pick the execution path.
///
/// A containerized caller has no container client for its sibling database,
/// so detection overrides `prefer_local`.
pub fn select_mode(config: &Config, prefer_local: bool) -> StrategyKind {
    if detect_container(config) || prefer_local {
        StrategyKind::Direct
    } else {
        StrategyKind::Container
    }
}

/// Build the strategy for the selected path.
///
/// Container mode fails with a configuration error when the container client
/// is missing, before any query is attempted.
pub async fn create_strategy(config: &Config, prefer_local: bool) -> Result<Arc<dyn QueryStrategy>> {
    let strategy: Arc<dyn QueryStrategy> = match select_mode(config, prefer_local) {
        StrategyKind::Direct => {
            Arc::new(DirectStrategy::new(config.direct.clone(), config))
        }
        StrategyKind::Container => {
            Arc::new(ContainerStrategy::connect(config.container.clone(), config).await?)
        }
    };

    info!(
        strategy = %strategy.name(),
        in_container = detect_container(config),
        prefer_local,
        "query strategy selected"
    );
    Ok(strategy)
}

/// Create a query service bound to one concrete strategy
pub async fn create_service(config: &Config, prefer_local: bool) -> Result<QueryService> {
    Ok(QueryService::new(create_strategy(config, prefer_local).await?))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::result::Error;

    fn config_with_marker(marker: PathBuf) -> Config {
        Config {
            container_marker: marker,
            docker_bin: "/nonexistent/tms-harness/docker".to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_marker_forces_direct_mode() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join(".dockerenv");
        std::fs::write(&marker, "").unwrap();
        let config = config_with_marker(marker);

        assert!(detect_container(&config));
        let service = create_service(&config, false).await.unwrap();
        assert_eq!(service.strategy().kind(), StrategyKind::Direct);
        assert_eq!(
            service.strategy_name(),
            "LocalPostgres(tazama-postgres:5432/event_history)"
        );
    }

    #[tokio::test]
    async fn test_env_flag_forces_direct_mode() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_marker(dir.path().join("missing"));
        config.in_container = true;

        let service = create_service(&config, false).await.unwrap();
        assert_eq!(service.strategy().kind(), StrategyKind::Direct);
    }

    #[tokio::test]
    async fn test_prefer_local_outside_container() {
        let dir = TempDir::new().unwrap();
        let config = config_with_marker(dir.path().join("missing"));

        assert!(!detect_container(&config));
        let service = create_service(&config, true).await.unwrap();
        assert_eq!(service.strategy().kind(), StrategyKind::Direct);
    }

    #[tokio::test]
    async fn test_container_mode_without_client_is_config_error() {
        let dir = TempDir::new().unwrap();
        let config = config_with_marker(dir.path().join("missing"));

        assert_eq!(select_mode(&config, false), StrategyKind::Container);
        let err = create_service(&config, false).await.err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_container_mode_with_client() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_marker(dir.path().join("missing"));
        // Any program that starts will do for the availability probe
        config.docker_bin = "true".to_string();

        let service = create_service(&config, false).await.unwrap();
        assert_eq!(service.strategy().kind(), StrategyKind::Container);
        assert_eq!(service.strategy_name(), "FullDocker(tazama-postgres:event_history)");
    }
}
