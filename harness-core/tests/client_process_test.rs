//! Strategy behaviour against stand-in query clients
//!
//! Small shell scripts take the place of `psql` / `docker` so the process
//! handling (arguments, secret hand-off, exit codes, timeout) runs for real.
//!
//! Run with: cargo test --test client_process_test -- --nocapture

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use harness_core::adapters::{ContainerStrategy, DirectStrategy};
use harness_core::config::{Config, ContainerConfig, DirectConfig};
use harness_core::services::QueryService;
use harness_core::{Error, FailureKind, QueryStrategy, SummaryResult};

/// Write an executable shell script into `dir`
fn write_client(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config_with_client(client: &Path) -> Config {
    Config {
        psql_bin: client.to_string_lossy().into_owned(),
        docker_bin: client.to_string_lossy().into_owned(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_non_zero_exit_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let client = write_client(dir.path(), "psql", "echo 'ERROR:  syntax error' >&2\nexit 3");
    let strategy = DirectStrategy::new(DirectConfig::default(), &config_with_client(&client));

    let output = strategy.execute("SELECT 1;", false).await.unwrap();
    assert_eq!(output.exit_code, 3);
    assert!(!output.success());
    assert!(output.stdout.is_empty());
    assert_eq!(output.stderr.trim(), "ERROR:  syntax error");
}

#[tokio::test]
async fn test_direct_client_receives_flags() {
    let dir = TempDir::new().unwrap();
    let client = write_client(dir.path(), "psql", "printf '%s\\n' \"$@\"");
    let strategy = DirectStrategy::new(DirectConfig::default(), &config_with_client(&client));

    let output = strategy.execute("SELECT 1;", true).await.unwrap();
    assert!(output.success());
    let received: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(received, strategy.args("SELECT 1;", true));
    assert!(received.windows(2).any(|w| w == ["-F", ","]));
}

#[tokio::test]
async fn test_container_client_receives_flags() {
    let dir = TempDir::new().unwrap();
    let client = write_client(dir.path(), "docker", "printf '%s\\n' \"$@\"");
    let strategy = ContainerStrategy::new(ContainerConfig::default(), &config_with_client(&client));

    let output = strategy.execute("SELECT 1;", false).await.unwrap();
    let received: Vec<&str> = output.stdout.lines().collect();
    assert_eq!(&received[..3], ["exec", "-i", "tazama-postgres"]);
    assert_eq!(&received[received.len() - 4..], ["-t", "-A", "-c", "SELECT 1;"]);
}

#[tokio::test]
async fn test_secret_reaches_client_environment_only() {
    let dir = TempDir::new().unwrap();
    let client = write_client(
        dir.path(),
        "psql",
        "printf '%s' \"$PGPASSWORD\"\nprintf '%s\\n' \"$@\" >&2",
    );
    let mut config = config_with_client(&client);
    config.password = Some("s3cret".to_string());
    let strategy = DirectStrategy::new(DirectConfig::default(), &config);

    let output = strategy.execute("SELECT 1;", false).await.unwrap();
    assert_eq!(output.stdout, "s3cret");
    assert!(!output.stderr.contains("s3cret"));
}

#[tokio::test]
async fn test_slow_client_times_out() {
    let dir = TempDir::new().unwrap();
    let client = write_client(dir.path(), "psql", "sleep 5");
    let mut config = config_with_client(&client);
    config.query_timeout = Duration::from_millis(200);
    let strategy = DirectStrategy::new(DirectConfig::default(), &config);

    let started = Instant::now();
    let err = strategy.execute("SELECT pg_sleep(60);", false).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_summary_reports_timeout_shape() {
    let dir = TempDir::new().unwrap();
    let client = write_client(dir.path(), "psql", "sleep 5");
    let mut config = config_with_client(&client);
    config.query_timeout = Duration::from_secs(1);
    let strategy = DirectStrategy::new(DirectConfig::default(), &config);
    let service = QueryService::new(std::sync::Arc::new(strategy));

    let SummaryResult::Error(failure) = service.get_transaction_summary().await else {
        panic!("slow client should not produce a summary");
    };
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(failure.message, "Database query timeout (>1s)");
    assert_eq!(failure.strategy, "LocalPostgres(tazama-postgres:5432/event_history)");
}

#[tokio::test]
async fn test_missing_client_is_transport_failure() {
    let dir = TempDir::new().unwrap();
    let config = config_with_client(&dir.path().join("not-installed"));
    let service = QueryService::new(std::sync::Arc::new(DirectStrategy::new(
        DirectConfig::default(),
        &config,
    )));

    let SummaryResult::Error(failure) = service.get_transaction_summary().await else {
        panic!("missing client should not produce a summary");
    };
    assert_eq!(failure.kind, FailureKind::Transport);
}

#[tokio::test]
async fn test_summary_through_client_output() {
    let dir = TempDir::new().unwrap();
    // Answer by query shape: counterparty lists in csv mode, then the total
    let client = write_client(
        dir.path(),
        "psql",
        r#"case "$*" in
  *"GROUP BY source"*) printf 'DEBTOR-A,2,350\n\nbroken\n' ;;
  *"GROUP BY destination"*) printf 'CREDITOR-X,,\n' ;;
  *) printf '2\n' ;;
esac"#,
    );
    let strategy = DirectStrategy::new(DirectConfig::default(), &config_with_client(&client));
    let service = QueryService::new(std::sync::Arc::new(strategy));

    let SummaryResult::Success(summary) = service.get_transaction_summary().await else {
        panic!("scripted client should produce a summary");
    };
    assert_eq!(summary.total_transactions, 2);
    assert_eq!(summary.debtors.len(), 1);
    assert_eq!(summary.debtors[0].total_amount, 350.0);
    assert_eq!(summary.creditors[0].tx_count, 0);
    assert_eq!(summary.creditors[0].total_amount, 0.0);
}
