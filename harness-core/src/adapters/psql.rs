//! Shared psql invocation: output flags, secret hand-off, timeout

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::domain::result::{Error, Result};
use crate::ports::QueryOutput;

/// Environment variable psql reads the password from
pub(crate) const PASSWORD_VAR: &str = "PGPASSWORD";

/// Tuple-only, unaligned output; comma field separator in csv mode
pub(crate) fn output_flags(csv_mode: bool) -> &'static [&'static str] {
    if csv_mode {
        &["-t", "-A", "-F", ","]
    } else {
        &["-t", "-A"]
    }
}

/// Run a prepared client command, bounded by `timeout`.
///
/// The child is killed if the bound expires. stdin is closed so the client
/// can never wait on a prompt.
pub(crate) async fn run_client(
    mut command: Command,
    password: Option<&str>,
    timeout: Duration,
) -> Result<QueryOutput> {
    if let Some(secret) = password {
        command.env(PASSWORD_VAR, secret);
    }

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let program = command.as_std().get_program().to_string_lossy().into_owned();
    let child = command
        .spawn()
        .map_err(|e| Error::transport(format!("failed to start {}: {}", program, e)))?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Err(_) => Err(Error::Timeout(timeout)),
        Ok(Err(e)) => Err(Error::transport(format!("{} did not complete: {}", program, e))),
        Ok(Ok(output)) => Ok(QueryOutput {
            // Killed by a signal: no code
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
    }
}

/// Upper bound for the `--version` probe
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether `program --version` starts and exits cleanly within `timeout`
pub(crate) async fn client_available(program: &str, timeout: Duration) -> bool {
    let mut command = Command::new(program);
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.status()).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(_)) => false,
        Err(_) => {
            tracing::warn!(program, "client probe timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_flags() {
        assert_eq!(output_flags(false), &["-t", "-A"]);
        assert_eq!(output_flags(true), &["-t", "-A", "-F", ","]);
    }

    #[tokio::test]
    async fn test_missing_client_is_transport_error() {
        let command = Command::new("/nonexistent/tms-harness/psql");
        let err = run_client(command, None, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_missing_client_not_available() {
        assert!(!client_available("/nonexistent/tms-harness/docker", PROBE_TIMEOUT).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_requires_clean_exit() {
        assert!(client_available("true", PROBE_TIMEOUT).await);
        assert!(!client_available("false", PROBE_TIMEOUT).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_client_not_available() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let client = dir.path().join("docker");
        std::fs::write(&client, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&client, std::fs::Permissions::from_mode(0o755)).unwrap();

        let started = std::time::Instant::now();
        let program = client.to_string_lossy();
        assert!(!client_available(&program, Duration::from_millis(200)).await);
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
