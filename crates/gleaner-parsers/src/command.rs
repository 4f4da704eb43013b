//! Command execution for report collection.

use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Error type for command execution.
///
/// Every variant here is transient from the scheduler's point of view:
/// the batch for that cluster is skipped and retried on the next run.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to execute {command}: {error}")]
    Execution { command: String, error: String },
    #[error("Command {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
    #[error("Command {command} produced no output: {stderr}")]
    EmptyOutput { command: String, stderr: String },
    #[error("Command {command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },
}

/// Execute a command and return stdout as a string, bounded by the
/// caller-supplied timeout.
///
/// Empty stdout with non-empty stderr counts as a failure: the remote
/// side printed a diagnostic instead of a report.
pub async fn run_command(
    cmd: &mut Command,
    name: &str,
    timeout: Duration,
) -> Result<String, CommandError> {
    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| CommandError::Timeout {
            command: name.to_string(),
            seconds: timeout.as_secs(),
        })?
        .map_err(|e| CommandError::Execution {
            command: name.to_string(),
            error: e.to_string(),
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(CommandError::Failed {
            command: name.to_string(),
            stderr: stderr.to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if stdout.trim().is_empty() && !stderr.trim().is_empty() {
        return Err(CommandError::EmptyOutput {
            command: name.to_string(),
            stderr: stderr.to_string(),
        });
    }

    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_run_command_success() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello");
        let result = run_command(&mut cmd, "echo", TIMEOUT).await.unwrap();
        assert_eq!(result.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_command_not_found() {
        let mut cmd = Command::new("nonexistent_command_12345");
        let result = run_command(&mut cmd, "nonexistent", TIMEOUT).await;
        assert!(matches!(result, Err(CommandError::Execution { .. })));
    }

    #[tokio::test]
    async fn test_run_command_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = run_command(&mut cmd, "sleep", Duration::from_millis(50)).await;
        assert!(matches!(result, Err(CommandError::Timeout { seconds: 0, .. })));
    }

    #[tokio::test]
    async fn test_run_command_stderr_only() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo oops >&2"]);
        let result = run_command(&mut cmd, "sh", TIMEOUT).await;
        match result {
            Err(CommandError::EmptyOutput { stderr, .. }) => assert!(stderr.contains("oops")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
