//! Bounded execution of notification commands.

use std::{process::Stdio, time::Duration};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tokio::process::Command;

/// Result of one command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// The process exit code; `None` when the process was killed or the
    /// platform reported no code.
    pub exit_status: Option<i32>,
    /// Whether the wall-clock cap expired before the command finished.
    pub early_timeout: bool,
    /// How long the invocation took.
    pub duration: Duration,
}

/// Errors raised when a command cannot be run at all.
///
/// A command that runs and fails (non-zero exit, timeout) is not an error;
/// it is reported through [`CommandOutcome`].
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The process could not be spawned or awaited.
    #[error("failed to run notification command: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs notification command lines.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait CommandExecutor: Send + Sync {
    /// Runs `command_line` with a hard wall-clock cap. On timeout the child
    /// is terminated and the outcome carries `early_timeout`.
    async fn run(
        &self,
        command_line: &str,
        timeout: Duration,
    ) -> Result<CommandOutcome, ExecutorError>;
}

/// A [`CommandExecutor`] that hands command lines to `/bin/sh -c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellCommandExecutor;

#[async_trait]
impl CommandExecutor for ShellCommandExecutor {
    async fn run(
        &self,
        command_line: &str,
        timeout: Duration,
    ) -> Result<CommandOutcome, ExecutorError> {
        let started = std::time::Instant::now();

        let mut child = Command::new("/bin/sh")
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => Ok(CommandOutcome {
                exit_status: status?.code(),
                early_timeout: false,
                duration: started.elapsed(),
            }),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::error!("Failed to kill timed-out notification command: {}", e);
                }
                Ok(CommandOutcome {
                    exit_status: None,
                    early_timeout: true,
                    duration: started.elapsed(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_reports_exit_status() {
        let executor = ShellCommandExecutor;
        let outcome = executor.run("exit 3", Duration::from_secs(5)).await.unwrap();

        assert_eq!(outcome.exit_status, Some(3));
        assert!(!outcome.early_timeout);
    }

    #[tokio::test]
    async fn test_run_times_out_and_continues() {
        let executor = ShellCommandExecutor;
        let outcome = executor.run("sleep 5", Duration::from_millis(50)).await.unwrap();

        assert!(outcome.early_timeout);
        assert_eq!(outcome.exit_status, None);
        assert!(outcome.duration < Duration::from_secs(5));
    }
}
