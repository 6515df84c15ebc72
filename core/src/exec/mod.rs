//! Shell-mode subprocess execution with timeout and optional output piping.
//!
//! Direct mode never reaches this module: the engine routes the evaluated
//! string straight to the function/module layer instead of spawning anything.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::EngineError;

/// Exit code reported when the per-item timeout fires.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

pub struct CommandExecutor {
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Spawn `sh -c <command>` and capture its output. A timeout yields
    /// exit code 124 with whatever output was not captured discarded; the
    /// child is killed on drop.
    pub async fn execute(&self, command: &str) -> Result<ExecOutput, EngineError> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(e.to_string()))?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => {
                let output = result.map_err(EngineError::Io)?;
                Ok(ExecOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code().unwrap_or(-1),
                })
            }
            Err(_) => {
                tracing::warn!("command timed out after {:?}: {}", self.timeout, command);
                Ok(ExecOutput {
                    stdout: String::new(),
                    stderr: format!("timeout after {:?}", self.timeout),
                    exit_code: TIMEOUT_EXIT_CODE,
                })
            }
        }
    }

    /// Run `command`, then feed its stdout to `pipe_command`'s stdin; the
    /// secondary command's output becomes the result.
    pub async fn execute_piped(
        &self,
        command: &str,
        pipe_command: &str,
    ) -> Result<ExecOutput, EngineError> {
        let primary = self.execute(command).await?;
        if !primary.success() {
            return Ok(primary);
        }

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(pipe_command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(primary.stdout.as_bytes())
                .await
                .map_err(EngineError::Io)?;
            drop(stdin);
        }

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => {
                let output = result.map_err(EngineError::Io)?;
                Ok(ExecOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code().unwrap_or(-1),
                })
            }
            Err(_) => Ok(ExecOutput {
                stdout: String::new(),
                stderr: format!("pipe command timeout after {:?}", self.timeout),
                exit_code: TIMEOUT_EXIT_CODE,
            }),
        }
    }
}
