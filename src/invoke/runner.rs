/*!
Process runner: spawn an external CLI, buffer stdout/stderr separately,
enforce a wall-clock timeout and classify failures.

Classification:
  - program missing            -> ExecError::NotFound
  - timeout expired            -> ExecError::Timeout (child is killed)
  - non-zero exit with stderr  -> ExecError::Stderr   ("<binary> error: <stderr>")
  - non-zero exit, no stderr   -> ExecError::NonZeroExit
  - any other spawn/io failure -> ExecError::Spawn

On success stdout is returned verbatim and stderr is kept only for
callers that build a response envelope. No retries, no streaming.
*/

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, warn};

use super::error::ExecError;
use crate::config::CommandSpec;

/// Captured output of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `command` with `args` under the configured timeout.
    pub async fn run(
        &self,
        command: &CommandSpec,
        args: &[String],
    ) -> Result<ExecutionResult, ExecError> {
        self.run_with_timeout(command, args, self.timeout).await
    }

    pub async fn run_with_timeout(
        &self,
        command: &CommandSpec,
        args: &[String],
        timeout: Duration,
    ) -> Result<ExecutionResult, ExecError> {
        let binary = command.to_string();
        let argv = command.argv(args);
        debug!(program = %command.program, args = ?argv, "spawning command");

        let child = Command::new(&command.program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&binary, e))?;

        let started = Instant::now();
        // Dropping the in-flight future drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(res) => res.map_err(|source| ExecError::Spawn {
                binary: binary.clone(),
                source,
            })?,
            Err(_) => {
                warn!(%binary, ?timeout, "command timed out; killed");
                return Err(ExecError::Timeout { binary, timeout });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(
            %binary,
            status = ?output.status.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );

        if !output.status.success() {
            let code = output.status.code();
            warn!(%binary, ?code, "command failed");
            if !stderr.is_empty() {
                return Err(ExecError::Stderr {
                    binary,
                    code,
                    stderr,
                });
            }
            return Err(ExecError::NonZeroExit { binary, code });
        }

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_code: output.status.code().unwrap_or(0),
        })
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TIMEOUT)
    }
}

fn spawn_error(binary: &str, err: std::io::Error) -> ExecError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ExecError::NotFound {
            binary: binary.to_string(),
        }
    } else {
        ExecError::Spawn {
            binary: binary.to_string(),
            source: err,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec {
            program: "sh".into(),
            prefix: vec!["-c".into(), script.into(), "sh".into()],
        }
    }

    #[tokio::test]
    async fn captures_stdout_verbatim() {
        let runner = ProcessRunner::default();
        let res = runner
            .run(&CommandSpec::program("echo"), &["hello".into(), "world".into()])
            .await
            .unwrap();
        assert_eq!(res.stdout, "hello world\n");
        assert_eq!(res.exit_code, 0);
    }

    #[tokio::test]
    async fn stderr_is_kept_apart_on_success() {
        let runner = ProcessRunner::default();
        let res = runner
            .run(&sh("printf out; printf noise >&2"), &[])
            .await
            .unwrap();
        assert_eq!(res.stdout, "out");
        assert_eq!(res.stderr, "noise");
    }

    #[tokio::test]
    async fn failure_with_stderr_carries_text() {
        let runner = ProcessRunner::default();
        let err = runner
            .run(&sh("printf 'vm not found' >&2; exit 1"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Stderr { code: Some(1), .. }));
        assert!(err.to_string().ends_with(" error: vm not found"));
    }

    #[tokio::test]
    async fn failure_without_stderr_is_non_zero_exit() {
        let runner = ProcessRunner::default();
        let err = runner.run(&sh("exit 4"), &[]).await.unwrap_err();
        assert!(matches!(err, ExecError::NonZeroExit { code: Some(4), .. }));
        assert!(err.to_string().contains("command failed: exit status 4"));
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let runner = ProcessRunner::default();
        let err = runner
            .run(&CommandSpec::program("definitely-not-a-real-cli-4821"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "definitely-not-a-real-cli-4821 command failed: executable not found"
        );
    }

    #[tokio::test]
    async fn timeout_kills_and_returns_promptly() {
        let runner = ProcessRunner::new(Duration::from_millis(200));
        let started = Instant::now();
        let err = runner
            .run(&CommandSpec::program("sleep"), &["30".into()])
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "runner must not wait for the child to finish"
        );
    }
}
