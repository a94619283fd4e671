use super::{CommandExecutor, ExecError, HostCommand};
use async_trait::async_trait;
use std::borrow::Cow;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Executes host commands as local child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn build(command: &HostCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

fn exit_code(command: &HostCommand, status: ExitStatus) -> Result<i32, ExecError> {
    status.code().ok_or_else(|| ExecError::Signalled {
        program: command.program_name(),
    })
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn status(&self, command: &HostCommand) -> Result<i32, ExecError> {
        debug!(command = %command, "Running status command");

        let status = Self::build(command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| ExecError::Spawn {
                program: command.program_name(),
                source,
            })?;

        exit_code(command, status)
    }

    async fn output(&self, command: &HostCommand) -> Result<Vec<String>, ExecError> {
        debug!(command = %command, "Running output command");

        let output = Self::build(command)
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                program: command.program_name(),
                source,
            })?;

        let code = exit_code(command, output.status)?;
        if code != 0 {
            return Err(ExecError::NonZeroExit {
                program: command.program_name(),
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Journal messages are raw bytes; invalid UTF-8 becomes U+FFFD.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Cow::Owned(_) = stdout {
            debug!(command = %command, "Output was not valid UTF-8, invalid bytes replaced");
        }

        Ok(stdout.lines().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::HostBridge;

    fn sh(script: &str) -> HostBridge {
        HostBridge::prefixed("sh", vec!["-c".to_string(), script.to_string(), "sh".to_string()])
    }

    #[tokio::test]
    async fn test_status_reports_exit_code() {
        let executor = ProcessExecutor::new();
        let ok = sh("exit 0").command("true", Vec::<String>::new());
        let failed = sh("exit 3").command("true", Vec::<String>::new());

        assert_eq!(executor.status(&ok).await.unwrap(), 0);
        assert_eq!(executor.status(&failed).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_output_preserves_line_order() {
        let executor = ProcessExecutor::new();
        let cmd = sh("printf 'one\\ntwo\\nthree\\n'").command("journalctl", Vec::<String>::new());

        let lines = executor.output(&cmd).await.unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_output_passes_tool_and_args() {
        let executor = ProcessExecutor::new();
        let cmd = sh("echo \"$1|$2|$3\"").command("journalctl", ["--unit", "a b"]);

        let lines = executor.output(&cmd).await.unwrap();
        assert_eq!(lines, vec!["journalctl|--unit|a b"]);
    }

    #[tokio::test]
    async fn test_output_applies_env() {
        let executor = ProcessExecutor::new();
        let mut env = std::collections::BTreeMap::new();
        env.insert("JC_EXEC_TEST".to_string(), "bridged".to_string());
        let cmd = sh("echo \"$JC_EXEC_TEST\"")
            .with_env(env)
            .command("journalctl", Vec::<String>::new());

        assert_eq!(executor.output(&cmd).await.unwrap(), vec!["bridged"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let executor = ProcessExecutor::new();
        let cmd = sh("printf 'ok\\n\\377bad\\n'").command("journalctl", Vec::<String>::new());

        let lines = executor.output(&cmd).await.unwrap();
        assert_eq!(lines, vec!["ok".to_string(), "\u{FFFD}bad".to_string()]);
    }

    #[tokio::test]
    async fn test_output_nonzero_exit_is_error() {
        let executor = ProcessExecutor::new();
        let cmd = sh("echo partial; echo broken >&2; exit 2").command("journalctl", Vec::<String>::new());

        match executor.output(&cmd).await {
            Err(ExecError::NonZeroExit { code, stderr, .. }) => {
                assert_eq!(code, 2);
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected non-zero exit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_output_is_not_an_error() {
        let executor = ProcessExecutor::new();
        let cmd = sh("true").command("journalctl", Vec::<String>::new());
        assert!(executor.output(&cmd).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let executor = ProcessExecutor::new();
        let cmd = HostBridge::direct().command("/nonexistent/journalctl", Vec::<String>::new());

        assert!(matches!(executor.status(&cmd).await, Err(ExecError::Spawn { .. })));
        assert!(matches!(executor.output(&cmd).await, Err(ExecError::Spawn { .. })));
    }
}
