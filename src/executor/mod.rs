pub mod command;
pub mod process;

use async_trait::async_trait;
use thiserror::Error;

pub use command::{HostBridge, HostCommand};
pub use process::ProcessExecutor;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("{program} was terminated by a signal")]
    Signalled { program: String },
}

/// Runs commands against the host.
///
/// `status` reports the exit code of a command, `output` returns its captured
/// standard output split into lines. A non-zero exit is an error for `output`
/// but a normal result for `status`.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn status(&self, command: &HostCommand) -> Result<i32, ExecError>;

    async fn output(&self, command: &HostCommand) -> Result<Vec<String>, ExecError>;
}
