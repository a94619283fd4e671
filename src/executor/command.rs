use crate::config::HostConfig;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A fully resolved command line, ready to hand to an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl HostCommand {
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Routes host tools through an optional prefix command, e.g.
/// `docker run ... chroot /host` when the collector lives in a container.
#[derive(Debug, Clone, Default)]
pub struct HostBridge {
    program: Option<PathBuf>,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl HostBridge {
    /// Run tools directly on the local machine.
    pub fn direct() -> Self {
        Self::default()
    }

    pub fn prefixed(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: Some(program.into()),
            args,
            env: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &HostConfig) -> Self {
        let bridge = match &config.bridge {
            Some(bridge) => Self::prefixed(bridge.program.clone(), bridge.args.clone()),
            None => Self::direct(),
        };
        bridge.with_env(config.env.clone())
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn command<I, S>(&self, tool: &str, tool_args: I) -> HostCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tool_args: Vec<String> = tool_args.into_iter().map(Into::into).collect();
        let (program, args) = match &self.program {
            Some(program) => {
                let mut args = self.args.clone();
                args.push(tool.to_string());
                args.extend(tool_args);
                (program.clone(), args)
            }
            None => (PathBuf::from(tool), tool_args),
        };

        HostCommand {
            program,
            args,
            env: self.env.clone(),
        }
    }
}
