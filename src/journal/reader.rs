use super::cursor::{split_cursor, Cursor};
use super::events::EventSink;
use super::unit::Unit;
use crate::executor::{CommandExecutor, ExecError, HostBridge, HostCommand};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const CURSOR_MISSING_EVENT: &str = "log-agent:journald-collector:cursor-missing";

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read journal for {unit}: {source}")]
    Exec {
        unit: Unit,
        #[source]
        source: ExecError,
    },

    #[error("journal read for {unit} did not finish within {timeout:?}")]
    TimedOut { unit: Unit, timeout: Duration },
}

impl ReadError {
    pub fn unit(&self) -> &Unit {
        match self {
            ReadError::Exec { unit, .. } | ReadError::TimedOut { unit, .. } => unit,
        }
    }
}

/// Lines harvested from one unit and the position to resume from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRead {
    pub lines: Vec<String>,
    pub cursor: Option<Cursor>,
}

/// Reads a unit's journal after a cursor via `journalctl --show-cursor`.
pub struct JournalReader {
    executor: Arc<dyn CommandExecutor>,
    bridge: HostBridge,
    journalctl: String,
    events: Arc<dyn EventSink>,
    timeout: Option<Duration>,
}

impl JournalReader {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        bridge: HostBridge,
        journalctl: impl Into<String>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            executor,
            bridge,
            journalctl: journalctl.into(),
            events,
            timeout: None,
        }
    }

    /// Fail reads that take longer than `timeout` instead of waiting forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self, unit: &Unit, cursor: Option<&Cursor>) -> HostCommand {
        let mut args = vec![
            "--output".to_string(),
            "cat".to_string(),
            "--unit".to_string(),
            unit.to_string(),
            "--show-cursor".to_string(),
        ];
        match cursor {
            // First contact only establishes a position.
            None => args.extend(["--lines".to_string(), "0".to_string()]),
            Some(cursor) => args.extend(["--after-cursor".to_string(), cursor.to_string()]),
        }
        self.bridge.command(&self.journalctl, args)
    }

    pub async fn read(&self, unit: &Unit, cursor: Option<&Cursor>) -> Result<JournalRead, ReadError> {
        let command = self.command(unit, cursor);
        let output = self.executor.output(&command);

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, output)
                .await
                .map_err(|_| ReadError::TimedOut {
                    unit: unit.clone(),
                    timeout,
                })?,
            None => output.await,
        }
        .map_err(|source| ReadError::Exec {
            unit: unit.clone(),
            source,
        })?;

        let split = split_cursor(output);
        if let Some(cursor_line) = &split.anomaly {
            self.events.emit(
                CURSOR_MISSING_EVENT,
                &[("unit", unit.as_str()), ("cursor_line", cursor_line.as_str())],
            );
        }

        debug!(
            unit = %unit,
            lines = split.lines.len(),
            has_cursor = split.cursor.is_some(),
            "Read journal"
        );

        Ok(JournalRead {
            lines: split.lines,
            cursor: split.cursor,
        })
    }
}
