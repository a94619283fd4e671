use crate::collector::{JournalBatch, JournalCollector};
use crate::config::{load_config, Config, ConfigError};
use crate::executor::ProcessExecutor;
use crate::journal::TracingEventSink;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to write batch: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Loads the config at `path`, or the built-in defaults when none was found.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            info!(config_path = %path.display(), "Loading configuration");
            load_config(path)
        }
        None => {
            info!("No config file found, using built-in defaults");
            Ok(Config::default())
        }
    }
}

fn build_collector(config: &Config) -> JournalCollector {
    JournalCollector::from_config(
        config,
        Arc::new(ProcessExecutor::new()),
        Arc::new(TracingEventSink),
    )
}

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    run_collector(config_path.as_deref()).await.map_err(|e| e.into())
}

pub async fn detect(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_or_default(config_path.as_deref())?;
    let detected = build_collector(&config).detect().await;
    println!("{}", detected);
    Ok(())
}

async fn run_collector(config_path: Option<&Path>) -> Result<(), RunError> {
    let config = load_or_default(config_path)?;
    let mut collector = build_collector(&config);

    info!(
        units = collector.units().len(),
        interval = ?config.collector.interval,
        "Journal collector configured"
    );

    if config.collector.require_detection && !collector.detect().await {
        info!("No control unit active on this host, nothing to collect");
        return Ok(());
    }

    let interval = config.collector.interval.unwrap_or(Duration::from_secs(10));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    info!("Collector started, press Ctrl+C to shutdown");
    run_cycles(
        &mut collector,
        interval,
        config.collector.cycle_timeout,
        &mut out,
        signal::ctrl_c(),
    )
    .await?;
    info!("Collector shutdown complete");

    Ok(())
}

/// Collects every `interval` until `shutdown` resolves, writing each
/// non-empty batch to `out` as a JSON line. Returns the number of cycles run.
pub async fn run_cycles<W, S>(
    collector: &mut JournalCollector,
    interval: Duration,
    cycle_timeout: Option<Duration>,
    out: &mut W,
    shutdown: S,
) -> Result<u64, RunError>
where
    W: Write,
    S: Future,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut cycles = 0u64;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(cycles, "Shutdown signal received");
                return Ok(cycles);
            }
            _ = ticker.tick() => {
                cycles += 1;
                if let Some(batch) = run_cycle(collector, cycle_timeout).await {
                    if batch.total_lines() > 0 {
                        write_batch(out, &batch)?;
                    } else {
                        debug!(cycle_id = %batch.cycle_id, "No new journal lines");
                    }
                }
            }
        }
    }
}

/// Runs one cycle under `cycle_timeout`. An abandoned cycle leaves every
/// cursor where it was.
pub async fn run_cycle(
    collector: &mut JournalCollector,
    cycle_timeout: Option<Duration>,
) -> Option<JournalBatch> {
    match cycle_timeout {
        Some(timeout) => match tokio::time::timeout(timeout, collector.collect()).await {
            Ok(batch) => Some(batch),
            Err(_) => {
                warn!(timeout = ?timeout, "Collection cycle timed out, cursors unchanged");
                None
            }
        },
        None => Some(collector.collect().await),
    }
}

pub fn write_batch<W: Write>(out: &mut W, batch: &JournalBatch) -> Result<(), RunError> {
    serde_json::to_writer(&mut *out, batch)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::{lines, Reply, ScriptedExecutor};
    use crate::executor::HostBridge;
    use crate::journal::events::testing::RecordingSink;
    use crate::journal::{Cursor, JournalReader, ServiceDetector, Unit};

    fn collector(executor: Arc<ScriptedExecutor>) -> JournalCollector {
        let detector = ServiceDetector::new(executor.clone(), HostBridge::direct(), "systemctl", vec![]);
        let reader = JournalReader::new(
            executor,
            HostBridge::direct(),
            "journalctl",
            Arc::new(RecordingSink::default()),
        );
        JournalCollector::new(vec![Unit::new("a")], detector, reader).with_host("test-host")
    }

    #[tokio::test]
    async fn test_cycle_timeout_leaves_cursor() {
        let executor = Arc::new(
            ScriptedExecutor::new().with_replies("a", vec![lines(&["-- cursor: a1"]), Reply::Hang]),
        );
        let mut collector = collector(executor);

        assert!(run_cycle(&mut collector, Some(Duration::from_millis(50))).await.is_some());
        assert!(run_cycle(&mut collector, Some(Duration::from_millis(50))).await.is_none());
        assert_eq!(
            collector.state().cursors().get(&Unit::new("a")),
            Some(&Cursor::new("a1"))
        );
    }

    #[tokio::test]
    async fn test_run_cycles_writes_only_non_empty_batches() {
        let executor = Arc::new(ScriptedExecutor::new().with_replies(
            "a",
            vec![
                lines(&["-- cursor: a1"]),
                lines(&["hello", "world", "-- cursor: a2"]),
                lines(&["-- cursor: a2"]),
            ],
        ));
        let mut collector = collector(executor);
        let mut out = Vec::new();

        // Later unscripted reads fail, so only the second cycle has output.
        let cycles = run_cycles(
            &mut collector,
            Duration::from_millis(10),
            None,
            &mut out,
            tokio::time::sleep(Duration::from_millis(200)),
        )
        .await
        .unwrap();
        assert!(cycles >= 3);

        let written = String::from_utf8(out).unwrap();
        let batches: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0]["units"]["a"], serde_json::json!(["hello", "world"]));
        assert_eq!(batches[0]["host"], "test-host");
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.units.len(), 3);
    }
}
