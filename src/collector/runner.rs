use crate::collector::batch::JournalBatch;
use crate::config::Config;
use crate::executor::{CommandExecutor, HostBridge};
use crate::journal::{CursorStore, EventSink, JournalReader, ServiceDetector, Unit};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// State carried between collection cycles.
#[derive(Debug, Default)]
pub struct CollectorState {
    cursors: CursorStore,
    mark: Option<DateTime<Utc>>,
}

impl CollectorState {
    pub fn cursors(&self) -> &CursorStore {
        &self.cursors
    }

    /// High-water mark. Reserved; never set yet.
    pub fn mark(&self) -> Option<DateTime<Utc>> {
        self.mark
    }
}

/// Harvests new journal lines for a fixed set of units.
pub struct JournalCollector {
    units: Vec<Unit>,
    host: String,
    detector: ServiceDetector,
    reader: JournalReader,
    state: CollectorState,
}

impl JournalCollector {
    pub fn new(units: Vec<Unit>, detector: ServiceDetector, reader: JournalReader) -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            units,
            host,
            detector,
            reader,
            state: CollectorState::default(),
        }
    }

    pub fn from_config(
        config: &Config,
        executor: Arc<dyn CommandExecutor>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let bridge = HostBridge::from_config(&config.host);

        let detector = ServiceDetector::new(
            executor.clone(),
            bridge.clone(),
            config.host.systemctl.clone(),
            config.detect.units.iter().map(|u| Unit::new(u.as_str())).collect(),
        );
        let reader = JournalReader::new(executor, bridge, config.host.journalctl.clone(), events)
            .with_timeout(config.collector.read_timeout);

        let units = config.units.iter().map(|u| Unit::new(u.as_str())).collect();
        Self::new(units, detector, reader)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn state(&self) -> &CollectorState {
        &self.state
    }

    /// Whether a control unit is active on this host.
    pub async fn detect(&self) -> bool {
        self.detector.detect().await
    }

    /// Runs one collection cycle.
    ///
    /// Every unit is read concurrently from its stored cursor. Units whose
    /// read fails are left out of the batch and keep their cursor, so the
    /// next cycle retries from the same position.
    pub async fn collect(&mut self) -> JournalBatch {
        let reader = &self.reader;
        let cursors = &self.state.cursors;

        let reads = self.units.iter().map(|unit| async move {
            let result = reader.read(unit, cursors.get(unit)).await;
            (unit, result)
        });
        let results = join_all(reads).await;

        let mut batch = JournalBatch::new(self.host.clone());
        let mut failed = 0usize;
        let mut updates = Vec::with_capacity(results.len());

        for (unit, result) in results {
            match result {
                Ok(read) => {
                    updates.push((unit.clone(), read.cursor));
                    batch.units.insert(unit.clone(), read.lines);
                }
                Err(e) => {
                    failed += 1;
                    warn!(unit = %unit, error = %e, "Journal read failed, keeping previous cursor");
                }
            }
        }

        for (unit, cursor) in updates {
            self.state.cursors.advance(&unit, cursor);
        }

        info!(
            cycle_id = %batch.cycle_id,
            succeeded = batch.len(),
            failed,
            lines = batch.total_lines(),
            "Collection cycle complete"
        );

        batch
    }
}
