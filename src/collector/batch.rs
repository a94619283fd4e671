use crate::journal::Unit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Lines harvested in one collection cycle. Units whose read failed are absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalBatch {
    /// Unique cycle ID (for deduplication downstream)
    pub cycle_id: Uuid,

    /// Host the lines were collected from
    pub host: String,

    pub collected_at: DateTime<Utc>,

    /// Raw lines per unit, in journal order, cursor marker excluded
    pub units: BTreeMap<Unit, Vec<String>>,
}

impl JournalBatch {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            host: host.into(),
            collected_at: Utc::now(),
            units: BTreeMap::new(),
        }
    }

    pub fn lines(&self, unit: &Unit) -> Option<&[String]> {
        self.units.get(unit).map(Vec::as_slice)
    }

    pub fn contains(&self, unit: &Unit) -> bool {
        self.units.contains_key(unit)
    }

    /// Number of units that were read successfully.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn total_lines(&self) -> usize {
        self.units.values().map(Vec::len).sum()
    }
}
