use super::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Prefix of the trailing line `journalctl --show-cursor` prints.
pub const CURSOR_MARKER_PREFIX: &str = "-- cursor: ";

/// Opaque journal read position. Never interpreted, only handed back to
/// journalctl via `--after-cursor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Journal output with the cursor marker line removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    pub lines: Vec<String>,
    pub cursor: Option<Cursor>,
    /// The popped last line when it was not a usable marker.
    pub anomaly: Option<String>,
}

/// Pops the last line of `lines` and parses it as a cursor marker.
///
/// The popped line is consumed whether or not it is a marker, so output
/// without a marker loses its final content line.
pub fn split_cursor(mut lines: Vec<String>) -> SplitOutput {
    let last = lines.pop().unwrap_or_default();

    let token = last
        .strip_prefix(CURSOR_MARKER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty());

    match token {
        Some(token) => SplitOutput {
            lines,
            cursor: Some(Cursor::new(token)),
            anomaly: None,
        },
        None => SplitOutput {
            lines,
            cursor: None,
            anomaly: Some(last),
        },
    }
}

/// Last known cursor per unit. Entries only move forward on a read that
/// produced a cursor.
#[derive(Debug, Clone, Default)]
pub struct CursorStore {
    cursors: HashMap<Unit, Cursor>,
}

impl CursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, unit: &Unit) -> Option<&Cursor> {
        self.cursors.get(unit)
    }

    /// Record the cursor returned by a successful read. `None` keeps the
    /// previous position.
    pub fn advance(&mut self, unit: &Unit, cursor: Option<Cursor>) {
        if let Some(cursor) = cursor {
            self.cursors.insert(unit.clone(), cursor);
        }
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Unit, &Cursor)> {
        self.cursors.iter()
    }
}
