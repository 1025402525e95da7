use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Source – one raw input blob
// ---------------------------------------------------------------------------

/// One input file or uploaded blob: a label (file name or user-supplied
/// name) and its raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub label: String,
    pub raw_text: String,
}

impl Source {
    pub fn new(label: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Source {
            label: label.into(),
            raw_text: raw_text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// DataPoint – one accepted line
// ---------------------------------------------------------------------------

/// A `(key, value)` pair read from one line of one source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    /// Position on the shared axis (e.g. wavenumber).
    pub key: f64,
    /// Reading at that position (e.g. intensity).
    pub value: f64,
}

impl DataPoint {
    pub fn new(key: f64, value: f64) -> Self {
        DataPoint { key, value }
    }
}

// ---------------------------------------------------------------------------
// ColumnName – a collision-free header token
// ---------------------------------------------------------------------------

/// Header token for one source's column. Only ever built by the namer, so
/// it is non-empty and limited to `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ColumnName(String);

impl ColumnName {
    pub(crate) fn new_unchecked(name: String) -> Self {
        ColumnName(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// MergedRow / MergedTable – the join result
// ---------------------------------------------------------------------------

/// One row of the joined table. `cells` is indexed by column position in
/// [`MergedTable::columns`]; a missing entry means "no reading".
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub key: f64,
    pub cells: BTreeMap<usize, f64>,
}

impl MergedRow {
    pub fn new(key: f64) -> Self {
        MergedRow {
            key,
            cells: BTreeMap::new(),
        }
    }

    /// Value for the column at `index`, if that source had a reading here.
    pub fn cell(&self, index: usize) -> Option<f64> {
        self.cells.get(&index).copied()
    }
}

/// The fully assembled table: columns in source order, rows strictly
/// descending by key.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    pub columns: Vec<ColumnName>,
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    /// Number of data rows (excludes the header).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up the cell for `column` at the row whose key equals `key`.
    pub fn value_at(&self, key: f64, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c.as_str() == column)?;
        self.rows
            .iter()
            .find(|r| r.key == key)
            .and_then(|r| r.cell(idx))
    }
}

// ---------------------------------------------------------------------------
// MergeOutput – what a host gets back
// ---------------------------------------------------------------------------

/// Result handed back to hosts (CLI, HTTP server).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutput {
    pub csv_text: String,
    pub column_names: Vec<String>,
    /// Accepted data points summed over every source, before joining.
    pub total_point_count: usize,
}
