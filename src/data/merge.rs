use std::collections::HashMap;

use log::debug;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{MergeError, Result};

use super::loader::extract_counted;
use super::model::{ColumnName, DataPoint, MergeOutput, MergedRow, MergedTable, Source};
use super::naming::name_columns;

/// Header label of the key column unless a host overrides it.
pub const DEFAULT_KEY_LABEL: &str = "key";

/// Knobs a host may pass into a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// First header field, naming the shared axis (e.g. `wavenumber`).
    pub key_label: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            key_label: DEFAULT_KEY_LABEL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Extract, name and join `sources`, returning the CSV plus summary counts.
///
/// Never fails on content: malformed lines are dropped and an empty input
/// produces a header-only table.
pub fn merge_sources(sources: &[Source], options: &MergeOptions) -> Result<MergeOutput> {
    let labels: Vec<&str> = sources.iter().map(|s| s.label.as_str()).collect();
    let columns = name_columns(&labels);

    let extracted = extract_all(sources);
    let total_point_count = extracted.iter().map(Vec::len).sum();

    let table = assemble(columns.into_iter().zip(extracted).collect());
    let csv_text = table.to_csv(&options.key_label)?;

    debug!(
        "merged {} sources, {total_point_count} points into {} rows",
        sources.len(),
        table.len()
    );

    Ok(MergeOutput {
        csv_text,
        column_names: table.columns.iter().map(|c| c.to_string()).collect(),
        total_point_count,
    })
}

#[cfg(feature = "rayon")]
fn extract_all(sources: &[Source]) -> Vec<Vec<DataPoint>> {
    sources.par_iter().map(extract_logged).collect()
}

#[cfg(not(feature = "rayon"))]
fn extract_all(sources: &[Source]) -> Vec<Vec<DataPoint>> {
    sources.iter().map(extract_logged).collect()
}

fn extract_logged(source: &Source) -> Vec<DataPoint> {
    let (points, discarded) = extract_counted(&source.raw_text);
    debug!(
        "{}: {} points, {discarded} lines skipped",
        source.label,
        points.len()
    );
    points
}

// ---------------------------------------------------------------------------
// Outer join
// ---------------------------------------------------------------------------

/// Full outer join of every source's points on the key axis.
///
/// Keys match on exact value (`20` and `20.0` are one row; `-0` folds into
/// `0`). Within one source a repeated key overwrites its earlier reading.
/// Rows come out strictly descending by key.
pub fn assemble(per_source: Vec<(ColumnName, Vec<DataPoint>)>) -> MergedTable {
    let mut rows: HashMap<u64, MergedRow> = HashMap::new();
    let mut columns = Vec::with_capacity(per_source.len());

    for (col_idx, (column, points)) in per_source.into_iter().enumerate() {
        for point in points {
            let key = canonical_key(point.key);
            rows.entry(key.to_bits())
                .or_insert_with(|| MergedRow::new(key))
                .cells
                .insert(col_idx, point.value);
        }
        columns.push(column);
    }

    let mut rows: Vec<MergedRow> = rows.into_values().collect();
    rows.sort_by(|a, b| b.key.total_cmp(&a.key));

    MergedTable { columns, rows }
}

fn canonical_key(key: f64) -> f64 {
    // 0.0 == -0.0 numerically but their bit patterns differ.
    if key == 0.0 {
        0.0
    } else {
        key
    }
}

// ---------------------------------------------------------------------------
// CSV serialization
// ---------------------------------------------------------------------------

/// Magnitudes at or above this are written in exponent form.
const EXPONENT_ABOVE: f64 = 1e21;
/// Non-zero magnitudes below this are written in exponent form.
const EXPONENT_BELOW: f64 = 1e-6;

/// Shortest round-trip rendering of `v`: positional for ordinary magnitudes
/// (`1`, `0.25`, `4000.5`), exponent form with an explicit sign outside
/// `[1e-6, 1e21)` (`1e+300`, `1.5e-7`).
pub fn format_number(v: f64) -> String {
    let magnitude = v.abs();
    if v != 0.0 && !(EXPONENT_BELOW..EXPONENT_ABOVE).contains(&magnitude) {
        let text = format!("{v:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        v.to_string()
    }
}

impl MergedTable {
    /// Render as CSV: a header of `key_label` plus column names, then one
    /// line per row with empty fields where a source had no reading.
    pub fn to_csv(&self, key_label: &str) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let header =
            std::iter::once(key_label).chain(self.columns.iter().map(ColumnName::as_str));
        writer.write_record(header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(self.columns.len() + 1);
            record.push(format_number(row.key));
            for idx in 0..self.columns.len() {
                record.push(row.cell(idx).map(format_number).unwrap_or_default());
            }
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| MergeError::Csv(e.into_error().into()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
