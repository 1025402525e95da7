use std::path::{Path, PathBuf};

use crate::error::{MergeError, Result};

use super::model::{DataPoint, Source};

// ---------------------------------------------------------------------------
// Row extraction
// ---------------------------------------------------------------------------

/// Turn the raw text of one source into its ordered `(key, value)` pairs.
///
/// A line is accepted when its first two whitespace-separated tokens both
/// parse as finite numbers; anything after them is ignored. Blank lines,
/// headers, footers and any other non-numeric line are dropped without
/// complaint. Order follows the input; duplicates are kept here and
/// resolved later by the assembler.
pub fn extract(raw_text: &str) -> Vec<DataPoint> {
    extract_counted(raw_text).0
}

/// Same as [`extract`], also returning how many non-empty lines were dropped.
pub(crate) fn extract_counted(raw_text: &str) -> (Vec<DataPoint>, usize) {
    let mut points = Vec::new();
    let mut discarded = 0;

    // `lines()` splits on `\n` and strips a trailing `\r`.
    for raw in raw_text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse_pair(line) {
            Some(point) => points.push(point),
            None => discarded += 1,
        }
    }

    (points, discarded)
}

fn parse_pair(line: &str) -> Option<DataPoint> {
    let mut tokens = line.split_whitespace();
    let key = parse_finite(tokens.next()?)?;
    let value = parse_finite(tokens.next()?)?;
    Some(DataPoint::new(key, value))
}

fn parse_finite(tok: &str) -> Option<f64> {
    // `f64::from_str` also accepts "inf" and "NaN"; those are not readings.
    tok.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Filesystem helpers used by the CLI host
// ---------------------------------------------------------------------------

/// Read one file into a [`Source`] labelled with its file name.
pub fn load_source_file(path: &Path) -> Result<Source> {
    let raw_text = std::fs::read_to_string(path).map_err(|e| MergeError::io(path, e))?;
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Source::new(label, raw_text))
}

/// List regular files in `dir` whose extension matches `extension`
/// (case-insensitive), sorted by file name.
pub fn scan_directory(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.').to_ascii_lowercase();
    let entries = std::fs::read_dir(dir).map_err(|e| MergeError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MergeError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&wanted))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Scan `dir` and load every matching file, in file-name order.
pub fn load_directory(dir: &Path, extension: &str) -> Result<Vec<Source>> {
    scan_directory(dir, extension)?
        .iter()
        .map(|p| load_source_file(p))
        .collect()
}
