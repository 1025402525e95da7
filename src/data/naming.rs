use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::model::ColumnName;

/// Base name used when a label sanitizes to nothing.
pub const FALLBACK_COLUMN: &str = "col";

/// Output file name used when the requested one sanitizes to nothing.
pub const FALLBACK_FILE_NAME: &str = "merged";

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Derive one unique header token per label, preserving order and length.
///
/// Each label is reduced to its file stem and sanitized. Repeats of the same
/// base get `_1`, `_2`, ... in order of appearance. A suffixed candidate
/// that is already taken (e.g. `a`, `a`, `a_1`) keeps counting until free,
/// so the output is always pairwise distinct.
pub fn name_columns<S: AsRef<str>>(labels: &[S]) -> Vec<ColumnName> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut emitted: HashSet<String> = HashSet::with_capacity(labels.len());

    labels
        .iter()
        .map(|label| {
            let base = base_column_name(label.as_ref());
            let count = seen.entry(base.clone()).or_insert(0);

            let mut candidate = if *count == 0 {
                base.clone()
            } else {
                format!("{base}_{count}")
            };
            while emitted.contains(&candidate) {
                *count += 1;
                candidate = format!("{base}_{count}");
            }
            *count += 1;

            emitted.insert(candidate.clone());
            ColumnName::new_unchecked(candidate)
        })
        .collect()
}

/// Sanitized file stem of `label`, or [`FALLBACK_COLUMN`].
pub fn base_column_name(label: &str) -> String {
    let cleaned = replace_runs(&file_stem(label), is_column_char);
    if cleaned.is_empty() {
        FALLBACK_COLUMN.to_string()
    } else {
        cleaned
    }
}

/// Last path segment without its extension. `.` and `..` have no stem as a
/// `Path`, so they are kept as-is.
fn file_stem(label: &str) -> String {
    if let Some(stem) = Path::new(label).file_stem() {
        return stem.to_string_lossy().into_owned();
    }
    label
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn is_column_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Replace each maximal run of characters rejected by `keep` with one `_`.
fn replace_runs(input: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for c in input.chars() {
        if keep(c) {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Output file names
// ---------------------------------------------------------------------------

/// Sanitize a user-requested output name into a plain `*.csv` file name.
///
/// Keeps `[A-Za-z0-9_.-]`, squeezes repeated underscores, strips leading and
/// trailing underscores and appends `.csv` unless already present.
pub fn safe_file_name(requested: &str) -> String {
    let replaced = replace_runs(requested, |c| is_column_char(c) || c == '.');

    let mut squeezed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '_' && squeezed.ends_with('_') {
            continue;
        }
        squeezed.push(c);
    }

    let trimmed = squeezed.trim_matches('_');
    let base = if trimmed.is_empty() {
        FALLBACK_FILE_NAME
    } else {
        trimmed
    };

    if base.to_ascii_lowercase().ends_with(".csv") {
        base.to_string()
    } else {
        format!("{base}.csv")
    }
}
