//! Sort/limit transform over record sequences
//!
//! Ordering policy for a pair of values in the sort column:
//!
//! - equal raw values compare equal
//! - blank values (absent or empty text) sort last in both directions
//! - two numeric values compare numerically
//! - a numeric value sorts before non-numeric text in both directions
//! - anything else compares by its textual form
//!
//! Only the numeric and textual comparisons follow the sort direction. The
//! sort is stable, so rows with equal keys keep their source order.

use crate::config::{ChartConfig, SortDirection};
use crate::normalize::coerce;
use crate::record::{Record, Value};
use std::cmp::Ordering;

/// Sort and limit settings for one target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOptions {
    /// Column to sort by; `None` keeps source order
    pub sort_col: Option<String>,
    pub sort_dir: SortDirection,
    /// Maximum number of rows to keep; 0 keeps everything
    pub limit: usize,
}

impl TransformOptions {
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            sort_col: config.sort_col().map(str::to_string),
            sort_dir: config.sort_dir(),
            limit: config.limit(),
        }
    }
}

/// Return a sorted, truncated copy of `rows`
pub fn apply(rows: &[Record], options: &TransformOptions) -> Vec<Record> {
    let mut out = rows.to_vec();

    if let Some(column) = options.sort_col.as_deref() {
        out.sort_by(|a, b| compare_values(a.get(column), b.get(column), options.sort_dir));
    }

    if options.limit > 0 {
        out.truncate(options.limit);
    }

    out
}

/// Compare two sort-column values under the ordering policy above
pub fn compare_values(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    match (a.is_blank(), b.is_blank()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ordering = match (coerce(a), coerce(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => a.as_text().cmp(&b.as_text()),
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}
