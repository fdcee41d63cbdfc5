//! Display labels for records

use crate::record::Record;

/// Build a display label from a primary column and an optional qualifier.
///
/// The qualifier is appended in parentheses only when it is non-blank:
/// `"Sixers (1972-73)"`. Absent primaries render as empty text.
pub fn derive_label(record: &Record, label_col: &str, season_col: Option<&str>) -> String {
    let primary = record.get(label_col).to_string();

    match season_col.map(|col| record.get(col)) {
        Some(qualifier) if !qualifier.is_blank() => format!("{} ({})", primary, qualifier),
        _ => primary,
    }
}

/// Labels for a whole record sequence, in order
pub fn derive_labels(records: &[Record], label_col: &str, season_col: Option<&str>) -> Vec<String> {
    records
        .iter()
        .map(|r| derive_label(r, label_col, season_col))
        .collect()
}
