//! Data structures for parsed tabular rows

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A single cell value after type inference
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The column does not exist in this row
    Absent,
    /// Textual content (may be empty)
    Text(String),
    /// A numeric cell
    Number(f64),
}

static ABSENT: Value = Value::Absent;

impl Value {
    /// Infer a value from raw cell text: numeric-looking text becomes a number
    pub fn infer(raw: &str) -> Self {
        match crate::normalize::parse_number(raw) {
            Some(n) => Value::Number(n),
            None => Value::Text(raw.to_string()),
        }
    }

    /// True for absent values and for text that is empty after trimming
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Absent => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::Number(_) => false,
        }
    }

    /// Textual form used for labels and lexicographic comparison
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Absent => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// One parsed row, keyed by column name in header order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(column, value)` pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.insert(k, v.into());
        }
        record
    }

    /// Set a column, replacing any earlier value for the same name
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Value of a column; `Value::Absent` when the column is unknown
    pub fn get(&self, column: &str) -> &Value {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
            .unwrap_or(&ABSENT)
    }

    /// Column names in header order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// True when no column holds a non-blank value
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_blank())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_unknown_column_is_absent() {
        let record = Record::from_pairs([("TEAM", "Sixers")]);
        assert_eq!(record.get("SEASON"), &Value::Absent);
        assert_eq!(record.get("TEAM"), &Value::Text("Sixers".to_string()));
    }

    #[test]
    fn test_infer_numbers_and_text() {
        assert_eq!(Value::infer("42"), Value::Number(42.0));
        assert_eq!(Value::infer(" 1.5 "), Value::Number(1.5));
        assert_eq!(Value::infer("1972-73"), Value::Text("1972-73".to_string()));
        assert_eq!(Value::infer(""), Value::Text(String::new()));
        assert_eq!(Value::infer("Infinity"), Value::Text("Infinity".to_string()));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Number(12.0).to_string(), "12");
        assert_eq!(Value::Number(0.25).to_string(), "0.25");
        assert_eq!(Value::Absent.to_string(), "");
    }

    #[test]
    fn test_blank_detection() {
        assert!(Value::Absent.is_blank());
        assert!(Value::Text("  ".to_string()).is_blank());
        assert!(!Value::Number(0.0).is_blank());

        let record = Record::from_pairs([("a", ""), ("b", " ")]);
        assert!(record.is_blank());
    }

    #[test]
    fn test_serializes_as_object() {
        let record = Record::from_pairs([("TEAM", Value::from("Sixers")), ("W", Value::Number(9.0))]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"TEAM":"Sixers","W":9.0}"#
        );
    }

    #[test]
    fn test_insert_keeps_header_order() {
        let mut record = Record::new();
        record.insert("b", Value::Number(1.0));
        record.insert("a", Value::Number(2.0));
        record.insert("b", Value::Number(3.0));
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(record.get("b"), &Value::Number(3.0));
    }
}
