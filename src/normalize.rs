//! Numeric coercion of cell values

use crate::record::Value;

/// Parse text that is fully numeric after trimming.
///
/// Empty text and non-finite spellings (`NaN`, `inf`, `Infinity`) yield `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce a value to a number for comparison.
///
/// Numbers return themselves, numeric text returns the parsed number and
/// everything else (absent, empty, non-numeric text) returns `None`.
pub fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n),
        Value::Number(_) | Value::Absent => None,
        Value::Text(s) => parse_number(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce(&Value::Number(3.5)), Some(3.5));
        assert_eq!(coerce(&Value::Number(f64::NAN)), None);
    }

    #[test]
    fn test_coerce_numeric_text() {
        assert_eq!(coerce(&Value::Text("17".to_string())), Some(17.0));
        assert_eq!(coerce(&Value::Text(" -0.5 ".to_string())), Some(-0.5));
        assert_eq!(coerce(&Value::Text("1e3".to_string())), Some(1000.0));
    }

    #[test]
    fn test_coerce_non_numeric() {
        assert_eq!(coerce(&Value::Absent), None);
        assert_eq!(coerce(&Value::Text(String::new())), None);
        assert_eq!(coerce(&Value::Text("12abc".to_string())), None);
        assert_eq!(coerce(&Value::Text("NaN".to_string())), None);
    }

    #[test]
    fn test_non_finite_text_is_not_numeric() {
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-Infinity"), None);
        assert_eq!(parse_number("+5"), Some(5.0));
        assert_eq!(coerce(&Value::Number(f64::INFINITY)), None);
    }
}
