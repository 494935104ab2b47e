//! Tolerant scalar parsing for host-supplied values.
//!
//! Every function here maps a malformed input to `None` instead of an error,
//! so a single bad field never aborts decoding of its siblings.

use serde_json::Value;

use crate::types::EpochSeconds;

/// Lower bound of a progress percentage.
pub const PROGRESS_MIN: u8 = 0;

/// Upper bound of a progress percentage.
pub const PROGRESS_MAX: u8 = 100;

// ---------------------------------------------------------------------------
// String inputs (flat query fields)
// ---------------------------------------------------------------------------

/// Parse a finite number. Blank strings, `NaN` and infinities are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse an integer identifier, accepting decimal notation and truncating it.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    parse_number(trimmed).map(|n| n.trunc() as i64)
}

/// Parse an epoch-seconds instant. Fractional seconds are floored.
pub fn parse_epoch(raw: &str) -> Option<EpochSeconds> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    parse_number(trimmed).map(|n| n.floor() as i64)
}

/// Parse a progress percentage and clamp it into `0..=100`.
pub fn parse_progress(raw: &str) -> Option<u8> {
    parse_number(raw).map(clamp_progress)
}

/// Round and clamp a numeric progress value into `0..=100`.
pub fn clamp_progress(value: f64) -> u8 {
    value
        .round()
        .clamp(f64::from(PROGRESS_MIN), f64::from(PROGRESS_MAX)) as u8
}

// ---------------------------------------------------------------------------
// JSON inputs (whole-payload form)
// ---------------------------------------------------------------------------

/// Numeric value of a JSON number or numeric string.
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Integer value of a JSON number or numeric string, truncated.
pub fn value_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_integer(s),
        _ => None,
    }
}

/// Epoch-seconds value of a JSON number or numeric string, floored.
pub fn value_epoch(value: &Value) -> Option<EpochSeconds> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64)),
        Value::String(s) => parse_epoch(s),
        _ => None,
    }
}

/// Progress value of a JSON number or numeric string, clamped.
pub fn value_progress(value: &Value) -> Option<u8> {
    value_number(value).map(clamp_progress)
}

/// Boolean value of a JSON bool, `0`/`1` number, or `"0"`/`"1"`/`"true"`/`"false"` string.
pub fn value_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// String value of a JSON string. Other JSON types yield `None`.
pub fn value_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// `true` when the string is absent or contains only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_rejects_garbage_and_blank() {
        assert_eq!(parse_number("not-a-number"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn number_accepts_padded_decimal() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
    }

    #[test]
    fn epoch_floors_fractional_seconds() {
        assert_eq!(parse_epoch("1700000000"), Some(1_700_000_000));
        assert_eq!(parse_epoch("1700000000.9"), Some(1_700_000_000));
        assert_eq!(parse_epoch("-1.5"), Some(-2));
    }

    #[test]
    fn integer_truncates() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("42.7"), Some(42));
        assert_eq!(parse_integer("x42"), None);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(parse_progress("40"), Some(40));
        assert_eq!(parse_progress("-5"), Some(0));
        assert_eq!(parse_progress("250"), Some(100));
        assert_eq!(parse_progress("33.6"), Some(34));
        assert_eq!(parse_progress("abc"), None);
    }

    #[test]
    fn json_values() {
        assert_eq!(value_integer(&json!(7)), Some(7));
        assert_eq!(value_integer(&json!("7")), Some(7));
        assert_eq!(value_integer(&json!(null)), None);
        assert_eq!(value_epoch(&json!(10.9)), Some(10));
        assert_eq!(value_progress(&json!(140)), Some(100));
        assert_eq!(value_bool(&json!(true)), Some(true));
        assert_eq!(value_bool(&json!(0)), Some(false));
        assert_eq!(value_bool(&json!("1")), Some(true));
        assert_eq!(value_bool(&json!("maybe")), None);
        assert_eq!(value_string(&json!("x")), Some("x".to_string()));
        assert_eq!(value_string(&json!(3)), None);
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(None));
        assert!(is_blank(Some("  \t")));
        assert!(!is_blank(Some(" a ")));
    }
}
