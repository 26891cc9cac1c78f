// Metric domain model - raw snapshot values and their parsed form
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("snapshot is not a JSON object")]
    NotAnObject,
}

/// One inbound telemetry message, keyed by metric name
#[derive(Debug, Clone, Default)]
pub struct MetricSnapshot {
    fields: Map<String, Value>,
}

impl MetricSnapshot {
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(SnapshotError::NotAnObject),
        }
    }

    /// Value for `key` if it is present and truthy.
    ///
    /// Absent keys, `null`, `false`, `0` and `""` all read as missing. That
    /// means a real zero reading is skipped; a corrected version should
    /// tell "absent key" apart from "present but zero".
    pub fn present(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| is_truthy(value))
    }

    /// Display string for `key` if it is present and truthy
    pub fn display(&self, key: &str) -> Option<String> {
        self.present(key).map(display_string)
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a raw value, as a stat card would show it
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.is_f64() => n.as_f64().map(number_string).unwrap_or_default(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip form of `v`: plain decimal for magnitudes in
/// `[1e-7, 1e21)`, exponent form like `1e+21` or `1.5e-8` outside it.
fn number_string(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if (1e-7..1e21).contains(&v.abs()) {
        return format!("{v}");
    }
    let exponent = format!("{v:e}");
    match exponent.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exponent,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSample {
    pub value: f64,
    pub unit: String,
}

impl ParsedSample {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Placeholder for a series that had no reading on an advancing axis
    pub fn gap() -> Self {
        Self::new(f64::NAN, "")
    }

    pub fn is_gap(&self) -> bool {
        self.value.is_nan()
    }
}

fn is_unit_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '%' || c == '°'
}

/// First maximal run of `[°A-Za-z%]` anywhere in `s`, or "" if there is none.
///
/// The scan is not anchored to the end of the string, so `"up 3 days"`
/// yields `"up"`.
pub fn extract_unit(s: &str) -> String {
    let Some(start) = s.find(is_unit_char) else {
        return String::new();
    };
    let rest = &s[start..];
    let end = rest.find(|c| !is_unit_char(c)).unwrap_or(rest.len());
    rest[..end].to_string()
}

/// Leading decimal literal of `s`, NaN when there is none.
///
/// Leading whitespace is skipped and trailing garbage ignored, so
/// `" 41.0°C"` parses as `41.0`.
pub fn parse_leading_float(s: &str) -> f64 {
    let text = s.trim_start();
    let bytes = text.as_bytes();
    let mut i = 0;

    let negative = matches!(bytes.first(), Some(b'-'));
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        i += 1;
    }
    if text[i..].starts_with("Infinity") {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return f64::NAN;
    }

    let mut end = i;
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    text[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse a raw snapshot value into magnitude and unit
pub fn format_value(value: &Value) -> ParsedSample {
    if value.is_null() {
        return ParsedSample::new(0.0, "");
    }
    let text = display_string(value);
    let magnitude = match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        _ => parse_leading_float(&text),
    };
    ParsedSample::new(magnitude, extract_unit(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_extract_unit() {
        assert_eq!(extract_unit("41.0°C"), "°C");
        assert_eq!(extract_unit("87%"), "%");
        assert_eq!(extract_unit("87"), "");
        assert_eq!(extract_unit("2048MB"), "MB");
        assert_eq!(extract_unit("12 MB/s"), "MB");
    }

    #[test]
    fn test_extract_unit_scans_past_the_suffix() {
        // first letter run wins, wherever it sits
        assert_eq!(extract_unit("up 3 days"), "up");
        assert_eq!(extract_unit("1.5e3kB"), "e");
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("73.2%"), 73.2);
        assert_eq!(parse_leading_float("  -4.5e3kB"), -4500.0);
        assert_eq!(parse_leading_float(".5%"), 0.5);
        assert_eq!(parse_leading_float("+7"), 7.0);
        assert_eq!(parse_leading_float("1e"), 1.0);
        assert_eq!(parse_leading_float("3.GHz"), 3.0);
        assert_eq!(parse_leading_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_leading_float("abc").is_nan());
        assert!(parse_leading_float("").is_nan());
        assert!(parse_leading_float("-.").is_nan());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("41.0°C")), ParsedSample::new(41.0, "°C"));
        assert_eq!(format_value(&json!(12.5)), ParsedSample::new(12.5, ""));
        assert_eq!(format_value(&json!(null)), ParsedSample::new(0.0, ""));

        let unparseable = format_value(&json!("n/a"));
        assert!(unparseable.value.is_nan());
        assert_eq!(unparseable.unit, "n");
    }

    #[test]
    fn test_truthiness_follows_page_semantics() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!("55%")));
    }

    #[test]
    fn test_snapshot_rejects_non_objects() {
        assert!(matches!(
            MetricSnapshot::from_json("[1, 2]"),
            Err(SnapshotError::NotAnObject)
        ));
        assert!(matches!(
            MetricSnapshot::from_json("{\"cpu_usage\": "),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot =
            MetricSnapshot::from_json(r#"{"process_count": 214, "uptime": "3h 2m", "cpu_mhz": ""}"#)
                .unwrap();
        assert_eq!(snapshot.display("process_count").as_deref(), Some("214"));
        assert_eq!(snapshot.display("uptime").as_deref(), Some("3h 2m"));
        assert_eq!(snapshot.display("cpu_mhz"), None);
        assert_eq!(snapshot.display("missing"), None);
    }

    #[test]
    fn test_float_readings_display_in_shortest_form() {
        let snapshot =
            MetricSnapshot::from_json(r#"{"cpu_mhz": 2400.0, "process_count": 1e16, "load_1": 0.25}"#)
                .unwrap();
        assert_eq!(snapshot.display("cpu_mhz").as_deref(), Some("2400"));
        assert_eq!(snapshot.display("process_count").as_deref(), Some("10000000000000000"));
        assert_eq!(snapshot.display("load_1").as_deref(), Some("0.25"));

        assert_eq!(display_string(&json!(-0.0)), "0");
        assert_eq!(display_string(&json!(1e21)), "1e+21");
        assert_eq!(display_string(&json!(1.5e-8)), "1.5e-8");
        assert_eq!(display_string(&json!(1e-7)), "0.0000001");

        assert_eq!(format_value(&json!(1e16)), ParsedSample::new(1e16, ""));
        assert_eq!(format_value(&json!(2400.0)), ParsedSample::new(2400.0, ""));
    }

    proptest! {
        #[test]
        fn prop_extract_unit_is_first_unit_run(s in "[0-9a-zA-Z%° .:/_-]{0,24}") {
            let unit = extract_unit(&s);
            match s.find(is_unit_char) {
                None => prop_assert!(unit.is_empty()),
                Some(start) => {
                    prop_assert!(!unit.is_empty());
                    prop_assert!(s[start..].starts_with(&unit));
                    prop_assert!(unit.chars().all(is_unit_char));
                    let after = s[start + unit.len()..].chars().next();
                    prop_assert!(after.is_none_or(|c| !is_unit_char(c)));
                }
            }
        }

        #[test]
        fn prop_format_value_matches_parts(s in "[0-9a-zA-Z%° .+-]{0,16}") {
            let sample = format_value(&Value::String(s.clone()));
            let expected = parse_leading_float(&s);
            prop_assert!(sample.value == expected || (sample.value.is_nan() && expected.is_nan()));
            prop_assert_eq!(sample.unit, extract_unit(&s));
        }
    }
}
