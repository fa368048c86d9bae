//! Heterogeneous option values.
//!
//! Callers hand the SDK scalars, booleans, lists, datetimes, or raw JSON
//! depending on the option; the wire wants a single flat string for each.
//! [`OptionValue`] is the accept-many-shapes input type, with one canonical
//! rendering per shape.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde_json::Value;

/// A single upload option value before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Rendered as a comma-joined list.
    List(Vec<OptionValue>),
    /// A datetime bound, rendered as ISO-8601.
    DateTime(DateTimeValue),
    /// Arbitrary JSON, rendered compact.
    Json(Value),
}

/// A datetime that may or may not carry a UTC offset.
///
/// Naive values serialize without an offset (`2019-02-22T16:20:57`), aware
/// values keep theirs (`2019-03-22T00:00:00+00:00`).
#[derive(Debug, Clone, PartialEq)]
pub enum DateTimeValue {
    Naive(NaiveDateTime),
    Fixed(DateTime<FixedOffset>),
}

impl DateTimeValue {
    pub fn to_wire(&self) -> String {
        match self {
            DateTimeValue::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            DateTimeValue::Fixed(dt) => dt.to_rfc3339(),
        }
    }
}

impl OptionValue {
    /// Canonical wire rendering. Normalization is idempotent: rendering an
    /// already-canonical string yields the same string.
    pub fn to_wire(&self) -> String {
        match self {
            OptionValue::String(s) => s.clone(),
            OptionValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            OptionValue::Int(i) => i.to_string(),
            OptionValue::Float(f) => f.to_string(),
            OptionValue::List(items) => items
                .iter()
                .map(OptionValue::to_wire)
                .collect::<Vec<_>>()
                .join(","),
            OptionValue::DateTime(dt) => dt.to_wire(),
            OptionValue::Json(value) => match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }

    /// True when rendering would produce an empty string; such values are
    /// omitted from the wire set entirely.
    pub fn is_empty(&self) -> bool {
        match self {
            OptionValue::String(s) => s.is_empty(),
            OptionValue::List(items) => items.is_empty(),
            OptionValue::Json(Value::Null) => true,
            OptionValue::Json(Value::String(s)) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<u32> for OptionValue {
    fn from(i: u32) -> Self {
        OptionValue::Int(i as i64)
    }
}

impl From<f64> for OptionValue {
    fn from(f: f64) -> Self {
        OptionValue::Float(f)
    }
}

impl From<Value> for OptionValue {
    fn from(v: Value) -> Self {
        OptionValue::Json(v)
    }
}

impl From<NaiveDateTime> for OptionValue {
    fn from(dt: NaiveDateTime) -> Self {
        OptionValue::DateTime(DateTimeValue::Naive(dt))
    }
}

impl From<DateTime<FixedOffset>> for OptionValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        OptionValue::DateTime(DateTimeValue::Fixed(dt))
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(items: Vec<T>) -> Self {
        OptionValue::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scalars_render_canonically() {
        assert_eq!(OptionValue::from(true).to_wire(), "true");
        assert_eq!(OptionValue::from(false).to_wire(), "false");
        assert_eq!(OptionValue::from(42i64).to_wire(), "42");
        assert_eq!(OptionValue::from("plain").to_wire(), "plain");
    }

    #[test]
    fn lists_join_with_commas() {
        let v = OptionValue::from(vec!["a", "b", "c"]);
        assert_eq!(v.to_wire(), "a,b,c");
    }

    #[test]
    fn naive_datetime_has_no_offset() {
        let dt = NaiveDateTime::parse_from_str("2019-02-22 16:20:57", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(OptionValue::from(dt).to_wire(), "2019-02-22T16:20:57");
    }

    #[test]
    fn aware_datetime_keeps_offset() {
        let dt = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2019, 3, 22, 0, 0, 0)
            .unwrap();
        assert_eq!(OptionValue::from(dt).to_wire(), "2019-03-22T00:00:00+00:00");
    }

    #[test]
    fn rendering_is_idempotent() {
        let once = OptionValue::from("a,b").to_wire();
        let twice = OptionValue::from(once.as_str()).to_wire();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_values_are_detected() {
        assert!(OptionValue::from("").is_empty());
        assert!(OptionValue::List(vec![]).is_empty());
        assert!(OptionValue::Json(Value::Null).is_empty());
        assert!(!OptionValue::from(false).is_empty());
    }
}
