//! Access-control normalization.
//!
//! Callers may provide a typed rule, a JSON string holding one rule object or
//! an array of them, or a list mixing both. All forms normalize to a single
//! canonical JSON array string with rule fields in `access_type`, `start`,
//! `end` order; fields beyond those three are passed through after them in
//! their original order. Anything that is not a rule object is a validation
//! error.

use crate::params::value::DateTimeValue;
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Serialize, Serializer};

/// A time bound on an access-control rule.
///
/// Literal strings are passed through untouched; datetimes serialize to
/// ISO-8601 (naive without offset, aware with offset).
#[derive(Debug, Clone, PartialEq)]
pub enum AclTime {
    Literal(String),
    Naive(NaiveDateTime),
    Fixed(DateTime<FixedOffset>),
}

impl AclTime {
    fn to_wire(&self) -> String {
        match self {
            AclTime::Literal(s) => s.clone(),
            AclTime::Naive(dt) => DateTimeValue::Naive(*dt).to_wire(),
            AclTime::Fixed(dt) => DateTimeValue::Fixed(*dt).to_wire(),
        }
    }
}

impl Serialize for AclTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl From<String> for AclTime {
    fn from(s: String) -> Self {
        AclTime::Literal(s)
    }
}

impl From<&str> for AclTime {
    fn from(s: &str) -> Self {
        AclTime::Literal(s.to_string())
    }
}

impl From<NaiveDateTime> for AclTime {
    fn from(dt: NaiveDateTime) -> Self {
        AclTime::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for AclTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        AclTime::Fixed(dt)
    }
}

/// One access-control rule. Field order here is the canonical wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessControlRule {
    pub access_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<AclTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<AclTime>,
}

impl AccessControlRule {
    pub fn new(access_type: impl Into<String>) -> Self {
        Self {
            access_type: access_type.into(),
            start: None,
            end: None,
        }
    }

    pub fn start(mut self, start: impl Into<AclTime>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<AclTime>) -> Self {
        self.end = Some(end.into());
        self
    }
}

/// One caller-supplied access-control entry, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessControlEntry {
    Rule(AccessControlRule),
    /// A JSON string holding one rule object or an array of rule objects.
    /// Each object must name an `access_type`; fields beyond `access_type`,
    /// `start`, and `end` are kept and emitted after the canonical trio.
    Json(String),
}

impl From<AccessControlRule> for AccessControlEntry {
    fn from(rule: AccessControlRule) -> Self {
        AccessControlEntry::Rule(rule)
    }
}

impl From<&str> for AccessControlEntry {
    fn from(json: &str) -> Self {
        AccessControlEntry::Json(json.to_string())
    }
}

impl From<String> for AccessControlEntry {
    fn from(json: String) -> Self {
        AccessControlEntry::Json(json)
    }
}

/// Normalize a list of entries into the canonical JSON array string.
pub fn encode_access_control(entries: &[AccessControlEntry]) -> Result<String> {
    let mut rules = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            AccessControlEntry::Rule(rule) => rules.push(serde_json::to_value(rule)?),
            AccessControlEntry::Json(raw) => {
                let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
                    Error::validation(
                        format!("access_control entry is not valid JSON: {}", e),
                        format!("access_control[{}]", index),
                    )
                })?;
                match value {
                    serde_json::Value::Object(_) => rules.push(canonicalize_rule(value, index)?),
                    serde_json::Value::Array(items) => {
                        for item in items {
                            rules.push(canonicalize_rule(item, index)?);
                        }
                    }
                    _ => {
                        return Err(Error::validation(
                            "access_control entry must be a rule object or an array of rule objects",
                            format!("access_control[{}]", index),
                        ))
                    }
                }
            }
        }
    }
    Ok(serde_json::to_string(&rules)?)
}

/// Reorder a caller-supplied rule object into canonical form: the
/// `access_type`/`start`/`end` trio first, every other field after them in
/// its original position.
fn canonicalize_rule(value: serde_json::Value, index: usize) -> Result<serde_json::Value> {
    let serde_json::Value::Object(map) = value else {
        return Err(Error::validation(
            "access_control rule must be a JSON object",
            format!("access_control[{}]", index),
        ));
    };
    if !map.get("access_type").map(serde_json::Value::is_string).unwrap_or(false) {
        return Err(Error::validation(
            "access_control rule must name an access_type",
            format!("access_control[{}]", index),
        ));
    }
    let mut ordered = serde_json::Map::new();
    for key in ["access_type", "start", "end"] {
        if let Some(v) = map.get(key) {
            ordered.insert(key.to_string(), v.clone());
        }
    }
    for (key, v) in map {
        if !ordered.contains_key(&key) {
            ordered.insert(key, v);
        }
    }
    Ok(serde_json::Value::Object(ordered))
}
