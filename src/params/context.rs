//! Context metadata encoding.
//!
//! Context maps travel as `key=value` pairs joined with `|`; literal `=` and
//! `|` inside values (only values) are backslash-escaped. Insertion order is
//! preserved so the encoded form (and therefore the signature) is stable.

/// An ordered key/value map of contextual metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMap {
    entries: Vec<(String, String)>,
}

impl ContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_wire(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, escape(v)))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContextMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn escape(raw: &str) -> String {
    raw.replace('=', "\\=").replace('|', "\\|")
}
