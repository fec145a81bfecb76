//! INFO / CLUSTER INFO report parsing
//!
//! Both reports are `key:value` lines mixed with `# Section` headers and
//! blank lines. Anything that is not a `key:value` pair is dropped without
//! complaint.

use chrono::{DateTime, TimeZone, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::str::FromStr;

/// Synthetic key holding the capture time (epoch milliseconds)
pub const TIMESTAMP_KEY: &str = "_timestamp";

/// Ordered `key -> value` pairs from a colon-separated report.
///
/// Keys keep the position of their first occurrence; a repeated key takes the
/// last value seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoReport {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl InfoReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].1.as_str())
    }

    /// Value parsed into `T`, `None` if missing or unparsable
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.parse().ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the report was captured, if it was stamped by [`parse_info_result`]
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        let millis = self.get_parsed::<i64>(TIMESTAMP_KEY)?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

impl Serialize for InfoReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parse `key:value` lines, splitting on the first colon.
///
/// Lines without a colon, or with nothing before or after it, are skipped.
/// Keys and values are trimmed.
pub fn parse_colon_separated(text: &str) -> InfoReport {
    let mut report = InfoReport::new();
    for line in text.split('\n') {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.is_empty() || value.is_empty() {
            continue;
        }
        report.insert(key.trim(), value.trim());
    }
    report
}

/// Parse an `INFO` reply and stamp it with the capture time.
pub fn parse_info_result(text: &str) -> InfoReport {
    let mut report = parse_colon_separated(text);
    report.insert(TIMESTAMP_KEY, Utc::now().timestamp_millis().to_string());
    report
}

/// Parse a `CLUSTER INFO` reply.
pub fn parse_cluster_info_result(text: &str) -> InfoReport {
    parse_colon_separated(text)
}
