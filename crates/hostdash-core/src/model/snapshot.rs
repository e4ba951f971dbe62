use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fmt::iso_timestamp;

/// One timestamped aggregate of every domain's latest value.
///
/// Keys keep insertion order, so a snapshot serializes with its domains in
/// the order the orchestrator polled them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.0.get("timestamp").and_then(Value::as_str)
    }

    /// Stamps the current local time unless a timestamp is already present.
    pub fn set_timestamp_if_absent(&mut self) {
        if !self.0.contains_key("timestamp") {
            self.0
                .insert("timestamp".to_string(), Value::String(iso_timestamp()));
        }
    }

    /// Follows a dotted path (`hardware.cpu.usage`) through nested objects.
    ///
    /// Returns `None` when a segment is missing or an intermediate value is
    /// not an object.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> Snapshot {
        match value {
            Value::Object(map) => Snapshot::from(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_lookup_nested() {
        let s = snapshot(json!({"hardware": {"cpu": {"usage": 12.5}}}));
        assert_eq!(s.lookup("hardware.cpu.usage"), Some(&json!(12.5)));
        assert_eq!(s.lookup("hardware.cpu"), Some(&json!({"usage": 12.5})));
    }

    #[test]
    fn test_lookup_misses() {
        let s = snapshot(json!({"a": {"b": 1}, "c": [1, 2]}));
        assert_eq!(s.lookup("a.x"), None);
        assert_eq!(s.lookup("a.b.c"), None);
        assert_eq!(s.lookup("c.0"), None);
        assert_eq!(s.lookup("missing"), None);
        assert_eq!(s.lookup(""), None);
    }

    #[test]
    fn test_timestamp_only_set_when_absent() {
        let mut s = Snapshot::new().with("timestamp", json!("t1"));
        s.set_timestamp_if_absent();
        assert_eq!(s.timestamp(), Some("t1"));

        let mut fresh = Snapshot::new();
        fresh.set_timestamp_if_absent();
        assert!(fresh.timestamp().is_some());
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let s = Snapshot::new()
            .with("system", json!({}))
            .with("hardware", json!({}))
            .with("android", json!(null));
        assert_eq!(s.keys().collect::<Vec<_>>(), ["system", "hardware", "android"]);
    }
}
