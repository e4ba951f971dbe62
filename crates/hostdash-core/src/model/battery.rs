use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Battery state as a JSON object.
///
/// When `termux-battery-status` answers, its object is kept verbatim
/// (including keys like `plugged` or `current`); the typed setters cover
/// the fields the fallbacks can recover.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatteryInfo(Map<String, Value>);

impl BatteryInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set_percentage(&mut self, percentage: i64) {
        self.0.insert("percentage".into(), Value::from(percentage));
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.0.insert("status".into(), Value::String(status.into()));
    }

    pub fn set_temperature(&mut self, celsius: f64) {
        self.0.insert("temperature".into(), Value::from(celsius));
    }

    pub fn set_health(&mut self, health: impl Into<String>) {
        self.0.insert("health".into(), Value::String(health.into()));
    }

    pub fn percentage(&self) -> Option<f64> {
        self.0.get("percentage").and_then(Value::as_f64)
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    pub fn temperature(&self) -> Option<f64> {
        self.0.get("temperature").and_then(Value::as_f64)
    }

    pub fn health(&self) -> Option<&str> {
        self.0.get("health").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}
