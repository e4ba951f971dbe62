use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::BatteryInfo;

/// Android-specific telemetry, reported under the `android` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceReport {
    pub timestamp: String,
    pub device_info: DeviceIdentity,
    /// `null` when no battery source answered.
    pub battery: Option<BatteryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensors: Option<BTreeMap<String, SensorInfo>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_sdk: Option<String>,
}

impl DeviceIdentity {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorInfo {
    #[serde(rename = "type")]
    pub kind: Value,
    pub vendor: Value,
    /// Accelerometer sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<AxisValues>,
    /// Light sensor sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisValues {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
