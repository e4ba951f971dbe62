//! Android device identity, battery, and sensors via the Termux API.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use super::battery::{BatteryProfile, probe_battery};
use super::cached::{Collect, CollectError};
use super::command::CommandRunner;
use super::fallback::{FallbackChain, ProbeResult};
use super::host::Host;
use super::traits::FileSystem;
use crate::fmt::iso_timestamp;
use crate::model::{AxisValues, DeviceIdentity, DeviceReport, SensorInfo};
use crate::util::{parse_json_lenient, value_to_string};

/// `termux-info` JSON key and `getprop` property for each identity field.
const IDENTITY_SOURCES: [(&str, &str); 4] = [
    ("DEVICE_MANUFACTURER", "ro.product.manufacturer"),
    ("DEVICE_MODEL", "ro.product.model"),
    ("ANDROID_VERSION", "ro.build.version.release"),
    ("ANDROID_SDK", "ro.build.version.sdk"),
];

fn identity_field(identity: &mut DeviceIdentity, idx: usize) -> &mut Option<String> {
    match idx {
        0 => &mut identity.manufacturer,
        1 => &mut identity.model,
        2 => &mut identity.android_version,
        _ => &mut identity.android_sdk,
    }
}

/// Sensor key as reported: lowercase, spaces replaced by `_`.
pub fn sensor_key(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Identity from `termux-info` JSON; `None` if it is not a JSON object.
pub fn parse_termux_info(output: &str) -> Option<DeviceIdentity> {
    let Value::Object(info) = parse_json_lenient(output)? else {
        return None;
    };
    let mut identity = DeviceIdentity::default();
    for (idx, &(key, _)) in IDENTITY_SOURCES.iter().enumerate() {
        *identity_field(&mut identity, idx) = info.get(key).and_then(value_to_string);
    }
    Some(identity)
}

/// Sensor list from `termux-sensor -l`.
///
/// Accepts an array of `{name, type, vendor}` objects or the
/// `{"sensors": ["name", ...]}` form.
pub fn parse_sensor_list(output: &str) -> BTreeMap<String, SensorInfo> {
    let unknown = || Value::String("Unknown".to_string());
    let entries = match parse_json_lenient(output) {
        Some(Value::Array(entries)) => entries,
        Some(Value::Object(mut obj)) => match obj.remove("sensors") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut sensors = BTreeMap::new();
    for entry in entries {
        let (name, kind, vendor) = match &entry {
            Value::String(name) => (name.as_str(), unknown(), unknown()),
            Value::Object(obj) => {
                let Some(name) = obj.get("name").and_then(Value::as_str) else {
                    continue;
                };
                (
                    name,
                    obj.get("type").cloned().unwrap_or_else(unknown),
                    obj.get("vendor").cloned().unwrap_or_else(unknown),
                )
            }
            _ => continue,
        };
        sensors.insert(
            sensor_key(name),
            SensorInfo {
                kind,
                vendor,
                values: None,
                value: None,
            },
        );
    }
    sensors
}

/// `values` array of the first reading in `termux-sensor -s <name> -n 1`.
///
/// Handles both `[{"values": [...]}]` and `{"<sensor>": {"values": [...]}}`.
pub fn parse_sensor_sample(output: &str) -> Option<Vec<Value>> {
    let first = match parse_json_lenient(output)? {
        Value::Array(mut readings) if !readings.is_empty() => readings.swap_remove(0),
        Value::Object(readings) => readings.into_iter().next()?.1,
        _ => return None,
    };
    match first.get("values") {
        Some(Value::Array(values)) => Some(values.clone()),
        _ => Some(Vec::new()),
    }
}

pub struct DeviceCollector<F, R> {
    host: Host<F, R>,
    placeholder_model: String,
}

impl<F: FileSystem, R: CommandRunner> DeviceCollector<F, R> {
    pub fn new(host: Host<F, R>, placeholder_model: impl Into<String>) -> Self {
        Self {
            host,
            placeholder_model: placeholder_model.into(),
        }
    }

    fn identity_from_getprop(&self) -> ProbeResult<DeviceIdentity> {
        let mut identity = DeviceIdentity::default();
        for (idx, &(_, prop)) in IDENTITY_SOURCES.iter().enumerate() {
            match self.host.run_argv(&["getprop", prop]) {
                Ok(value) if !value.is_empty() => *identity_field(&mut identity, idx) = Some(value),
                Ok(_) => {}
                Err(e) => debug!(property = prop, error = %e, "getprop failed"),
            }
        }
        Ok((!identity.is_empty()).then_some(identity))
    }

    fn identity(&self) -> DeviceIdentity {
        FallbackChain::new("android.device_info")
            .step("termux-info", || {
                let identity = parse_termux_info(&self.host.run("termux-info")?);
                Ok(identity.filter(|i| !i.is_empty()))
            })
            .step("getprop", || self.identity_from_getprop())
            .run()
            .unwrap_or_else(|| DeviceIdentity {
                model: Some(self.placeholder_model.clone()),
                ..DeviceIdentity::default()
            })
    }

    /// Samples one sensor; any failure leaves the entry unchanged.
    fn sample(&self, sensor: &str) -> Option<Vec<Value>> {
        let output = self
            .host
            .run_argv(&["termux-sensor", "-s", sensor, "-n", "1"])
            .ok()?;
        parse_sensor_sample(&output)
    }

    fn sensors(&self) -> Option<BTreeMap<String, SensorInfo>> {
        let output = self.host.run("termux-sensor -l").ok()?;
        let mut sensors = parse_sensor_list(&output);
        if sensors.is_empty() {
            return None;
        }

        if sensors.contains_key("accelerometer")
            && let Some(values) = self.sample("accelerometer")
            && let Some(accel) = sensors.get_mut("accelerometer")
        {
            let axis = |i: usize| values.get(i).and_then(Value::as_f64).unwrap_or(0.0);
            accel.values = Some(AxisValues {
                x: axis(0),
                y: axis(1),
                z: axis(2),
            });
        }
        if sensors.contains_key("light")
            && let Some(values) = self.sample("light")
            && let Some(light) = sensors.get_mut("light")
        {
            light.value = Some(values.into_iter().next().unwrap_or(Value::from(0)));
        }
        Some(sensors)
    }
}

impl<F: FileSystem, R: CommandRunner> Collect for DeviceCollector<F, R> {
    type Output = DeviceReport;
    const NAME: &'static str = "android";

    fn collect_data(&mut self) -> Result<DeviceReport, CollectError> {
        Ok(DeviceReport {
            timestamp: iso_timestamp(),
            device_info: self.identity(),
            battery: probe_battery(&self.host, BatteryProfile::Device),
            sensors: self.sensors(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockFs, MockRunner};
    use serde_json::json;

    fn collector(runner: MockRunner) -> DeviceCollector<MockFs, MockRunner> {
        DeviceCollector::new(Host::new(MockFs::new(), runner), "Galaxy S10+")
    }

    #[test]
    fn test_identity_from_termux_info() {
        let runner = MockRunner::new().with_output(
            "termux-info",
            r#"{"DEVICE_MANUFACTURER": "samsung", "DEVICE_MODEL": "SM-G975F", "ANDROID_VERSION": "12", "ANDROID_SDK": 31}"#,
        );
        let identity = collector(runner).identity();
        assert_eq!(identity.manufacturer.as_deref(), Some("samsung"));
        assert_eq!(identity.model.as_deref(), Some("SM-G975F"));
        assert_eq!(identity.android_version.as_deref(), Some("12"));
        assert_eq!(identity.android_sdk.as_deref(), Some("31"));
    }

    #[test]
    fn test_identity_from_getprop() {
        let runner = MockRunner::new()
            .with_output("termux-info", "Packages CPU architecture: aarch64")
            .with_output("getprop ro.product.manufacturer", "Google")
            .with_output("getprop ro.product.model", "Pixel 7")
            .with_output("getprop ro.build.version.release", "14");
        let identity = collector(runner).identity();
        assert_eq!(identity.manufacturer.as_deref(), Some("Google"));
        assert_eq!(identity.model.as_deref(), Some("Pixel 7"));
        assert_eq!(identity.android_version.as_deref(), Some("14"));
        assert_eq!(identity.android_sdk, None);
    }

    #[test]
    fn test_identity_placeholder() {
        let identity = collector(MockRunner::new()).identity();
        assert_eq!(
            identity,
            DeviceIdentity {
                model: Some("Galaxy S10+".into()),
                ..DeviceIdentity::default()
            }
        );
    }

    #[test]
    fn test_sensors_with_samples() {
        let runner = MockRunner::new()
            .with_output(
                "termux-sensor -l",
                r#"[{"name": "Accelerometer", "type": 1, "vendor": "STMicro"}, {"name": "Light"}, {"type": 5}]"#,
            )
            .with_output(
                "termux-sensor -s accelerometer -n 1",
                r#"{"LSM6DSO Accelerometer": {"values": [0.1, 9.8, -0.2]}}"#,
            )
            .with_output("termux-sensor -s light -n 1", r#"[{"values": [120.5]}]"#);
        let sensors = collector(runner).sensors().unwrap();

        assert_eq!(sensors.len(), 2);
        let accel = &sensors["accelerometer"];
        assert_eq!(accel.kind, json!(1));
        assert_eq!(accel.vendor, json!("STMicro"));
        assert_eq!(
            accel.values,
            Some(AxisValues {
                x: 0.1,
                y: 9.8,
                z: -0.2
            })
        );
        let light = &sensors["light"];
        assert_eq!(light.vendor, json!("Unknown"));
        assert_eq!(light.value, Some(json!(120.5)));
    }

    #[test]
    fn test_sensor_sample_failure_is_swallowed() {
        let runner = MockRunner::new()
            .with_output("termux-sensor -l", r#"{"sensors": ["Light Sensor", "light"]}"#)
            .with_timeout("termux-sensor -s light -n 1");
        let sensors = collector(runner).sensors().unwrap();
        assert!(sensors.contains_key("light_sensor"));
        assert_eq!(sensors["light"].value, None);
    }

    #[test]
    fn test_report_without_termux() {
        let mut c = collector(MockRunner::new());
        let report = c.collect_data().unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["device_info"], json!({"model": "Galaxy S10+"}));
        assert!(json["battery"].is_null());
        assert!(json.get("sensors").is_none());
    }
}
