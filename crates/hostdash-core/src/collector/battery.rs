//! Battery probing shared by the hardware and device collectors.
//!
//! Three tiers, in order:
//! 1. `termux-battery-status` JSON, kept verbatim.
//! 2. Regex extraction over the same text when it ran but was not JSON.
//! 3. Direct reads of `/sys/class/power_supply/battery/*`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::command::CommandRunner;
use super::fallback::{FallbackChain, ProbeResult};
use super::host::Host;
use super::traits::FileSystem;
use crate::model::BatteryInfo;
use crate::util::{extract_first_match, extract_parsed, parse_json_lenient};

const POWER_SUPPLY: &str = "/sys/class/power_supply/battery";

static PERCENTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"percentage.*?(\d+)").expect("valid regex"));
static STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"status\W*?(\w+)"#).expect("valid regex"));
static TEMPERATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"temperature.*?(\d+)").expect("valid regex"));
static HEALTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"health\W*?(\w+)"#).expect("valid regex"));

/// Which caller is asking; they differ in what they extract and report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryProfile {
    /// Health skipped in the regex tier only; nothing found is an empty object.
    Hardware,
    /// Health extracted in every tier; nothing found is `null`.
    Device,
}

impl BatteryProfile {
    fn extracts_health(self) -> bool {
        matches!(self, BatteryProfile::Device)
    }
}

/// Normalizes a raw `temp` pseudo-file reading to degrees Celsius.
///
/// Readings above 1000 are divided by ten first, then every reading is
/// divided by ten (the file normally holds tenths of a degree).
pub fn normalize_supply_temp(raw: i64) -> f64 {
    let mut temp = raw as f64;
    if raw > 1000 {
        temp /= 10.0;
    }
    temp / 10.0
}

/// Tier 2: pulls known fields out of non-JSON tool output.
pub fn extract_battery_fields(text: &str, profile: BatteryProfile) -> BatteryInfo {
    let mut info = BatteryInfo::new();
    if let Some(percentage) = extract_parsed::<i64>(text, &PERCENTAGE) {
        info.set_percentage(percentage);
    }
    if let Some(status) = extract_first_match(text, &STATUS, 1) {
        info.set_status(status);
    }
    if let Some(temp) = extract_parsed::<f64>(text, &TEMPERATURE) {
        info.set_temperature(temp / 10.0);
    }
    if profile.extracts_health()
        && let Some(health) = extract_first_match(text, &HEALTH, 1)
    {
        info.set_health(health);
    }
    info
}

fn termux_tiers<F: FileSystem, R: CommandRunner>(
    host: &Host<F, R>,
    profile: BatteryProfile,
) -> ProbeResult<BatteryInfo> {
    let output = host.run("termux-battery-status")?;
    if let Some(Value::Object(map)) = parse_json_lenient(&output)
        && !map.is_empty()
    {
        return Ok(Some(BatteryInfo::from_map(map)));
    }
    debug!("termux-battery-status output is not a JSON object, extracting fields");
    let info = extract_battery_fields(&output, profile);
    Ok((!info.is_empty()).then_some(info))
}

fn read_trimmed<F: FileSystem, R: CommandRunner>(host: &Host<F, R>, name: &str) -> Option<String> {
    host.read(format!("{POWER_SUPPLY}/{name}"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn power_supply_tier<F: FileSystem, R: CommandRunner>(
    host: &Host<F, R>,
) -> ProbeResult<BatteryInfo> {
    let mut info = BatteryInfo::new();
    if let Some(capacity) = read_trimmed(host, "capacity") {
        match capacity.parse::<i64>() {
            Ok(percentage) => info.set_percentage(percentage),
            Err(_) => debug!(capacity = %capacity, "ignoring unparseable battery capacity"),
        }
    }
    if let Some(status) = read_trimmed(host, "status") {
        info.set_status(status);
    }
    if let Some(temp) = read_trimmed(host, "temp").and_then(|t| t.parse::<i64>().ok()) {
        info.set_temperature(normalize_supply_temp(temp));
    }
    if let Some(health) = read_trimmed(host, "health") {
        info.set_health(health);
    }
    Ok((!info.is_empty()).then_some(info))
}

/// Runs all tiers; `None` when none of them found anything.
pub fn probe_battery<F: FileSystem, R: CommandRunner>(
    host: &Host<F, R>,
    profile: BatteryProfile,
) -> Option<BatteryInfo> {
    FallbackChain::new("battery")
        .step("termux-battery-status", || termux_tiers(host, profile))
        .step("power_supply", || power_supply_tier(host))
        .run()
}
