use std::collections::BTreeMap;

use serde::Serialize;

use super::BatteryInfo;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareInfo {
    pub timestamp: String,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub battery: BatteryInfo,
    /// Thermal zone type -> degrees Celsius, `null` when no zone is readable.
    pub temperature: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInfo {
    /// Percent busy, `None` when no monitor tool answered.
    pub usage: Option<f64>,
    pub cores: Option<CpuCores>,
    /// MHz.
    pub frequency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuCores {
    pub count: u32,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total: String,
    pub used: String,
    pub percent: f64,
}
