//! CPU, memory, battery, and thermal sensors.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use tracing::trace;

use super::battery::{BatteryProfile, probe_battery};
use super::cached::{Collect, CollectError};
use super::command::CommandRunner;
use super::fallback::{FallbackChain, ProbeError, ProbeResult};
use super::host::Host;
use super::parser::{
    parse_cpuinfo_cores, parse_cpuinfo_mhz, parse_free_bytes, parse_meminfo_total_free,
    parse_top_cpu_usage,
};
use super::traits::FileSystem;
use crate::fmt::{UNKNOWN, format_bytes, iso_timestamp, round_to};
use crate::model::{CpuCores, CpuInfo, HardwareInfo, MemoryInfo};

const CPUINFO: &str = "/proc/cpuinfo";
const SCALING_CUR_FREQ: &str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq";
const THERMAL_DIR: &str = "/sys/class/thermal";

fn memory_from(total: u64, used: u64) -> MemoryInfo {
    MemoryInfo {
        total: format_bytes(total),
        used: format_bytes(used),
        percent: if total == 0 {
            0.0
        } else {
            round_to(used as f64 / total as f64 * 100.0, 2)
        },
    }
}

/// Thermal zone reading in degrees Celsius, one decimal.
///
/// Values above 1000 are millidegrees.
pub fn normalize_zone_temp(raw: i64) -> f64 {
    let mut temp = raw as f64;
    if raw > 1000 {
        temp /= 1000.0;
    }
    round_to(temp, 1)
}

pub struct HardwareCollector<F, R> {
    host: Host<F, R>,
    cpu_sample_timeout: Duration,
}

impl<F: FileSystem, R: CommandRunner> HardwareCollector<F, R> {
    pub fn new(host: Host<F, R>, cpu_sample_timeout: Duration) -> Self {
        Self {
            host,
            cpu_sample_timeout,
        }
    }

    fn cpu_usage(&self) -> Option<f64> {
        FallbackChain::new("hardware.cpu.usage")
            .step("top -bn1", || {
                let output = self
                    .host
                    .run_with_timeout("top -bn1", self.cpu_sample_timeout)?;
                Ok(parse_top_cpu_usage(&output))
            })
            .run()
    }

    fn cpu_cores(&self) -> Option<CpuCores> {
        FallbackChain::new("hardware.cpu.cores")
            .step("cpuinfo", || Ok(parse_cpuinfo_cores(&self.host.read(CPUINFO)?)))
            .step("nproc", || {
                let output = self.host.run("nproc")?;
                let count = output
                    .trim()
                    .parse()
                    .map_err(|_| ProbeError::parse(format!("nproc printed {output:?}")))?;
                Ok(Some(CpuCores {
                    count,
                    model: UNKNOWN.to_string(),
                }))
            })
            .run()
    }

    fn cpu_frequency(&self) -> Option<f64> {
        FallbackChain::new("hardware.cpu.frequency")
            .step("scaling_cur_freq", || {
                let khz = self.host.read(SCALING_CUR_FREQ)?;
                Ok(khz.trim().parse::<u64>().ok().map(|k| k as f64 / 1000.0))
            })
            .step("cpuinfo", || Ok(parse_cpuinfo_mhz(&self.host.read(CPUINFO)?)))
            .run()
    }

    fn memory(&self) -> MemoryInfo {
        FallbackChain::new("hardware.memory")
            .step("free -b", || {
                let output = self.host.run("free -b")?;
                Ok(parse_free_bytes(&output).map(|(total, used)| memory_from(total, used)))
            })
            .step("meminfo", || -> ProbeResult<MemoryInfo> {
                let content = self.host.read("/proc/meminfo")?;
                Ok(parse_meminfo_total_free(&content).map(|(total_kb, free_kb)| {
                    let used_kb = total_kb.saturating_sub(free_kb);
                    memory_from(total_kb * 1024, used_kb * 1024)
                }))
            })
            .run()
            .unwrap_or_else(|| MemoryInfo {
                total: UNKNOWN.to_string(),
                used: UNKNOWN.to_string(),
                percent: 0.0,
            })
    }

    /// Zone type -> temperature for every readable `thermal_zone*`.
    fn temperatures(&self) -> Option<BTreeMap<String, f64>> {
        let zones = self.host.fs().read_dir(Path::new(THERMAL_DIR)).ok()?;
        let mut temps = BTreeMap::new();
        for zone in zones {
            let Some(zone_name) = zone.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !zone_name.starts_with("thermal_zone") {
                continue;
            }
            let Some(raw) = self
                .host
                .read(zone.join("temp"))
                .ok()
                .and_then(|t| t.trim().parse::<i64>().ok())
            else {
                continue;
            };
            let zone_type = self
                .host
                .read(zone.join("type"))
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| zone_name.to_string());
            temps.insert(zone_type, normalize_zone_temp(raw));
        }
        trace!(zones = temps.len(), "read thermal zones");
        (!temps.is_empty()).then_some(temps)
    }
}

impl<F: FileSystem, R: CommandRunner> Collect for HardwareCollector<F, R> {
    type Output = HardwareInfo;
    const NAME: &'static str = "hardware";

    fn collect_data(&mut self) -> Result<HardwareInfo, CollectError> {
        Ok(HardwareInfo {
            timestamp: iso_timestamp(),
            cpu: CpuInfo {
                usage: self.cpu_usage(),
                cores: self.cpu_cores(),
                frequency: self.cpu_frequency(),
            },
            memory: self.memory(),
            battery: probe_battery(&self.host, BatteryProfile::Hardware).unwrap_or_default(),
            temperature: self.temperatures(),
        })
    }
}
