//! Parsers for pseudo-files and tool output.
//!
//! Pure functions over text, so every format quirk can be tested with a
//! string literal. A parser returning `None` or an empty collection means
//! "this source had nothing usable" and the caller moves to its next
//! fallback.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::fmt::{UNKNOWN, format_bytes, round_to};
use crate::model::{
    ConnectionCounts, CpuCores, DiskIoStats, DiskUsage, InterfaceInfo, Partition, ProcessEntry,
    ProcessSummary, WifiInfo,
};
use crate::util::{IPV4_INET, extract_first_match, extract_parsed};

static CPU_US: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%\s*us").expect("valid regex"));
static CPU_USER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%\s*user").expect("valid regex"));
static CPU_PROCPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s+us").expect("valid regex"));
static CPU_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("valid regex"));
static MODEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^model name\s*:\s*(.+)$").expect("valid regex"));
static HARDWARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Hardware\s*:\s*(.+)$").expect("valid regex"));
static CPU_MHZ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cpu MHz\s*:\s*(\d+(?:\.\d+)?)").expect("valid regex"));
static MEM_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"MemTotal:\s+(\d+)").expect("valid regex"));
static MEM_FREE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"MemFree:\s+(\d+)").expect("valid regex"));
static IFACE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.-]+)").expect("valid regex"));
static RX_BYTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RX (?:packets \d+\s+)?bytes[: ](\d+)").expect("valid regex"));
static TX_BYTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TX (?:packets \d+\s+)?bytes[: ](\d+)").expect("valid regex"));
static RX_PACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RX packets[: ](\d+)").expect("valid regex"));
static TX_PACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TX packets[: ](\d+)").expect("valid regex"));
static WIFI_IP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""ip":\s*"(\d+\.\d+\.\d+\.\d+)""#).expect("valid regex"));
static WIFI_SSID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""ssid":\s*"([^"]+)""#).expect("valid regex"));
static WIFI_BSSID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""bssid":\s*"([^"]+)""#).expect("valid regex"));
static WIFI_FREQUENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""frequency(?:_mhz)?":\s*(\d+)"#).expect("valid regex"));
static WIFI_RSSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""rssi":\s*(-?\d+)"#).expect("valid regex"));
static WIFI_LINK_SPEED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""link_speed(?:_mbps)?":\s*(\d+)"#).expect("valid regex"));
static REAL_DISK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(sd[a-z]|mmcblk\d+|dm-\d+)$").expect("valid regex"));
static STATUS_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"State:\s+(\w)").expect("valid regex"));

/// Filesystems kept in the partition list besides `/dev/*` devices.
const PSEUDO_DEVICES: &[&str] = &["tmpfs", "sdcard"];

// ============ System ============

/// Seconds since boot from `/proc/uptime`.
pub fn parse_proc_uptime(content: &str) -> Option<f64> {
    content.split_whitespace().next()?.parse().ok()
}

// ============ CPU ============

/// CPU busy percentage from `top -bn1` output.
///
/// Handles the `%Cpu(s): 3.2 us` (procps), `CPU: 12.5% usr` (busybox) and
/// `800%cpu 12%user` (toybox) layouts; whole-number percentages are accepted.
pub fn parse_top_cpu_usage(output: &str) -> Option<f64> {
    output
        .lines()
        .filter(|line| line.contains("%Cpu") || line.contains("CPU:") || line.contains("%cpu"))
        .find_map(|line| {
            [&*CPU_US, &*CPU_USER, &*CPU_PROCPS, &*CPU_ANY]
                .into_iter()
                .find_map(|re| extract_parsed::<f64>(line, re))
        })
}

/// Core count and model from `/proc/cpuinfo`.
pub fn parse_cpuinfo_cores(content: &str) -> Option<CpuCores> {
    let count = content
        .lines()
        .filter(|line| line.starts_with("processor"))
        .count();
    if count == 0 {
        return None;
    }
    let model = extract_first_match(content, &MODEL_NAME, 1)
        .or_else(|| extract_first_match(content, &HARDWARE, 1))
        .map(|m| m.trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());
    Some(CpuCores {
        count: u32::try_from(count).unwrap_or(u32::MAX),
        model,
    })
}

/// First `cpu MHz` value from `/proc/cpuinfo`.
pub fn parse_cpuinfo_mhz(content: &str) -> Option<f64> {
    extract_parsed(content, &CPU_MHZ)
}

// ============ Memory ============

/// `(total, used)` bytes from the `Mem:` row of `free -b`.
pub fn parse_free_bytes(output: &str) -> Option<(u64, u64)> {
    let row = output
        .lines()
        .find(|line| line.trim_start().starts_with("Mem:"))
        .or_else(|| output.lines().nth(1))?;
    let parts: Vec<&str> = row.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }
    let total: u64 = parts[1].parse().ok()?;
    let used: u64 = parts[2].parse().ok()?;
    (total > 0).then_some((total, used))
}

/// `(total, free)` in kB from `/proc/meminfo`.
pub fn parse_meminfo_total_free(content: &str) -> Option<(u64, u64)> {
    let total: u64 = extract_parsed(content, &MEM_TOTAL)?;
    let free: u64 = extract_parsed(content, &MEM_FREE)?;
    (total > 0).then_some((total, free))
}

// ============ Network ============

/// One row of `/proc/net/dev`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetDevRow {
    pub name: String,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
}

/// Parses `/proc/net/dev`, skipping the two header lines and malformed rows.
pub fn parse_net_dev(content: &str) -> Vec<NetDevRow> {
    let mut rows = Vec::new();
    for line in content.lines() {
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }
        let Some((name, stats)) = line.split_once(':') else {
            continue;
        };
        let values: Vec<&str> = stats.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }
        let get_val = |idx: usize| -> u64 { values.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };
        rows.push(NetDevRow {
            name: name.trim().to_string(),
            rx_bytes: get_val(0),
            rx_packets: get_val(1),
            tx_bytes: get_val(8),
            tx_packets: get_val(9),
        });
    }
    rows
}

/// Splits `ifconfig` output into per-interface blocks.
///
/// A block starts at every line that does not begin with whitespace.
pub fn split_ifconfig_blocks(output: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    for line in output.lines() {
        let starts_block = line.chars().next().is_some_and(|c| !c.is_whitespace());
        match blocks.last_mut() {
            Some(block) if !starts_block => {
                block.push('\n');
                block.push_str(line);
            }
            _ if line.trim().is_empty() => {}
            _ => blocks.push(line.to_string()),
        }
    }
    blocks
}

/// Interface entry from one `ifconfig` block.
///
/// Understands both the net-tools `RX bytes:N` layout and the newer
/// `RX packets N  bytes N` layout.
pub fn parse_ifconfig_block(block: &str) -> Option<InterfaceInfo> {
    let name = extract_first_match(block, &IFACE_NAME, 1)?.to_string();
    Some(InterfaceInfo {
        name,
        rx_bytes: extract_parsed::<u64>(block, &RX_BYTES).map(format_bytes),
        tx_bytes: extract_parsed::<u64>(block, &TX_BYTES).map(format_bytes),
        rx_packets: extract_parsed(block, &RX_PACKETS),
        tx_packets: extract_parsed(block, &TX_PACKETS),
        ip: extract_first_match(block, &IPV4_INET, 1).map(str::to_string),
    })
}

/// First IPv4 address in `ip addr show <iface>` output.
pub fn parse_interface_ip(output: &str) -> Option<String> {
    extract_first_match(output, &IPV4_INET, 1).map(str::to_string)
}

/// First address printed by `hostname -I`.
pub fn parse_hostname_i(output: &str) -> Option<String> {
    output.split_whitespace().next().map(str::to_string)
}

/// Socket counts from `netstat -tuln` or `ss -tuln`.
///
/// `established_token` is `ESTABLISHED` for netstat and `ESTAB` for ss.
pub fn parse_connection_counts(output: &str, established_token: &str) -> ConnectionCounts {
    let tcp = output.matches("tcp").count();
    let udp = output.matches("udp").count();
    ConnectionCounts {
        count: tcp + udp,
        tcp,
        udp,
        listening: output.matches("LISTEN").count(),
        established: output.matches(established_token).count(),
    }
}

/// IP address from `termux-wifi-connectioninfo`.
pub fn parse_termux_wifi_ip(output: &str) -> Option<String> {
    extract_first_match(output, &WIFI_IP, 1).map(str::to_string)
}

/// WiFi link details from `termux-wifi-connectioninfo`.
pub fn parse_termux_wifi(output: &str) -> Option<WifiInfo> {
    let wifi = WifiInfo {
        ssid: extract_first_match(output, &WIFI_SSID, 1).map(str::to_string),
        bssid: extract_first_match(output, &WIFI_BSSID, 1).map(str::to_string),
        frequency: extract_parsed(output, &WIFI_FREQUENCY),
        signal_strength: extract_parsed(output, &WIFI_RSSI),
        link_speed: extract_first_match(output, &WIFI_LINK_SPEED, 1).map(|s| format!("{s} Mbps")),
    };
    (!wifi.is_empty()).then_some(wifi)
}

// ============ Storage ============

fn df_data_row(output: &str) -> Option<Vec<&str>> {
    let row = output.lines().nth(1)?;
    Some(row.split_whitespace().collect())
}

fn percent_number(percent: &str) -> f64 {
    percent.trim_end_matches('%').parse().unwrap_or(0.0)
}

/// Disk usage from `df -h .`, sizes kept as `df` printed them.
pub fn parse_df_human(output: &str) -> Option<DiskUsage> {
    let parts = df_data_row(output)?;
    if parts.len() < 5 {
        return None;
    }
    Some(DiskUsage {
        total: parts[1].to_string(),
        used: parts[2].to_string(),
        free: parts[3].to_string(),
        percent: parts[4].to_string(),
        percent_num: percent_number(parts[4]),
        mount_point: Some(parts.get(5).copied().unwrap_or("/").to_string()),
    })
}

/// Disk usage from `df -B1 .`, with the percentage recomputed from bytes.
pub fn parse_df_bytes(output: &str) -> Option<DiskUsage> {
    let parts = df_data_row(output)?;
    if parts.len() < 4 {
        return None;
    }
    let total: u64 = parts[1].parse().ok()?;
    let used: u64 = parts[2].parse().ok()?;
    let free: u64 = parts[3].parse().ok()?;
    let percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    Some(DiskUsage {
        total: format_bytes(total),
        used: format_bytes(used),
        free: format_bytes(free),
        percent: format!("{percent:.1}%"),
        percent_num: round_to(percent, 1),
        mount_point: Some(parts.get(5).copied().unwrap_or("/").to_string()),
    })
}

/// Devices worth listing as partitions.
pub fn is_listed_device(device: &str) -> bool {
    device.starts_with("/dev/") || PSEUDO_DEVICES.contains(&device)
}

/// Partitions from `df -h` over every mount.
pub fn parse_df_partitions(output: &str) -> Vec<Partition> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 || !is_listed_device(parts[0]) {
                return None;
            }
            Some(Partition {
                device: parts[0].to_string(),
                total: Some(parts[1].to_string()),
                used: Some(parts[2].to_string()),
                free: Some(parts[3].to_string()),
                percent: Some(parts[4].to_string()),
                percent_num: Some(percent_number(parts[4])),
                mount_point: parts[5].to_string(),
            })
        })
        .collect()
}

/// `(device, mount point)` pairs from `mount` output.
pub fn parse_mount_candidates(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter(|line| line.contains("type "))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 || !is_listed_device(parts[0]) {
                return None;
            }
            Some((parts[0].to_string(), parts[2].to_string()))
        })
        .collect()
}

/// Fills a partition's usage from `df -h <mount>` output.
pub fn parse_df_mount(output: &str, device: &str, mount_point: &str) -> Option<Partition> {
    let parts = df_data_row(output)?;
    if parts.len() < 5 {
        return None;
    }
    Some(Partition {
        device: device.to_string(),
        total: Some(parts[1].to_string()),
        used: Some(parts[2].to_string()),
        free: Some(parts[3].to_string()),
        percent: Some(parts[4].to_string()),
        percent_num: Some(percent_number(parts[4])),
        mount_point: mount_point.to_string(),
    })
}

/// Whole-disk rows of `/proc/diskstats` (`sdX`, `mmcblkN`, `dm-N`).
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged
/// w_sectors w_time io_pending io_time w_io_time [discards ...]
pub fn parse_diskstats(content: &str) -> BTreeMap<String, DiskIoStats> {
    let mut disks = BTreeMap::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 || !REAL_DISK.is_match(parts[2]) {
            continue;
        }
        let get_val = |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };
        disks.insert(
            parts[2].to_string(),
            DiskIoStats {
                reads: get_val(3),
                reads_merged: get_val(4),
                sectors_read: get_val(5),
                read_time_ms: get_val(6),
                writes: get_val(7),
                writes_merged: get_val(8),
                sectors_written: get_val(9),
                write_time_ms: get_val(10),
                io_in_progress: get_val(11),
                io_time_ms: get_val(12),
                weighted_io_time_ms: get_val(13),
            },
        );
    }
    disks
}

// ============ Processes ============

/// Splits on whitespace into at most `n` fields; the last keeps its spaces.
fn split_fields(line: &str, n: usize) -> Vec<&str> {
    let mut parts = Vec::with_capacity(n);
    let mut rest = line.trim();
    while !rest.is_empty() && parts.len() + 1 < n {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        parts.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    if !rest.is_empty() {
        parts.push(rest);
    }
    parts
}

/// Process counts by state from `ps aux`.
///
/// The state is the first letter of the `STAT` column, so `Ss` and `S<`
/// count as sleeping.
pub fn parse_ps_summary(output: &str) -> ProcessSummary {
    let mut summary = ProcessSummary::default();
    for line in output.lines().skip(1).filter(|l| !l.trim().is_empty()) {
        summary.total += 1;
        if let Some(state) = line.split_whitespace().nth(7).and_then(|s| s.chars().next()) {
            summary.count_state(state);
        }
    }
    summary
}

/// State letter from `/proc/<pid>/status`.
pub fn parse_proc_status_state(content: &str) -> Option<char> {
    extract_first_match(content, &STATUS_STATE, 1).and_then(|s| s.chars().next())
}

/// Top processes from `ps aux --sort=-pcpu,-pmem`.
///
/// `VSZ` and `RSS` are KiB and rendered as formatted bytes.
pub fn parse_ps_processes(output: &str, limit: usize) -> Vec<ProcessEntry> {
    output
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parts = split_fields(line, 11);
            if parts.len() < 11 {
                return None;
            }
            let kib = |s: &str| s.parse::<u64>().ok().map(|v| format_bytes(v.saturating_mul(1024)));
            Some(ProcessEntry {
                user: parts[0].to_string(),
                pid: parts[1].parse().ok()?,
                cpu_percent: parts[2].parse().ok()?,
                mem_percent: parts[3].parse().ok()?,
                vsz: Some(kib(parts[4])?),
                rss: Some(kib(parts[5])?),
                tty: Some(parts[6].to_string()),
                stat: Some(parts[7].to_string()),
                start: Some(parts[8].to_string()),
                time: Some(parts[9].to_string()),
                command: parts[10].to_string(),
            })
        })
        .take(limit)
        .collect()
}

/// Top processes from `top -b -n 1`.
///
/// Rows after the header containing `PID`, `USER` and `COMMAND` are read
/// as pid, user, ..., %CPU (column 8), %MEM (column 9), ..., command (11+).
pub fn parse_top_processes(output: &str, limit: usize) -> Vec<ProcessEntry> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());
    if !lines
        .by_ref()
        .any(|line| line.contains("PID") && line.contains("USER") && line.contains("COMMAND"))
    {
        return Vec::new();
    }
    lines
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 12 {
                return None;
            }
            Some(ProcessEntry {
                user: parts[1].to_string(),
                pid: parts[0].parse().ok()?,
                cpu_percent: parts[8].trim_end_matches('%').parse().ok()?,
                mem_percent: parts[9].trim_end_matches('%').parse().ok()?,
                vsz: None,
                rss: None,
                tty: None,
                stat: None,
                start: None,
                time: None,
                command: parts[11..].join(" "),
            })
        })
        .take(limit)
        .collect()
}
