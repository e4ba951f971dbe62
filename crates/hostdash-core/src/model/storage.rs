use std::collections::BTreeMap;

use serde::Serialize;

use crate::fmt::UNKNOWN;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageInfo {
    pub timestamp: String,
    pub disk_usage: DiskUsage,
    pub partitions: Vec<Partition>,
    /// Block device name -> counters from `/proc/diskstats`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_stats: Option<BTreeMap<String, DiskIoStats>>,
}

/// Usage of the filesystem holding the working directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsage {
    pub total: String,
    pub used: String,
    pub free: String,
    /// As printed by `df`, e.g. `"42%"`.
    pub percent: String,
    pub percent_num: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_point: Option<String>,
}

impl DiskUsage {
    /// Placeholder when no `df` variant could be parsed.
    pub fn unknown() -> Self {
        Self {
            total: UNKNOWN.to_string(),
            used: UNKNOWN.to_string(),
            free: UNKNOWN.to_string(),
            percent: "0%".to_string(),
            percent_num: 0.0,
            mount_point: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub device: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_num: Option<f64>,
    pub mount_point: String,
}

/// The eleven classic `/proc/diskstats` counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiskIoStats {
    pub reads: u64,
    pub reads_merged: u64,
    pub sectors_read: u64,
    pub read_time_ms: u64,
    pub writes: u64,
    pub writes_merged: u64,
    pub sectors_written: u64,
    pub write_time_ms: u64,
    pub io_in_progress: u64,
    pub io_time_ms: u64,
    pub weighted_io_time_ms: u64,
}
