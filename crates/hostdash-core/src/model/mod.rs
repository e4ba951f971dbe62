//! Serializable shapes of everything the collectors report.
//!
//! Field names are the JSON keys the dashboard frontend reads, so they are
//! kept stable even where a Rust name would read better.

mod battery;
mod device;
mod hardware;
mod network;
mod process;
mod snapshot;
mod storage;
mod system;

pub use battery::BatteryInfo;
pub use device::{AxisValues, DeviceIdentity, DeviceReport, SensorInfo};
pub use hardware::{CpuCores, CpuInfo, HardwareInfo, MemoryInfo};
pub use network::{ConnectionCounts, InterfaceInfo, NetworkInfo, WifiInfo};
pub use process::{ProcessEntry, ProcessInfo, ProcessSummary};
pub use snapshot::Snapshot;
pub use storage::{DiskIoStats, DiskUsage, Partition, StorageInfo};
pub use system::SystemInfo;
