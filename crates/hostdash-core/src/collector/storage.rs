//! Disk usage, partitions, and block I/O counters.

use std::collections::BTreeMap;

use super::cached::{Collect, CollectError};
use super::command::CommandRunner;
use super::fallback::{FallbackChain, ProbeResult};
use super::host::Host;
use super::parser::{
    parse_df_bytes, parse_df_human, parse_df_mount, parse_df_partitions, parse_diskstats,
    parse_mount_candidates,
};
use super::traits::FileSystem;
use crate::fmt::iso_timestamp;
use crate::model::{DiskIoStats, DiskUsage, Partition, StorageInfo};

pub struct StorageCollector<F, R> {
    host: Host<F, R>,
}

impl<F: FileSystem, R: CommandRunner> StorageCollector<F, R> {
    pub fn new(host: Host<F, R>) -> Self {
        Self { host }
    }

    fn disk_usage(&self) -> DiskUsage {
        FallbackChain::new("storage.disk_usage")
            .step("df -h .", || Ok(parse_df_human(&self.host.run("df -h .")?)))
            .step("df -B1 .", || Ok(parse_df_bytes(&self.host.run("df -B1 .")?)))
            .run()
            .unwrap_or_else(DiskUsage::unknown)
    }

    fn partitions_from_mount(&self) -> ProbeResult<Vec<Partition>> {
        let output = self.host.run("mount")?;
        let partitions: Vec<Partition> = parse_mount_candidates(&output)
            .into_iter()
            .map(|(device, mount_point)| {
                self.host
                    .run_argv(&["df", "-h", mount_point.as_str()])
                    .ok()
                    .and_then(|df| parse_df_mount(&df, &device, &mount_point))
                    .unwrap_or(Partition {
                        device,
                        total: None,
                        used: None,
                        free: None,
                        percent: None,
                        percent_num: None,
                        mount_point,
                    })
            })
            .collect();
        Ok((!partitions.is_empty()).then_some(partitions))
    }

    fn partitions(&self) -> Vec<Partition> {
        FallbackChain::new("storage.partitions")
            .step("df -h", || {
                let partitions = parse_df_partitions(&self.host.run("df -h")?);
                Ok((!partitions.is_empty()).then_some(partitions))
            })
            .step("mount", || self.partitions_from_mount())
            .run()
            .unwrap_or_default()
    }

    fn io_stats(&self) -> Option<BTreeMap<String, DiskIoStats>> {
        let content = self.host.read("/proc/diskstats").ok()?;
        let stats = parse_diskstats(&content);
        (!stats.is_empty()).then_some(stats)
    }
}

impl<F: FileSystem, R: CommandRunner> Collect for StorageCollector<F, R> {
    type Output = StorageInfo;
    const NAME: &'static str = "storage";

    fn collect_data(&mut self) -> Result<StorageInfo, CollectError> {
        Ok(StorageInfo {
            timestamp: iso_timestamp(),
            disk_usage: self.disk_usage(),
            partitions: self.partitions(),
            io_stats: self.io_stats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockFs, MockRunner};
    use crate::fmt::UNKNOWN;

    fn collector(fs: MockFs, runner: MockRunner) -> StorageCollector<MockFs, MockRunner> {
        StorageCollector::new(Host::new(fs, runner))
    }

    #[test]
    fn test_df_human_preferred() {
        let runner = MockRunner::new()
            .with_output("df -h .", "Filesystem Size Used Avail Use% Mounted on\n/dev/sda1 100G 30G 70G 30% /")
            .with_output("df -B1 .", "unused");
        let c = collector(MockFs::new(), runner.clone());

        let usage = c.disk_usage();
        assert_eq!(usage.total, "100G");
        assert_eq!(usage.percent_num, 30.0);
        assert_eq!(runner.calls("df -B1 ."), 0);
    }

    #[test]
    fn test_df_bytes_fallback() {
        let runner = MockRunner::new()
            .with_output("df -h .", "df: unrecognized option")
            .with_output(
                "df -B1 .",
                "Filesystem 1B-blocks Used Available Use% Mounted on\n/dev/root 1073741824 268435456 805306368 25% /data",
            );
        let usage = collector(MockFs::new(), runner).disk_usage();
        assert_eq!(usage.total, "1.00 GB");
        assert_eq!(usage.used, "256.00 MB");
        assert_eq!(usage.percent, "25.0%");
        assert_eq!(usage.percent_num, 25.0);
        assert_eq!(usage.mount_point.as_deref(), Some("/data"));
    }

    #[test]
    fn test_disk_usage_placeholder() {
        let usage = collector(MockFs::new(), MockRunner::new()).disk_usage();
        assert_eq!(usage, DiskUsage::unknown());
        assert_eq!(usage.total, UNKNOWN);

        let json = serde_json::to_value(&usage).unwrap();
        assert_eq!(json["percent"], "0%");
        assert!(json.get("mount_point").is_none());
    }

    #[test]
    fn test_partitions_from_mount_with_partial_df() {
        let runner = MockRunner::new()
            .with_output(
                "mount",
                "/dev/block/dm-5 on /data type ext4 (rw)\nproc on /proc type proc (rw)\n/dev/fuse on /storage/emulated type fuse (rw)",
            )
            .with_output("df -h /data", "Filesystem Size Used Avail Use% Mounted on\n/dev/block/dm-5 110G 60G 50G 55% /data");
        let parts = collector(MockFs::new(), runner).partitions();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].device, "/dev/block/dm-5");
        assert_eq!(parts[0].percent_num, Some(55.0));
        assert_eq!(parts[1].device, "/dev/fuse");
        assert_eq!(parts[1].mount_point, "/storage/emulated");
        assert_eq!(parts[1].total, None);
    }

    #[test]
    fn test_empty_df_listing_falls_through_to_mount() {
        let runner = MockRunner::new()
            .with_output("df -h", "Filesystem Size Used Avail Use% Mounted on\noverlay 10G 1G 9G 10% /")
            .with_output("mount", "tmpfs on /run type tmpfs (rw)");
        let parts = collector(MockFs::new(), runner).partitions();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].device, "tmpfs");
    }

    #[test]
    fn test_io_stats_omitted_without_real_disks() {
        let fs = MockFs::new().with_file(
            "/proc/diskstats",
            "   7       0 loop0 10 0 80 1 0 0 0 0 0 1 1\n 259 0 nvme0n1 1 2 3 4 5 6 7 8 9 10 11",
        );
        let mut c = collector(fs, MockRunner::new());
        let info = c.collect_data().unwrap();
        assert_eq!(info.io_stats, None);
        assert!(info.partitions.is_empty());

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("io_stats").is_none());
    }

    #[test]
    fn test_io_stats_present() {
        let fs = MockFs::new().with_file(
            "/proc/diskstats",
            " 179       0 mmcblk0 500 1 4000 100 200 2 1600 50 0 120 150",
        );
        let stats = collector(fs, MockRunner::new()).io_stats().unwrap();
        assert_eq!(stats["mmcblk0"].sectors_written, 1600);
    }
}
