//! Process counts and the busiest processes.

use std::path::Path;

use super::cached::{Collect, CollectError};
use super::command::CommandRunner;
use super::fallback::{FallbackChain, ProbeResult};
use super::host::Host;
use super::parser::{
    parse_proc_status_state, parse_ps_processes, parse_ps_summary, parse_top_processes,
};
use super::traits::FileSystem;
use crate::fmt::iso_timestamp;
use crate::model::{ProcessEntry, ProcessInfo, ProcessSummary};

pub struct ProcessCollector<F, R> {
    host: Host<F, R>,
    max_processes: usize,
}

impl<F: FileSystem, R: CommandRunner> ProcessCollector<F, R> {
    pub fn new(host: Host<F, R>, max_processes: usize) -> Self {
        Self {
            host,
            max_processes,
        }
    }

    /// Counts `/proc/<pid>` entries by the `State:` line of their status.
    fn summary_from_proc(&self) -> ProbeResult<ProcessSummary> {
        let mut summary = ProcessSummary::default();
        for entry in self.host.fs().read_dir(Path::new("/proc"))? {
            let is_pid = entry
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
            if !is_pid {
                continue;
            }
            summary.total += 1;
            // Processes may exit between listing and reading.
            if let Some(state) = self
                .host
                .read(entry.join("status"))
                .ok()
                .and_then(|status| parse_proc_status_state(&status))
            {
                summary.count_state(state);
            }
        }
        Ok((summary.total > 0).then_some(summary))
    }

    fn summary(&self) -> ProcessSummary {
        FallbackChain::new("process.summary")
            .step("ps aux", || {
                let summary = parse_ps_summary(&self.host.run("ps aux")?);
                Ok((summary.total > 0).then_some(summary))
            })
            .step("/proc", || self.summary_from_proc())
            .run()
            .unwrap_or_default()
    }

    fn top_processes(&self) -> Vec<ProcessEntry> {
        let limit = self.max_processes;
        FallbackChain::new("process.top")
            .step("ps aux --sort", || {
                let output = self.host.run("ps aux --sort=-pcpu,-pmem")?;
                let procs = parse_ps_processes(&output, limit);
                Ok((!procs.is_empty()).then_some(procs))
            })
            .step("top -b -n 1", || {
                let procs = parse_top_processes(&self.host.run("top -b -n 1")?, limit);
                Ok((!procs.is_empty()).then_some(procs))
            })
            .run()
            .unwrap_or_default()
    }
}

impl<F: FileSystem, R: CommandRunner> Collect for ProcessCollector<F, R> {
    type Output = ProcessInfo;
    const NAME: &'static str = "process";

    fn collect_data(&mut self) -> Result<ProcessInfo, CollectError> {
        Ok(ProcessInfo {
            timestamp: iso_timestamp(),
            summary: self.summary(),
            top_processes: self.top_processes(),
        })
    }
}
