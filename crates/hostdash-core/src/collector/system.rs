//! Host identity and uptime.

use tracing::trace;

use super::cached::{Collect, CollectError};
use super::command::CommandRunner;
use super::fallback::{FallbackChain, ProbeResult};
use super::host::Host;
use super::parser::parse_proc_uptime;
use super::traits::FileSystem;
use crate::VERSION;
use crate::fmt::{UNKNOWN, format_uptime, iso_timestamp, wall_clock};
use crate::model::SystemInfo;

/// Non-empty trimmed output, or `None`.
fn non_empty(output: String) -> Option<String> {
    let trimmed = output.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub struct SystemCollector<F, R> {
    host: Host<F, R>,
}

impl<F: FileSystem, R: CommandRunner> SystemCollector<F, R> {
    pub fn new(host: Host<F, R>) -> Self {
        Self { host }
    }

    fn uptime(&self) -> String {
        FallbackChain::new("system.uptime")
            .step("uptime", || Ok(non_empty(self.host.run("uptime")?)))
            .step("/proc/uptime", || -> ProbeResult<String> {
                let content = self.host.read("/proc/uptime")?;
                Ok(parse_proc_uptime(&content).map(format_uptime))
            })
            .run()
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn hostname(&self) -> String {
        FallbackChain::new("system.hostname")
            .step("hostname", || Ok(non_empty(self.host.run("hostname")?)))
            .step("gethostname", || {
                let name = hostname::get()?;
                Ok(non_empty(name.to_string_lossy().into_owned()))
            })
            .run()
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn runtime_version(&self) -> String {
        FallbackChain::new("system.python_version")
            .step("python --version", || {
                Ok(non_empty(self.host.run("python --version")?))
            })
            .run()
            .unwrap_or_else(|| format!("hostdash {VERSION}"))
    }
}

impl<F: FileSystem, R: CommandRunner> Collect for SystemCollector<F, R> {
    type Output = SystemInfo;
    const NAME: &'static str = "system";

    fn collect_data(&mut self) -> Result<SystemInfo, CollectError> {
        let current_dir = std::env::current_dir()?;
        trace!(dir = %current_dir.display(), "collecting system info");
        Ok(SystemInfo {
            timestamp: iso_timestamp(),
            uptime: self.uptime(),
            hostname: self.hostname(),
            python_version: self.runtime_version(),
            system_time: wall_clock(),
            current_dir: current_dir.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockFs, MockRunner};

    #[test]
    fn test_tools_preferred() {
        let runner = MockRunner::new()
            .with_output("uptime", " 10:00:00 up 4 days,  3:12,  1 user,  load average: 0.5")
            .with_output("hostname", "localhost\n")
            .with_output("python --version", "Python 3.11.4");
        let fs = MockFs::new().with_file("/proc/uptime", "90061.0 1000.0");
        let mut c = SystemCollector::new(Host::new(fs, runner));

        let info = c.collect_data().unwrap();
        assert!(info.uptime.starts_with("10:00:00 up 4 days"));
        assert_eq!(info.hostname, "localhost");
        assert_eq!(info.python_version, "Python 3.11.4");
        assert!(!info.current_dir.is_empty());
        assert_eq!(info.system_time.len(), "2024-01-01 12:00:00".len());
    }

    #[test]
    fn test_proc_uptime_fallback() {
        let fs = MockFs::new().with_file("/proc/uptime", "90061.0 1000.0");
        let mut c = SystemCollector::new(Host::new(fs, MockRunner::new()));

        let info = c.collect_data().unwrap();
        assert_eq!(info.uptime, "up 1 dia, 1 hora, 1 minuto");
    }

    #[test]
    fn test_everything_missing() {
        let mut c = SystemCollector::new(Host::new(MockFs::new(), MockRunner::new()));

        let info = c.collect_data().unwrap();
        assert_eq!(info.uptime, UNKNOWN);
        assert!(!info.hostname.is_empty());
        assert_eq!(info.python_version, format!("hostdash {VERSION}"));
    }

    #[test]
    fn test_empty_tool_output_falls_through() {
        let runner = MockRunner::new().with_output("uptime", "   ");
        let fs = MockFs::new().with_file("/proc/uptime", "120.0 10.0");
        let mut c = SystemCollector::new(Host::new(fs, runner));

        assert_eq!(c.collect_data().unwrap().uptime, "up 2 minutos");
    }
}
