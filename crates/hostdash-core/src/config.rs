//! Runtime configuration shared by the orchestrator and every collector.

use std::time::Duration;

/// Default time between two real collections of the same domain.
pub const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(5);
/// Default number of snapshots kept in history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;
/// Default timeout for a single external tool invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(3);
/// The process monitor used for CPU usage needs a little longer than other tools.
pub const DEFAULT_CPU_SAMPLE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default row limit for the top-processes table.
pub const DEFAULT_MAX_TOP_PROCESSES: usize = 50;
/// Model reported by the device collector when nothing else answers.
pub const DEFAULT_PLACEHOLDER_MODEL: &str = "Galaxy S10+";

/// Configuration constructed once at startup and handed to each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashConfig {
    /// Minimum age of a cached collector result before it is refreshed.
    /// `Duration::ZERO` disables caching.
    pub collection_interval: Duration,
    /// Maximum number of snapshots retained by the history store.
    pub history_capacity: usize,
    /// Default timeout for external commands.
    pub command_timeout: Duration,
    /// Timeout for the CPU usage sample (`top -bn1`).
    pub cpu_sample_timeout: Duration,
    /// Row limit for the top-processes table.
    pub max_top_processes: usize,
    /// Placeholder model used when device identity cannot be read.
    pub device_placeholder_model: String,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            collection_interval: DEFAULT_COLLECTION_INTERVAL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            cpu_sample_timeout: DEFAULT_CPU_SAMPLE_TIMEOUT,
            max_top_processes: DEFAULT_MAX_TOP_PROCESSES,
            device_placeholder_model: DEFAULT_PLACEHOLDER_MODEL.to_string(),
        }
    }
}

impl DashConfig {
    pub fn with_collection_interval(mut self, interval: Duration) -> Self {
        self.collection_interval = interval;
        self
    }

    /// Sets the history capacity. Zero keeps the default.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = if capacity == 0 {
            DEFAULT_HISTORY_CAPACITY
        } else {
            capacity
        };
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_max_top_processes(mut self, limit: usize) -> Self {
        self.max_top_processes = limit;
        self
    }

    pub fn with_placeholder_model(mut self, model: impl Into<String>) -> Self {
        self.device_placeholder_model = model.into();
        self
    }

    /// History capacity with the "zero means default" rule applied.
    pub fn effective_history_capacity(&self) -> usize {
        if self.history_capacity == 0 {
            DEFAULT_HISTORY_CAPACITY
        } else {
            self.history_capacity
        }
    }
}
