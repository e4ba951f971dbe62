//! Polls every domain collector and records the result in history.

use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, info};

use crate::collector::{
    CachedCollector, CommandRunner, DeviceCollector, DomainCollector, FileSystem,
    HardwareCollector, Host, NetworkCollector, ProcessCollector, StorageCollector,
    SystemCollector,
};
use crate::config::DashConfig;
use crate::history::MetricsHistory;
use crate::model::Snapshot;

type SharedCollector = Mutex<Box<dyn DomainCollector>>;

/// Owns the collectors and the history store.
///
/// Each collector sits behind its own mutex, so concurrent callers never race
/// on one collector's cache while different domains can refresh in parallel.
pub struct Orchestrator {
    collectors: Vec<SharedCollector>,
    history: MetricsHistory,
}

impl Orchestrator {
    /// Builds the six collectors over clones of one host.
    ///
    /// Snapshot keys follow collector order: `system`, `hardware`, `network`,
    /// `storage`, `process`, `android`.
    pub fn new<F, R>(config: &DashConfig, fs: F, runner: R) -> Self
    where
        F: FileSystem + Clone + 'static,
        R: CommandRunner + Clone + 'static,
    {
        let host = Host::new(fs, runner);
        let interval = config.collection_interval;
        let collectors: Vec<Box<dyn DomainCollector>> = vec![
            Box::new(CachedCollector::new(
                SystemCollector::new(host.clone()),
                interval,
            )),
            Box::new(CachedCollector::new(
                HardwareCollector::new(host.clone(), config.cpu_sample_timeout),
                interval,
            )),
            Box::new(CachedCollector::new(
                NetworkCollector::new(host.clone()),
                interval,
            )),
            Box::new(CachedCollector::new(
                StorageCollector::new(host.clone()),
                interval,
            )),
            Box::new(CachedCollector::new(
                ProcessCollector::new(host.clone(), config.max_top_processes),
                interval,
            )),
            Box::new(CachedCollector::new(
                DeviceCollector::new(host, config.device_placeholder_model.clone()),
                interval,
            )),
        ];
        info!(
            interval_secs = interval.as_secs_f64(),
            history_capacity = config.effective_history_capacity(),
            "orchestrator ready"
        );
        Self::from_collectors(collectors, config.effective_history_capacity())
    }

    /// Assembles an orchestrator from arbitrary collectors, polled in order.
    pub fn from_collectors(
        collectors: Vec<Box<dyn DomainCollector>>,
        history_capacity: usize,
    ) -> Self {
        Self {
            collectors: collectors.into_iter().map(Mutex::new).collect(),
            history: MetricsHistory::new(history_capacity),
        }
    }

    /// Collects every domain, stamps the snapshot, and appends it to history.
    pub fn poll_and_record(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for slot in &self.collectors {
            let mut collector = slot.lock().unwrap_or_else(PoisonError::into_inner);
            let name = collector.name();
            snapshot.insert(name, collector.collect_value());
        }
        snapshot.set_timestamp_if_absent();
        debug!(domains = self.collectors.len(), "snapshot recorded");
        self.history.add_data_point(snapshot.clone());
        snapshot
    }

    /// Latest value of one domain, or `None` for an unknown name.
    ///
    /// Goes through the domain's cache but does not touch history.
    pub fn collect_domain(&self, name: &str) -> Option<Value> {
        self.collectors.iter().find_map(|slot| {
            let mut collector = slot.lock().unwrap_or_else(PoisonError::into_inner);
            (collector.name() == name).then(|| collector.collect_value())
        })
    }

    pub fn domains(&self) -> Vec<&'static str> {
        self.collectors
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).name())
            .collect()
    }

    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Scenario;
    use serde_json::json;
    use std::time::Duration;

    struct Counter {
        name: &'static str,
        calls: u64,
    }

    impl DomainCollector for Counter {
        fn name(&self) -> &'static str {
            self.name
        }

        fn collect_value(&mut self) -> Value {
            self.calls += 1;
            json!({ "calls": self.calls })
        }
    }

    fn counters(names: &[&'static str], capacity: usize) -> Orchestrator {
        let collectors = names
            .iter()
            .map(|&name| Box::new(Counter { name, calls: 0 }) as Box<dyn DomainCollector>)
            .collect();
        Orchestrator::from_collectors(collectors, capacity)
    }

    #[test]
    fn test_snapshot_key_order() {
        let orchestrator = counters(&["b", "a", "c"], 5);
        let snapshot = orchestrator.poll_and_record();
        let keys: Vec<_> = snapshot.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c", "timestamp"]);
    }

    #[test]
    fn test_poll_records_history() {
        let orchestrator = counters(&["a"], 2);
        for _ in 0..3 {
            orchestrator.poll_and_record();
        }
        let history = orchestrator.history();
        assert_eq!(history.len(), 2);
        let calls: Vec<_> = history
            .get_metric_history("a.calls")
            .into_iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(calls, vec![json!(2), json!(3)]);
    }

    #[test]
    fn test_collect_domain() {
        let orchestrator = counters(&["a", "b"], 2);
        assert_eq!(orchestrator.collect_domain("b"), Some(json!({"calls": 1})));
        assert_eq!(orchestrator.collect_domain("missing"), None);
        assert!(orchestrator.history().is_empty());
    }

    #[test]
    fn test_domains_of_default_build() {
        let scenario = Scenario::bare();
        let orchestrator = Orchestrator::new(
            &DashConfig::default(),
            scenario.fs.clone(),
            scenario.runner.clone(),
        );
        assert_eq!(
            orchestrator.domains(),
            vec!["system", "hardware", "network", "storage", "process", "android"]
        );
    }

    #[test]
    fn test_typical_linux_snapshot() {
        let scenario = Scenario::typical_linux();
        let orchestrator = Orchestrator::new(
            &DashConfig::default(),
            scenario.fs.clone(),
            scenario.runner.clone(),
        );
        let snapshot = orchestrator.poll_and_record();

        assert!(snapshot.timestamp().is_some());
        assert_eq!(
            snapshot.lookup("system.hostname"),
            Some(&json!("build-01"))
        );
        assert_eq!(snapshot.lookup("hardware.cpu.cores.count"), Some(&json!(2)));
        assert_eq!(snapshot.lookup("process.summary.total"), Some(&json!(3)));
        assert_eq!(
            snapshot.lookup("storage.disk_usage.mount_point"),
            Some(&json!("/"))
        );
        assert!(snapshot.lookup("android.device_info").is_some());
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[test]
    fn test_cache_prevents_repeat_tool_calls() {
        let scenario = Scenario::typical_linux();
        let config = DashConfig::default().with_collection_interval(Duration::from_secs(60));
        let orchestrator = Orchestrator::new(&config, scenario.fs.clone(), scenario.runner.clone());

        orchestrator.poll_and_record();
        let first = scenario.runner.total_calls();
        orchestrator.poll_and_record();
        assert_eq!(scenario.runner.total_calls(), first);
        assert_eq!(orchestrator.history().len(), 2);
    }

    #[test]
    fn test_zero_interval_always_refreshes() {
        let scenario = Scenario::typical_linux();
        let config = DashConfig::default().with_collection_interval(Duration::ZERO);
        let orchestrator = Orchestrator::new(&config, scenario.fs.clone(), scenario.runner.clone());

        orchestrator.poll_and_record();
        orchestrator.poll_and_record();
        assert_eq!(scenario.runner.calls("uptime"), 2);
    }

    #[test]
    fn test_bare_host_still_produces_every_domain() {
        let scenario = Scenario::bare();
        let orchestrator = Orchestrator::new(
            &DashConfig::default(),
            scenario.fs.clone(),
            scenario.runner.clone(),
        );
        let snapshot = orchestrator.poll_and_record();
        for domain in orchestrator.domains() {
            assert!(snapshot.get(domain).is_some(), "missing {domain}");
            assert!(
                snapshot.lookup(&format!("{domain}.error")).is_none(),
                "{domain} reported an error"
            );
        }
        assert_eq!(
            snapshot.lookup("android.device_info.model"),
            Some(&json!("Galaxy S10+"))
        );
        assert_eq!(snapshot.lookup("android.battery"), Some(&Value::Null));
    }

    #[test]
    fn test_termux_device_snapshot() {
        let scenario = Scenario::termux_device();
        let orchestrator = Orchestrator::new(
            &DashConfig::default(),
            scenario.fs.clone(),
            scenario.runner.clone(),
        );
        let snapshot = orchestrator.poll_and_record();
        assert_eq!(
            snapshot.lookup("android.device_info.model"),
            Some(&json!("SM-G975F"))
        );
        assert_eq!(
            snapshot.lookup("android.battery.percentage"),
            Some(&json!(87))
        );
        assert_eq!(
            snapshot.lookup("android.sensors.light.value"),
            Some(&json!(140.0))
        );
        assert_eq!(snapshot.lookup("hardware.cpu.cores.count"), Some(&json!(4)));
    }
}
