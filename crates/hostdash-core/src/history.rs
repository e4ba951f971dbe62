//! Bounded in-memory history of snapshots.
//!
//! The store keeps the most recent `capacity` snapshots in insertion order and
//! evicts the oldest one first once full. Appends take the write lock, reads
//! take the read lock, so a reader never sees a half-applied append.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::Value;

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::model::Snapshot;

/// One value of a metric at the time of the snapshot it was taken from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct MetricPoint {
    pub timestamp: String,
    #[cfg_attr(feature = "api", schema(value_type = Object))]
    pub value: Value,
}

#[derive(Debug)]
pub struct MetricsHistory {
    capacity: usize,
    entries: RwLock<VecDeque<Snapshot>>,
}

impl MetricsHistory {
    /// Creates an empty store. A capacity of zero selects the default.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_HISTORY_CAPACITY
        } else {
            capacity
        };
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Appends a snapshot, stamping it first if it has no `timestamp`.
    pub fn add_data_point(&self, mut snapshot: Snapshot) {
        snapshot.set_timestamp_if_absent();
        let mut entries = self.write();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(snapshot);
    }

    /// Copy of every retained snapshot, oldest first.
    pub fn get_history(&self) -> Vec<Snapshot> {
        self.read().iter().cloned().collect()
    }

    /// Values found at `path` (dot separated) across the history, oldest first.
    ///
    /// Snapshots where the path does not resolve, or resolves to `null`,
    /// contribute nothing.
    pub fn get_metric_history(&self, path: &str) -> Vec<MetricPoint> {
        self.read()
            .iter()
            .filter_map(|snapshot| {
                let value = snapshot.lookup(path)?;
                if value.is_null() {
                    return None;
                }
                Some(MetricPoint {
                    timestamp: snapshot.timestamp().unwrap_or_default().to_string(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, VecDeque<Snapshot>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<Snapshot>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
