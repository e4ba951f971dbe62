//! Time-gated caching around a domain collector.
//!
//! A [`CachedCollector`] refreshes its value at most once per collection
//! interval. When a refresh fails it keeps serving the last good value;
//! only when nothing has ever been collected does it report an error
//! placeholder instead.

use std::io;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, trace};

use super::fallback::ProbeError;
use crate::fmt::iso_timestamp;

/// Errors that can escape a domain's `collect_data`.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// One telemetry domain (system, hardware, network, ...).
pub trait Collect: Send {
    type Output: Serialize + Clone + Send;

    /// Key of this domain in a snapshot.
    const NAME: &'static str;

    /// Samples the domain, running every fallback chain it needs.
    fn collect_data(&mut self) -> Result<Self::Output, CollectError>;
}

/// Placeholder served when a domain has never produced data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct CollectFailure {
    pub error: String,
    pub timestamp: String,
}

/// What a cached collector hands out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Collected<T> {
    Data(T),
    Failed(CollectFailure),
}

impl<T> Collected<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Collected::Data(d) => Some(d),
            Collected::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Collected::Failed(_))
    }
}

/// Returns true when a collection is due at `now`.
///
/// A zero interval disables caching.
pub(crate) fn collect_due(last_collect: Option<Instant>, now: Instant, interval: Duration) -> bool {
    if interval.is_zero() {
        return true;
    }
    match last_collect {
        Some(last) => now.saturating_duration_since(last) >= interval,
        None => true,
    }
}

/// Wraps a [`Collect`] implementation with the refresh/cache policy.
pub struct CachedCollector<C: Collect> {
    inner: C,
    interval: Duration,
    last_collection: Option<Instant>,
    cached: Option<Collected<C::Output>>,
}

impl<C: Collect> CachedCollector<C> {
    pub fn new(inner: C, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last_collection: None,
            cached: None,
        }
    }

    pub fn name(&self) -> &'static str {
        C::NAME
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Returns the cached value, refreshing it first if the interval elapsed.
    pub fn collect(&mut self) -> Collected<C::Output> {
        self.collect_at(Instant::now())
    }

    /// [`collect`](Self::collect) against an explicit clock reading.
    pub fn collect_at(&mut self, now: Instant) -> Collected<C::Output> {
        if collect_due(self.last_collection, now, self.interval) {
            self.refresh(now);
        } else {
            trace!(collector = C::NAME, "serving cached value");
        }
        match &self.cached {
            Some(value) => value.clone(),
            None => Collected::Failed(CollectFailure {
                error: "no data collected".to_string(),
                timestamp: iso_timestamp(),
            }),
        }
    }

    fn refresh(&mut self, now: Instant) {
        debug!(collector = C::NAME, "refreshing");
        match self.inner.collect_data() {
            Ok(data) => {
                self.cached = Some(Collected::Data(data));
                self.last_collection = Some(now);
            }
            Err(e) => {
                error!(collector = C::NAME, error = %e, "collection failed");
                // Any earlier result, data or placeholder, is kept. Without a
                // success the timestamp stays unset, so the next call retries.
                if self.cached.is_none() {
                    self.cached = Some(Collected::Failed(CollectFailure {
                        error: e.to_string(),
                        timestamp: iso_timestamp(),
                    }));
                }
            }
        }
    }
}

/// Object-safe view of a cached collector, used by the orchestrator.
pub trait DomainCollector: Send {
    fn name(&self) -> &'static str;

    /// Cached `collect()` rendered as JSON.
    fn collect_value(&mut self) -> Value;
}

impl<C: Collect> DomainCollector for CachedCollector<C> {
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn collect_value(&mut self) -> Value {
        let collected = self.collect();
        serde_json::to_value(&collected).unwrap_or_else(|e| {
            error!(collector = C::NAME, error = %e, "failed to serialize collected value");
            serde_json::json!({ "error": e.to_string(), "timestamp": iso_timestamp() })
        })
    }
}
