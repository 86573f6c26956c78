//! Hub metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Hub-level counters.
///
/// Only the hub task writes them; readers take a [`HubMetricsSnapshot`].
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Subscribers currently registered
    pub subscribers_active: AtomicU64,
    /// Subscribers ever registered
    pub subscribers_total: AtomicU64,
    /// Broadcasts processed
    pub broadcasts: AtomicU64,
    /// Payloads queued to a subscriber
    pub deliveries: AtomicU64,
    /// Subscribers dropped because their queue was full
    pub dropped: AtomicU64,
}

impl HubMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscriber_added(&self) {
        self.subscribers_total.fetch_add(1, Ordering::Relaxed);
        self.subscribers_active.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_active(&self, active: usize) {
        self.subscribers_active.store(active as u64, Ordering::Relaxed);
    }

    pub(crate) fn broadcast(&self, delivered: usize, dropped: usize) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        self.dropped.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> HubMetricsSnapshot {
        HubMetricsSnapshot {
            subscribers_active: self.subscribers_active.load(Ordering::Relaxed),
            subscribers_total: self.subscribers_total.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubMetricsSnapshot {
    /// Subscribers currently registered
    pub subscribers_active: u64,
    /// Subscribers ever registered
    pub subscribers_total: u64,
    /// Broadcasts processed
    pub broadcasts: u64,
    /// Payloads queued to a subscriber
    pub deliveries: u64,
    /// Subscribers dropped as too slow
    pub dropped: u64,
}
