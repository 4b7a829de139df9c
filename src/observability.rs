//! Query counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one session; the engine itself never records metrics
#[derive(Debug, Default)]
pub struct Metrics {
    queries_dispatched: AtomicU64,
    auth_retries: AtomicU64,
    queries_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_dispatched(&self) {
        self.queries_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "queries_dispatched", "Metric incremented");
    }

    pub fn auth_retry(&self) {
        self.auth_retries.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "auth_retries", "Metric incremented");
    }

    pub fn query_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "queries_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_dispatched: self.queries_dispatched.load(Ordering::Relaxed),
            auth_retries: self.auth_retries.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queries_dispatched: u64,
    pub auth_retries: u64,
    pub queries_failed: u64,
}
