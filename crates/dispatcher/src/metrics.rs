use std::sync::atomic::{AtomicU64, Ordering};

/// Counters the engine's metrics exporter would read.
#[derive(Default)]
pub struct DispatcherMetrics {
    pub dispatched_total: AtomicU64,
    pub risk_rejections_total: AtomicU64,
    pub validation_rejections_total: AtomicU64,
    pub filtered_total: AtomicU64,
    pub lock_timeouts_total: AtomicU64,
    pub venue_failures_total: AtomicU64,
}

impl DispatcherMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatched(&self) {
        self.dispatched_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_risk_rejection(&self) {
        self.risk_rejections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_rejection(&self) {
        self.validation_rejections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filtered(&self) {
        self.filtered_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lock_timeout(&self) {
        self.lock_timeouts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_venue_failure(&self) {
        self.venue_failures_total.fetch_add(1, Ordering::Relaxed);
    }
}
