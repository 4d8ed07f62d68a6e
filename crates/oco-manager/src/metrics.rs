use std::sync::atomic::{AtomicU64, Ordering};

/// Counters the engine's metrics exporter would read. Kept as a small
/// internal facade so business logic never touches an exporter directly.
#[derive(Default)]
pub struct OcoMetrics {
    pub strategy_unprotected_total: AtomicU64,
    pub anomaly_total: AtomicU64,
    pub pairs_completed_total: AtomicU64,
    /// Incremented each time a poll cycle takes longer than the monitor's
    /// configured interval — the single-threaded loop never overlaps itself,
    /// so a run this counts is a tick the next poll started late for.
    pub poll_backlog_total: AtomicU64,
}

impl OcoMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_unprotected(&self) {
        self.strategy_unprotected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomaly(&self) {
        self.anomaly_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.pairs_completed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_poll_backlog(&self) {
        self.poll_backlog_total.fetch_add(1, Ordering::Relaxed);
    }
}
