use std::sync::atomic::Ordering;

use tradeengine_dispatcher::DispatcherMetrics;
use tradeengine_oco_manager::OcoMetrics;

/// A point-in-time read of every counter the two component facades expose.
/// Line-protocol formatting for a `/metrics` endpoint is an engine-embedding
/// concern; this snapshot is what that endpoint would serialise.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineMetricsSnapshot {
    pub dispatched_total: u64,
    pub risk_rejections_total: u64,
    pub validation_rejections_total: u64,
    pub filtered_total: u64,
    pub lock_timeouts_total: u64,
    pub venue_failures_total: u64,
    pub strategy_unprotected_total: u64,
    pub anomaly_total: u64,
    pub pairs_completed_total: u64,
    pub poll_backlog_total: u64,
}

pub fn snapshot(dispatcher: &DispatcherMetrics, oco: &OcoMetrics) -> EngineMetricsSnapshot {
    EngineMetricsSnapshot {
        dispatched_total: dispatcher.dispatched_total.load(Ordering::Relaxed),
        risk_rejections_total: dispatcher.risk_rejections_total.load(Ordering::Relaxed),
        validation_rejections_total: dispatcher.validation_rejections_total.load(Ordering::Relaxed),
        filtered_total: dispatcher.filtered_total.load(Ordering::Relaxed),
        lock_timeouts_total: dispatcher.lock_timeouts_total.load(Ordering::Relaxed),
        venue_failures_total: dispatcher.venue_failures_total.load(Ordering::Relaxed),
        strategy_unprotected_total: oco.strategy_unprotected_total.load(Ordering::Relaxed),
        anomaly_total: oco.anomaly_total.load(Ordering::Relaxed),
        pairs_completed_total: oco.pairs_completed_total.load(Ordering::Relaxed),
        poll_backlog_total: oco.poll_backlog_total.load(Ordering::Relaxed),
    }
}
