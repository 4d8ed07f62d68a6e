use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::aggregator::SignalAggregator;

/// Periodically closes windows whose deadline has passed without a fresh
/// signal arriving to trigger closure inline. Interval should be well under
/// the configured window duration — a quarter of it is a reasonable default.
pub async fn run_sweeper(aggregator: Arc<SignalAggregator>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let before = aggregator.open_window_count();
        aggregator.sweep_expired();
        if before > 0 {
            debug!("signal aggregator sweep closed up to {before} windows");
        }
    }
}
