use std::sync::Arc;
use std::time::Duration as StdDuration;

use log::{debug, warn};
use tradeengine_ports::LockStore;

/// Periodically removes expired locks so a crashed holder's claim does not
/// outlive its TTL indefinitely in stores that don't expire documents on
/// their own (the in-memory store; Mongo can additionally use a TTL index).
pub async fn run_sweeper(store: Arc<dyn LockStore>, interval: StdDuration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match store.sweep_expired().await {
            Ok(removed) if removed > 0 => debug!("lock sweeper removed {removed} expired locks"),
            Ok(_) => {}
            Err(err) => warn!("lock sweeper failed: {err}"),
        }
    }
}
