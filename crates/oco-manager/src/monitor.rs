use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::manager::OcoManager;

/// Spawns the single background monitor task. Polls are never allowed to
/// overlap: the loop awaits one `poll_once` to completion before the next
/// tick, so a slow venue backs the whole cycle up rather than racing itself.
/// A poll that itself takes longer than `poll_interval` delays the next
/// tick; `poll_backlog_total` counts how often that happens.
pub fn spawn_monitor(manager: Arc<OcoManager>, poll_interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            ticker.tick().await;
            debug!("oco monitor poll starting");
            let started = Instant::now();
            manager.poll_once().await;
            if started.elapsed() > poll_interval {
                manager.metrics.record_poll_backlog();
                warn!("oco monitor poll took {:?}, longer than the {poll_interval:?} interval", started.elapsed());
            }
        }
    })
}
