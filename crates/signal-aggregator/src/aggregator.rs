use chrono::{Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use log::warn;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tradeengine_core::{PositionSide, Signal};

use crate::config::AggregatorConfig;
use crate::error::{AggregatorError, Result};
use crate::events::{AggregatorEvent, RejectionReason};
use crate::resolution;
use crate::window::Window;

type WindowKey = (String, Option<PositionSide>);

/// Intakes signals one at a time, groups them into sliding windows keyed by
/// symbol (and, in hedge mode, by the side a fresh position would take), and
/// resolves each window into accept/reject/manual-review events once it
/// closes. `submit_signal` is synchronous — it only ever touches the window
/// map and an unbounded channel, never I/O — so the caller decides how it's
/// invoked (directly, or from an async task).
pub struct SignalAggregator {
    config: AggregatorConfig,
    windows: DashMap<WindowKey, Window>,
    events_tx: UnboundedSender<AggregatorEvent>,
}

impl SignalAggregator {
    pub fn new(config: AggregatorConfig) -> (Self, UnboundedReceiver<AggregatorEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (Self { config, windows: DashMap::new(), events_tx }, events_rx)
    }

    fn window_key(&self, symbol: String, side: PositionSide) -> WindowKey {
        if self.config.hedge_mode { (symbol, Some(side)) } else { (symbol, None) }
    }

    /// Admits one signal. Malformed signals are rejected synchronously with
    /// an error; `hold` signals are filtered immediately; everything else is
    /// queued into its window, closing the window early if the signal is
    /// marked `immediate`.
    pub fn submit_signal(&self, signal: Signal) -> Result<()> {
        if !signal.is_well_formed() {
            return Err(AggregatorError::MalformedSignal);
        }

        let Some((symbol, side)) = signal.aggregation_key() else {
            self.emit(AggregatorEvent::Rejected { signal, reason: RejectionReason::HoldFiltered });
            return Ok(());
        };

        let key = self.window_key(symbol, side);
        let now = Utc::now();

        // A window already past its deadline means the sweeper hasn't run
        // yet; finalize it before folding this signal into a fresh one.
        let stale = self.windows.get(&key).map(|w| w.deadline <= now).unwrap_or(false);
        if stale {
            if let Some((_, expired)) = self.windows.remove(&key) {
                self.finalize_and_emit(expired);
            }
        }

        let immediate = signal.immediate;
        let window_duration = ChronoDuration::from_std(self.config.window_duration).unwrap_or_else(|_| ChronoDuration::milliseconds(200));

        match self.windows.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => entry.get_mut().signals.push(signal),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Window { signals: vec![signal], deadline: now + window_duration });
            }
        }

        if immediate {
            if let Some((_, window)) = self.windows.remove(&key) {
                self.finalize_and_emit(window);
            }
        }
        Ok(())
    }

    /// Closes and resolves every window whose deadline has passed. Intended
    /// to be driven by a periodic task; see [`crate::sweeper::run_sweeper`].
    pub fn sweep_expired(&self) {
        let now = Utc::now();
        let due: Vec<WindowKey> = self.windows.iter().filter(|e| e.deadline <= now).map(|e| e.key().clone()).collect();
        for key in due {
            if let Some((_, window)) = self.windows.remove(&key) {
                self.finalize_and_emit(window);
            }
        }
    }

    pub fn open_window_count(&self) -> usize {
        self.windows.len()
    }

    fn finalize_and_emit(&self, window: Window) {
        for event in resolution::finalize(window.signals, &self.config) {
            self.emit(event);
        }
    }

    fn emit(&self, event: AggregatorEvent) {
        if self.events_tx.send(event).is_err() {
            warn!("signal aggregator event receiver dropped, discarding event");
        }
    }
}
