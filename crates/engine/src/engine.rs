use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tradeengine_core::Signal;
use tradeengine_dispatcher::{DispatchStatus, Dispatcher};
use tradeengine_oco_manager::OcoManager;
use tradeengine_persistence::{InMemoryAnalyticsStore, InMemoryPositionStore};
use tradeengine_ports::{AnalyticsStore, ExchangeAdapter, LockStore, PositionStore};
use tradeengine_position_manager::{PositionManager, StrategyPositionTracker};
use tradeengine_signal_aggregator::{AggregatorEvent, SignalAggregator};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::metrics::{self, EngineMetricsSnapshot};

/// Background tasks started by [`TradingEngine::start`]. Held by the caller
/// and handed back to [`TradingEngine::shutdown`].
pub struct EngineHandle {
    event_loop: JoinHandle<()>,
    oco_monitor: JoinHandle<()>,
    lock_sweeper: JoinHandle<()>,
    aggregator_sweeper: JoinHandle<()>,
}

/// Wires every component together: Position Manager, Strategy Position
/// Tracker, OCO Manager, Signal Aggregator and Dispatcher share the same
/// `ExchangeAdapter` and `LockStore` instances. `submit_signal` is the one
/// entrypoint external collaborators (an HTTP handler, a message bus
/// consumer) call into; everything downstream of acceptance runs on
/// background tasks this struct owns.
pub struct TradingEngine {
    aggregator: Arc<SignalAggregator>,
    dispatcher: Arc<Dispatcher>,
    oco: Arc<OcoManager>,
    tracker: Arc<StrategyPositionTracker>,
    position_store: Arc<dyn PositionStore>,
    lock_store: Arc<dyn LockStore>,
    config: EngineConfig,
    accepting: Arc<AtomicBool>,
    inflight: Arc<AtomicU64>,
    events_rx: AsyncMutex<Option<UnboundedReceiver<AggregatorEvent>>>,
}

impl TradingEngine {
    /// Builds every component from scratch around the given venue adapter
    /// and lock store, with the default in-memory position and analytics
    /// stores. Use [`TradingEngine::with_stores`] to supply production
    /// (e.g. MongoDB-backed) bindings instead.
    pub fn new(config: EngineConfig, adapter: Arc<dyn ExchangeAdapter>, lock_store: Arc<dyn LockStore>) -> Self {
        Self::with_stores(config, adapter, lock_store, Arc::new(InMemoryPositionStore::new()), Arc::new(InMemoryAnalyticsStore::new()))
    }

    pub fn with_stores(
        config: EngineConfig,
        adapter: Arc<dyn ExchangeAdapter>,
        lock_store: Arc<dyn LockStore>,
        position_store: Arc<dyn PositionStore>,
        analytics_store: Arc<dyn AnalyticsStore>,
    ) -> Self {
        let positions = Arc::new(PositionManager::new());
        let tracker = Arc::new(StrategyPositionTracker::new());
        let oco = Arc::new(OcoManager::new(adapter.clone(), tracker.clone(), positions.clone()));
        let (aggregator, events_rx) = SignalAggregator::new(config.aggregator.clone());

        // hedge_mode is configured once, on the aggregator; the dispatcher's
        // copy exists only to check it against the venue in refresh_symbol_info.
        let mut dispatch_config = config.dispatch.clone();
        dispatch_config.hedge_mode = config.aggregator.hedge_mode;

        let dispatcher = Arc::new(Dispatcher::new(
            dispatch_config,
            adapter,
            lock_store.clone(),
            positions,
            tracker.clone(),
            oco.clone(),
            position_store.clone(),
            analytics_store,
            config.risk_limits.clone(),
        ));

        Self {
            aggregator: Arc::new(aggregator),
            dispatcher,
            oco,
            tracker,
            position_store,
            lock_store,
            config,
            accepting: Arc::new(AtomicBool::new(true)),
            inflight: Arc::new(AtomicU64::new(0)),
            events_rx: AsyncMutex::new(Some(events_rx)),
        }
    }

    /// Loads symbol filters from the venue. Must run before any signal is
    /// accepted for dispatch.
    pub async fn refresh_symbol_info(&self) -> Result<()> {
        self.dispatcher.refresh_symbol_info().await.map_err(EngineError::Bootstrap)
    }

    /// The single signal-ingestion entrypoint. HTTP and message-bus
    /// collaborators both call into this; it only ever touches the
    /// aggregator's window map and an unbounded channel, so it returns as
    /// soon as the signal is queued, before any venue interaction happens.
    pub fn submit_signal(&self, signal: Signal) -> Result<()> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(EngineError::ShuttingDown);
        }
        self.aggregator.submit_signal(signal).map_err(EngineError::SignalRejected)
    }

    pub fn metrics(&self) -> EngineMetricsSnapshot {
        metrics::snapshot(&self.dispatcher.metrics, &self.oco.metrics)
    }

    /// Rebuilds the strategy position tracker and the OCO manager's
    /// `active_pairs` from persisted state, then spawns the event-dispatch
    /// loop, the OCO monitor, the lock sweeper and the aggregator sweeper.
    /// Call once, after `refresh_symbol_info`.
    pub async fn start(self: &Arc<Self>) -> Result<EngineHandle> {
        self.rebuild_from_persisted().await?;

        let events_rx = self.events_rx.lock().await.take().expect("start called more than once");

        let event_loop = tokio::spawn(Self::run_event_loop(self.clone(), events_rx));
        let oco_monitor = tradeengine_oco_manager::spawn_monitor(self.oco.clone(), self.config.oco_poll_interval);
        let lock_sweeper = tokio::spawn(tradeengine_lock::run_sweeper(self.lock_store.clone(), self.config.lock_sweep_interval));
        let aggregator_sweeper = tokio::spawn(tradeengine_signal_aggregator::run_sweeper(self.aggregator.clone(), self.config.aggregator_sweep_interval));

        info!("trading engine started");
        Ok(EngineHandle { event_loop, oco_monitor, lock_sweeper, aggregator_sweeper })
    }

    /// Restores in-memory state lost on a process restart: open strategy
    /// positions feed the tracker's reverse index, active OCO pairs feed
    /// the monitor's working set — both before monitoring resumes.
    async fn rebuild_from_persisted(&self) -> Result<()> {
        let strategy_positions = self.position_store.load_open_strategy_positions().await?;
        let restored_positions = strategy_positions.len();
        self.tracker.rebuild_from_persisted(strategy_positions);

        let oco_pairs = self.position_store.load_active_oco_pairs().await?;
        let restored_pairs = oco_pairs.len();
        self.oco.rebuild_from_persisted(oco_pairs);

        if restored_positions > 0 || restored_pairs > 0 {
            info!("restart rebuild restored {restored_positions} strategy position(s) and {restored_pairs} active oco pair(s)");
        }
        Ok(())
    }

    async fn run_event_loop(engine: Arc<Self>, mut events_rx: UnboundedReceiver<AggregatorEvent>) {
        while let Some(event) = events_rx.recv().await {
            match event {
                AggregatorEvent::Accepted(signal) => engine.spawn_dispatch(signal),
                AggregatorEvent::Rejected { signal, reason } => {
                    info!("signal from {} on {} rejected: {reason:?}", signal.strategy_id, signal.symbol);
                }
                AggregatorEvent::ManualReview { symbol, candidates } => {
                    warn!("manual review required for {symbol}: {} candidate signal(s)", candidates.len());
                }
            }
        }
    }

    /// Runs one ephemeral dispatch task. Cancellation-safe only between
    /// pipeline steps; once `Dispatcher::dispatch` is entered it always
    /// runs to completion, lock release included.
    fn spawn_dispatch(self: &Arc<Self>, signal: Signal) {
        self.inflight.fetch_add(1, Ordering::SeqCst);
        let dispatcher = self.dispatcher.clone();
        let inflight = self.inflight.clone();
        tokio::spawn(async move {
            let outcome = dispatcher.dispatch(signal).await;
            if !matches!(outcome.status, DispatchStatus::Executed | DispatchStatus::Simulated) {
                warn!("dispatch did not execute: {:?} ({:?})", outcome.status, outcome.reason);
            }
            inflight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Stops accepting new signals, waits up to `shutdown_grace_period` for
    /// in-flight dispatch tasks to drain, then cancels the monitor and
    /// sweeper tasks. In-flight venue orders are never cancelled by this
    /// call; a task still running once the grace period elapses is left to
    /// finish on its own.
    pub async fn shutdown(&self, handle: EngineHandle) {
        self.accepting.store(false, Ordering::SeqCst);
        info!("shutdown requested, draining dispatch tasks (grace period {:?})", self.config.shutdown_grace_period);

        let deadline = tokio::time::Instant::now() + self.config.shutdown_grace_period;
        while self.inflight.load(Ordering::SeqCst) > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let remaining = self.inflight.load(Ordering::SeqCst);
        if remaining > 0 {
            warn!("shutdown grace period elapsed with {remaining} dispatch task(s) still in flight; their orders are not cancelled");
        }

        handle.event_loop.abort();
        handle.aggregator_sweeper.abort();
        handle.lock_sweeper.abort();
        handle.oco_monitor.abort();
        info!("oco monitor cancelled, shutdown complete");
    }
}
