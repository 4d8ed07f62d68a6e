use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use log::{error, info, warn};
use rust_decimal::Decimal;
use tradeengine_core::{Action, CloseReason, OrderStatus, PositionSide, Side, Signal, StrategyPosition, SymbolInfo, TradeOrder};
use tradeengine_oco_manager::OcoManager;
use tradeengine_ports::{AnalyticsStore, ExchangeAdapter, LockStore, PositionStore};
use tradeengine_position_manager::{PositionManager, StrategyPositionTracker};
use tradeengine_risk::{RiskLimits, RiskValidator};

use crate::config::{DispatchConfig, UnprotectedPolicy};
use crate::error::DispatchError;
use crate::metrics::DispatcherMetrics;
use crate::outcome::{DispatchOutcome, DispatchStatus};

/// Sequences a signal through validation, risk checks, order construction,
/// locked execution and post-trade bookkeeping. One instance is shared by
/// every in-flight dispatch task; the distributed lock is what actually
/// serialises same-key orders, not anything in this struct.
pub struct Dispatcher {
    config: DispatchConfig,
    adapter: Arc<dyn ExchangeAdapter>,
    lock_store: Arc<dyn LockStore>,
    positions: Arc<PositionManager>,
    tracker: Arc<StrategyPositionTracker>,
    oco: Arc<OcoManager>,
    position_store: Arc<dyn PositionStore>,
    analytics_store: Arc<dyn AnalyticsStore>,
    risk_limits: RiskLimits,
    symbols: DashMap<String, SymbolInfo>,
    pub metrics: DispatcherMetrics,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: DispatchConfig,
        adapter: Arc<dyn ExchangeAdapter>,
        lock_store: Arc<dyn LockStore>,
        positions: Arc<PositionManager>,
        tracker: Arc<StrategyPositionTracker>,
        oco: Arc<OcoManager>,
        position_store: Arc<dyn PositionStore>,
        analytics_store: Arc<dyn AnalyticsStore>,
        risk_limits: RiskLimits,
    ) -> Self {
        Self {
            config,
            adapter,
            lock_store,
            positions,
            tracker,
            oco,
            position_store,
            analytics_store,
            risk_limits,
            symbols: DashMap::new(),
            metrics: DispatcherMetrics::new(),
        }
    }

    /// Loads symbol filters from the venue and confirms the venue's hedge
    /// mode agrees with configuration. Must be called at least once before
    /// `dispatch` will accept anything, and may be called again to refresh
    /// filters and tradeable status — the hedge-mode check runs every time.
    pub async fn refresh_symbol_info(&self) -> crate::error::Result<()> {
        let venue_hedge_mode = self.adapter.verify_hedge_mode().await.map_err(|e| DispatchError::VenueFailed(e.to_string()))?;
        if venue_hedge_mode != self.config.hedge_mode {
            return Err(DispatchError::HedgeModeMismatch { configured: self.config.hedge_mode, venue: venue_hedge_mode });
        }

        let info = self.adapter.load_symbol_info().await.map_err(|e| DispatchError::VenueFailed(e.to_string()))?;
        self.symbols.clear();
        for (symbol, symbol_info) in info {
            self.symbols.insert(symbol, symbol_info);
        }
        Ok(())
    }

    /// Feeds a realized PnL event (typically an OCO completion or a manual
    /// close) into the daily-loss gauge the risk check reads.
    pub async fn record_realized_pnl(&self, pnl: Decimal, now: chrono::DateTime<Utc>) {
        self.positions.record_realized_pnl(pnl, now);
    }

    pub async fn dispatch(&self, signal: Signal) -> DispatchOutcome {
        let info = match self.validate(&signal) {
            Ok(info) => info,
            Err(reason) => {
                self.metrics.record_validation_rejection();
                return DispatchOutcome::rejected_by_validation(reason);
            }
        };

        if signal.action == Action::Hold {
            self.metrics.record_filtered();
            return DispatchOutcome::filtered();
        }

        let side = signal.action.side().expect("non-hold action carries a side");
        let position_side = signal.action.position_side().expect("non-hold action carries a position side");
        let quantity = self.compute_quantity(&signal, &info);

        if let Some(reason) = self.check_risk(&signal.symbol, position_side, quantity, signal.current_price).await {
            self.metrics.record_risk_rejection();
            warn!("risk check rejected signal from {} on {}: {reason}", signal.strategy_id, signal.symbol);
            return DispatchOutcome::rejected_by_risk(reason);
        }

        let order = self.build_order(&signal, &info, side, position_side, quantity);
        let lock_name = format!("order_execution_{}_{:?}", signal.symbol, position_side);
        let holder_id = order.order_id.to_string();

        if let Err(e) = self.acquire_lock(&lock_name, &holder_id).await {
            self.metrics.record_lock_timeout();
            warn!("{e}");
            return DispatchOutcome::failed(e.to_string());
        }

        let outcome = self.execute_and_record(&signal, order, position_side).await;

        if let Err(e) = self.lock_store.release(&lock_name, &holder_id).await {
            warn!("failed to release lock {lock_name}: {e}");
        }

        outcome
    }

    fn validate(&self, signal: &Signal) -> std::result::Result<SymbolInfo, String> {
        if signal.confidence < self.config.min_confidence {
            return Err(format!("confidence {} below minimum {}", signal.confidence, self.config.min_confidence));
        }
        if signal.current_price <= Decimal::ZERO {
            return Err("current_price must be positive".to_string());
        }
        let info = self.symbols.get(&signal.symbol).map(|e| e.value().clone()).ok_or_else(|| format!("unknown symbol: {}", signal.symbol))?;
        if !info.is_tradeable() {
            return Err(format!("symbol {} is not tradeable", signal.symbol));
        }
        Ok(info)
    }

    fn compute_quantity(&self, signal: &Signal, info: &SymbolInfo) -> Decimal {
        let pct = signal.position_size_pct.unwrap_or(Decimal::ONE);
        let notional = self.config.default_order_notional * pct;
        let raw_quantity = notional / signal.current_price;
        let formatted = self.adapter.format_quantity(info, raw_quantity);
        let minimum = self.adapter.calc_min_quantity(info, signal.current_price);
        formatted.max(minimum)
    }

    async fn check_risk(&self, symbol: &str, position_side: PositionSide, quantity: Decimal, price: Decimal) -> Option<String> {
        let now = Utc::now();
        let daily_realized = self.positions.daily_pnl(now);
        let projected_portfolio_exposure = self.positions.total_exposure() + quantity * price;
        let result = RiskValidator::validate(symbol, position_side, &self.risk_limits, daily_realized, quantity, projected_portfolio_exposure);
        if result.passed {
            None
        } else {
            Some(result.violations.iter().map(|v| v.message.clone()).collect::<Vec<_>>().join("; "))
        }
    }

    fn build_order(&self, signal: &Signal, info: &SymbolInfo, side: Side, position_side: PositionSide, quantity: Decimal) -> TradeOrder {
        let price = self.adapter.format_price(info, signal.current_price);
        let mut order = TradeOrder::new(
            signal.symbol.clone(),
            side,
            signal.order_type,
            quantity,
            position_side,
            signal.strategy_id.clone(),
            signal.time_in_force,
        )
        .with_target_price(price)
        .with_signal_snapshot(signal);
        if signal.order_type.requires_trigger() {
            order = order.with_stop_price(price);
        }
        order
    }

    async fn acquire_lock(&self, name: &str, holder_id: &str) -> crate::error::Result<()> {
        let deadline = tokio::time::Instant::now() + self.config.lock_acquire_timeout;
        loop {
            let acquired = self
                .lock_store
                .try_acquire(name, holder_id, self.config.lock_ttl)
                .await
                .map_err(|e| DispatchError::VenueFailed(e.to_string()))?;
            if acquired.is_some() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DispatchError::LockTimeout { name: name.to_string(), timeout_secs: self.config.lock_acquire_timeout.as_secs() });
            }
            tokio::time::sleep(self.config.lock_poll_interval).await;
        }
    }

    /// Runs after the lock is held: venue execution, then post-trade
    /// bookkeeping. Always returns (never panics on a venue error), so the
    /// caller can release the lock unconditionally.
    async fn execute_and_record(&self, signal: &Signal, order: TradeOrder, position_side: PositionSide) -> DispatchOutcome {
        let ack = match self.adapter.place_order(&order).await {
            Ok(ack) => ack,
            Err(e) => {
                self.metrics.record_venue_failure();
                error!("place_order failed for {} on {}: {e}", signal.strategy_id, signal.symbol);
                return DispatchOutcome::failed(e.to_string());
            }
        };

        if ack.status == OrderStatus::Rejected {
            self.metrics.record_venue_failure();
            return DispatchOutcome::failed("order rejected by venue");
        }

        if ack.filled_qty > Decimal::ZERO {
            self.apply_post_trade(signal, &order, position_side, ack.avg_fill_price, ack.filled_qty).await;
        }

        self.metrics.record_dispatched();
        let status = if ack.status == OrderStatus::Filled { DispatchStatus::Executed } else { DispatchStatus::Simulated };
        DispatchOutcome { status, order_id: Some(ack.order_id), reason: None }
    }

    async fn apply_post_trade(
        &self,
        signal: &Signal,
        order: &TradeOrder,
        position_side: PositionSide,
        avg_fill_price: Option<Decimal>,
        filled_qty: Decimal,
    ) {
        let now = Utc::now();
        let fill_price = avg_fill_price.unwrap_or(order.target_price.unwrap_or(signal.current_price));

        let exchange_position = self.positions.apply_fill(&signal.symbol, position_side, order.position_id, filled_qty, fill_price, now);

        let (strategy_position, contribution) = self.tracker.open(
            signal.strategy_id.clone(),
            signal.symbol.clone(),
            position_side,
            fill_price,
            filled_qty,
            signal.stop_loss,
            signal.take_profit,
            now,
        );
        info!("dispatched strategy position {} for {} on {}", strategy_position.strategy_position_id, signal.strategy_id, signal.symbol);

        if let (Some(sl), Some(tp)) = (signal.stop_loss, signal.take_profit) {
            match self
                .oco
                .place_pair(strategy_position.strategy_position_id, &signal.symbol, position_side, &signal.strategy_id, fill_price, filled_qty, sl, tp)
                .await
            {
                Ok(pair) => {
                    if let Err(e) = self.position_store.upsert_oco_pair(&pair).await {
                        error!("failed to persist oco pair for strategy {}: {e}", strategy_position.strategy_position_id);
                    }
                }
                Err(e) => {
                    error!("oco pair placement failed for strategy {}: {e}", strategy_position.strategy_position_id);
                    if self.config.unprotected_policy == UnprotectedPolicy::AutoClose {
                        self.auto_close_unprotected(&strategy_position, position_side, fill_price, now).await;
                    }
                }
            }
        }

        if let Err(e) = self.position_store.upsert_exchange_position(&exchange_position).await {
            error!("failed to persist exchange position for {}: {e}", signal.symbol);
        }
        if let Err(e) = self.position_store.upsert_strategy_position(&strategy_position).await {
            error!("failed to persist strategy position {}: {e}", strategy_position.strategy_position_id);
        }
        if let Err(e) = self.position_store.append_contribution(&contribution).await {
            error!("failed to append contribution for {}: {e}", strategy_position.strategy_position_id);
        }

        if let Err(e) = self.analytics_store.mirror_exchange_position(&exchange_position).await {
            warn!("analytics mirror of exchange position {} failed: {e}", signal.symbol);
        }
        if let Err(e) = self.analytics_store.mirror_strategy_position(&strategy_position).await {
            warn!("analytics mirror of strategy position {} failed: {e}", strategy_position.strategy_position_id);
        }
        if let Err(e) = self.analytics_store.mirror_contribution(&contribution).await {
            warn!("analytics mirror of contribution for {} failed: {e}", strategy_position.strategy_position_id);
        }
    }

    /// Closes a strategy position that was left unprotected by a failed OCO
    /// placement, at its own entry price (no SL/TP was ever live to move
    /// the market against it). Only runs under `UnprotectedPolicy::AutoClose`.
    async fn auto_close_unprotected(&self, strategy_position: &StrategyPosition, position_side: PositionSide, fill_price: Decimal, now: chrono::DateTime<Utc>) {
        let id = strategy_position.strategy_position_id;
        match self.tracker.close(id, fill_price, CloseReason::Manual, Decimal::ZERO, now) {
            Ok((closed, _)) => {
                let pnl = closed.realized_pnl.unwrap_or_default();
                if let Err(e) = self.positions.reduce(&closed.symbol, position_side, id, closed.entry_quantity, pnl, now) {
                    error!("failed to reduce exchange position while auto-closing unprotected strategy {id}: {e}");
                }
                self.record_realized_pnl(pnl, now).await;
                warn!("auto-closed unprotected strategy position {id} after failed oco placement");
            }
            Err(e) => error!("failed to auto-close unprotected strategy position {id}: {e}"),
        }
    }
}
