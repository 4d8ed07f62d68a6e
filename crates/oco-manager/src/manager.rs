use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use log::{error, info, warn};
use rust_decimal::Decimal;
use tradeengine_core::{CloseReason, ExchangePositionKey, OcoPair, OcoStatus, OrderStatus, OrderType, PositionSide, TimeInForce, TradeOrder};
use tradeengine_ports::ExchangeAdapter;
use tradeengine_position_manager::{PositionManager, StrategyPositionTracker};
use uuid::Uuid;

use crate::error::{OcoError, Result};
use crate::metrics::OcoMetrics;

/// Places and monitors paired SL/TP orders per strategy position. A key may
/// hold several concurrent pairs — one per contributing strategy — and
/// placement across pairs is deliberately not serialised: each pair's order
/// ids are independent on the venue, so the venue's order-id space is the
/// coordination point, not a queue here.
pub struct OcoManager {
    adapter: Arc<dyn ExchangeAdapter>,
    tracker: Arc<StrategyPositionTracker>,
    positions: Arc<PositionManager>,
    pairs: DashMap<ExchangePositionKey, Vec<OcoPair>>,
    by_strategy: DashMap<Uuid, OcoPair>,
    pub metrics: OcoMetrics,
}

impl OcoManager {
    pub fn new(adapter: Arc<dyn ExchangeAdapter>, tracker: Arc<StrategyPositionTracker>, positions: Arc<PositionManager>) -> Self {
        Self {
            adapter,
            tracker,
            positions,
            pairs: DashMap::new(),
            by_strategy: DashMap::new(),
            metrics: OcoMetrics::new(),
        }
    }

    /// Rebuilds `active_pairs` from persisted metadata on process restart,
    /// before monitoring resumes.
    pub fn rebuild_from_persisted(&self, persisted: Vec<OcoPair>) {
        for pair in persisted {
            if pair.is_active() {
                self.by_strategy.insert(pair.strategy_position_id, pair.clone());
                self.pairs.entry(pair.exchange_position_key()).or_default().push(pair);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn place_pair(
        &self,
        strategy_position_id: Uuid,
        symbol: &str,
        position_side: PositionSide,
        strategy_id: &str,
        entry_price: Decimal,
        quantity: Decimal,
        sl_price: Decimal,
        tp_price: Decimal,
    ) -> Result<OcoPair> {
        let reducing_side = position_side.reducing_side();

        let sl_order = TradeOrder::new(symbol, reducing_side, OrderType::Stop, quantity, position_side, strategy_id, TimeInForce::Gtc)
            .with_stop_price(sl_price)
            .reduce_only();
        let tp_order = TradeOrder::new(symbol, reducing_side, OrderType::TakeProfit, quantity, position_side, strategy_id, TimeInForce::Gtc)
            .with_target_price(tp_price)
            .reduce_only();

        let sl_ack = self.adapter.place_order(&sl_order).await.map_err(|e| OcoError::PlacementFailed {
            leg: "stop_loss",
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

        let tp_ack = match self.adapter.place_order(&tp_order).await {
            Ok(ack) => ack,
            Err(e) => {
                if let Err(cancel_err) = self.adapter.cancel_order(symbol, sl_ack.order_id).await {
                    warn!("failed to cancel stop_loss {} after take_profit placement failed: {cancel_err}", sl_ack.order_id);
                }
                self.metrics.record_unprotected();
                error!("strategy {strategy_position_id} left unprotected: take_profit placement failed: {e}");
                return Err(OcoError::PlacementFailed { leg: "take_profit", symbol: symbol.to_string(), reason: e.to_string() });
            }
        };

        let pair = OcoPair {
            strategy_position_id,
            symbol: symbol.to_string(),
            position_side,
            quantity,
            entry_price,
            sl_order_id: sl_ack.order_id,
            tp_order_id: tp_ack.order_id,
            status: OcoStatus::Active,
            created_at: Utc::now(),
        };

        self.by_strategy.insert(strategy_position_id, pair.clone());
        self.pairs.entry(pair.exchange_position_key()).or_default().push(pair.clone());
        info!("placed oco pair for strategy {strategy_position_id} on {symbol} {position_side:?}");
        Ok(pair)
    }

    /// Cancels both legs without closing the strategy position — the
    /// caller decides what happens to the position.
    pub async fn cancel_pair(&self, strategy_position_id: Uuid) -> Result<()> {
        let pair = self.by_strategy.get(&strategy_position_id).map(|e| e.clone()).ok_or(OcoError::PairNotFound(strategy_position_id))?;

        if let Err(e) = self.adapter.cancel_order(&pair.symbol, pair.sl_order_id).await {
            warn!("cancel stop_loss {} for {strategy_position_id}: {e}", pair.sl_order_id);
        }
        if let Err(e) = self.adapter.cancel_order(&pair.symbol, pair.tp_order_id).await {
            warn!("cancel take_profit {} for {strategy_position_id}: {e}", pair.tp_order_id);
        }

        self.set_status(&pair, OcoStatus::Cancelled);
        Ok(())
    }

    pub fn pair_for(&self, strategy_position_id: Uuid) -> Option<OcoPair> {
        self.by_strategy.get(&strategy_position_id).map(|e| e.clone())
    }

    pub fn active_pairs(&self) -> Vec<OcoPair> {
        self.by_strategy.iter().filter(|e| e.is_active()).map(|e| e.value().clone()).collect()
    }

    fn set_status(&self, pair: &OcoPair, status: OcoStatus) {
        if let Some(mut entry) = self.by_strategy.get_mut(&pair.strategy_position_id) {
            entry.status = status;
        }
        if let Some(mut list) = self.pairs.get_mut(&pair.exchange_position_key()) {
            if let Some(found) = list.iter_mut().find(|p| p.strategy_position_id == pair.strategy_position_id) {
                found.status = status;
            }
        }
    }

    /// One polling cycle. Queries `list_open_orders` once per distinct
    /// symbol among active pairs, then classifies each pair against that
    /// symbol's open-order set.
    pub async fn poll_once(&self) {
        let active = self.active_pairs();
        if active.is_empty() {
            return;
        }

        let mut by_symbol: HashMap<String, Vec<OcoPair>> = HashMap::new();
        for pair in active {
            by_symbol.entry(pair.symbol.clone()).or_default().push(pair);
        }

        for (symbol, pairs) in by_symbol {
            let open_orders = match self.adapter.list_open_orders(&symbol).await {
                Ok(orders) => orders,
                Err(e) => {
                    warn!("list_open_orders({symbol}) failed, leaving {} pairs active: {e}", pairs.len());
                    continue;
                }
            };
            let open_ids: std::collections::HashSet<_> = open_orders.iter().map(|o| o.order_id).collect();

            for pair in pairs {
                self.classify_pair(&symbol, pair, &open_ids).await;
            }
        }
    }

    async fn classify_pair(&self, symbol: &str, pair: OcoPair, open_ids: &std::collections::HashSet<Uuid>) {
        let sl_open = open_ids.contains(&pair.sl_order_id);
        let tp_open = open_ids.contains(&pair.tp_order_id);

        match (sl_open, tp_open) {
            (true, true) => {}
            (false, true) => self.resolve_single_leg_gone(symbol, &pair, pair.sl_order_id, CloseReason::StopLoss, pair.tp_order_id).await,
            (true, false) => self.resolve_single_leg_gone(symbol, &pair, pair.tp_order_id, CloseReason::TakeProfit, pair.sl_order_id).await,
            (false, false) => self.resolve_both_legs_gone(symbol, &pair).await,
        }
    }

    async fn resolve_single_leg_gone(&self, symbol: &str, pair: &OcoPair, gone_order_id: Uuid, reason: CloseReason, surviving_order_id: Uuid) {
        let ack = match self.adapter.query_order(symbol, gone_order_id).await {
            Ok(ack) => ack,
            Err(e) => {
                warn!("query_order({gone_order_id}) failed, leaving pair active: {e}");
                return;
            }
        };
        if ack.status != OrderStatus::Filled {
            // cancelled out-of-band, not a fill; leave as-is for now.
            return;
        }

        self.set_status(pair, OcoStatus::OneFilled);

        if let Err(e) = self.adapter.cancel_order(symbol, surviving_order_id).await {
            warn!("cancel surviving leg {surviving_order_id} after fill: {e}");
        }
        self.complete(pair, reason, ack.avg_fill_price.unwrap_or(pair.entry_price), ack.commission).await;
    }

    async fn resolve_both_legs_gone(&self, symbol: &str, pair: &OcoPair) {
        let sl = self.adapter.query_order(symbol, pair.sl_order_id).await;
        let tp = self.adapter.query_order(symbol, pair.tp_order_id).await;

        let (sl, tp) = match (sl, tp) {
            (Ok(sl), Ok(tp)) => (sl, tp),
            _ => {
                warn!("could not confirm both legs for strategy {}, leaving pair active", pair.strategy_position_id);
                return;
            }
        };

        let sl_filled = sl.status == OrderStatus::Filled;
        let tp_filled = tp.status == OrderStatus::Filled;

        match (sl_filled, tp_filled) {
            (true, false) => self.complete(pair, CloseReason::StopLoss, sl.avg_fill_price.unwrap_or(pair.entry_price), sl.commission).await,
            (false, true) => self.complete(pair, CloseReason::TakeProfit, tp.avg_fill_price.unwrap_or(pair.entry_price), tp.commission).await,
            (true, true) => {
                self.metrics.record_anomaly();
                error!("both legs filled for strategy {}, preferring take_profit", pair.strategy_position_id);
                self.set_status(pair, OcoStatus::OneFilled);
                self.complete(pair, CloseReason::TakeProfit, tp.avg_fill_price.unwrap_or(pair.entry_price), tp.commission).await;
            }
            (false, false) => {
                // Both cancelled out-of-band; nothing to attribute to a fill.
                self.set_status(pair, OcoStatus::Cancelled);
            }
        }
    }

    async fn complete(&self, pair: &OcoPair, reason: CloseReason, exit_price: Decimal, commission: Decimal) {
        let now = Utc::now();
        match self.tracker.close(pair.strategy_position_id, exit_price, reason, commission, now) {
            Ok((closed, _contribution)) => {
                let pnl = closed.realized_pnl.unwrap_or_default();
                if let Err(e) = self.positions.reduce(&pair.symbol, pair.position_side, pair.strategy_position_id, pair.quantity, pnl, now) {
                    error!("failed to reduce exchange position after closing strategy {}: {e}", pair.strategy_position_id);
                }
            }
            Err(e) => error!("failed to close strategy position {}: {e}", pair.strategy_position_id),
        }
        self.set_status(pair, OcoStatus::Completed);
        self.metrics.record_completed();
        info!("oco pair for strategy {} completed with reason {reason:?}", pair.strategy_position_id);
    }
}
