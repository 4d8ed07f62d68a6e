use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tradeengine_core::{ExchangePosition, ExchangePositionKey, PositionSide, PositionStatus};
use tradeengine_risk::DailyPnlTracker;
use uuid::Uuid;

use crate::error::{PositionError, Result};

/// Owns the `(symbol, position_side) -> ExchangePosition` map, plus the
/// calendar-day realized PnL gauge the risk check reads. A LONG and a SHORT
/// on the same symbol are distinct keys and are never netted.
pub struct PositionManager {
    positions: DashMap<ExchangePositionKey, ExchangePosition>,
    daily_pnl: Mutex<DailyPnlTracker>,
}

impl Default for PositionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionManager {
    pub fn new() -> Self {
        Self { positions: DashMap::new(), daily_pnl: Mutex::new(DailyPnlTracker::new(Utc::now())) }
    }

    /// Accumulates a fill into the exchange position, recomputing the
    /// volume-weighted average entry price, and records the contributing
    /// strategy position.
    pub fn apply_fill(
        &self,
        symbol: &str,
        position_side: PositionSide,
        strategy_position_id: Uuid,
        fill_qty: Decimal,
        fill_price: Decimal,
        now: DateTime<Utc>,
    ) -> ExchangePosition {
        let key = (symbol.to_string(), position_side);
        let mut entry = self.positions.entry(key).or_insert_with(|| ExchangePosition::new(symbol, position_side, now));

        let new_qty = entry.quantity + fill_qty;
        entry.avg_entry_price = if new_qty.is_zero() {
            Decimal::ZERO
        } else {
            (entry.avg_entry_price * entry.quantity + fill_price * fill_qty) / new_qty
        };
        entry.quantity = new_qty;
        entry.status = PositionStatus::Open;
        entry.contributing_strategy_positions.insert(strategy_position_id);
        entry.updated_at = now;
        entry.clone()
    }

    /// Reduces the exchange position by `qty` (a strategy closing) and
    /// records the realized PnL attributed to that reduction. Closes the
    /// exchange position once quantity reaches zero.
    pub fn reduce(
        &self,
        symbol: &str,
        position_side: PositionSide,
        strategy_position_id: Uuid,
        qty: Decimal,
        realized_pnl: Decimal,
        now: DateTime<Utc>,
    ) -> Result<ExchangePosition> {
        let key = (symbol.to_string(), position_side);
        let mut entry = self
            .positions
            .get_mut(&key)
            .ok_or_else(|| PositionError::NoExchangePosition(format!("{symbol}:{position_side:?}")))?;

        if qty > entry.quantity {
            return Err(PositionError::OverReduction { reduce: qty.to_string(), open: entry.quantity.to_string() });
        }

        entry.quantity -= qty;
        entry.realized_pnl += realized_pnl;
        entry.contributing_strategy_positions.remove(&strategy_position_id);
        entry.updated_at = now;
        if entry.quantity.is_zero() {
            entry.status = PositionStatus::Closed;
        }
        Ok(entry.clone())
    }

    /// Force-closes the exchange position outright — an administrative
    /// flatten, distinct from the strategy-attributed `reduce` that runs on
    /// every fill. Any contributing strategies are dropped from the index;
    /// their own `StrategyPosition` records are closed separately by the
    /// caller.
    pub fn close(&self, symbol: &str, position_side: PositionSide, now: DateTime<Utc>) -> Result<ExchangePosition> {
        let key = (symbol.to_string(), position_side);
        let mut entry = self
            .positions
            .get_mut(&key)
            .ok_or_else(|| PositionError::NoExchangePosition(format!("{symbol}:{position_side:?}")))?;
        entry.quantity = Decimal::ZERO;
        entry.contributing_strategy_positions.clear();
        entry.status = PositionStatus::Closed;
        entry.updated_at = now;
        Ok(entry.clone())
    }

    /// Feeds a realized PnL event (an OCO completion, a reduce, a manual
    /// close) into the calendar-day gauge the risk check reads.
    pub fn record_realized_pnl(&self, pnl: Decimal, now: DateTime<Utc>) {
        self.daily_pnl.lock().expect("daily pnl mutex poisoned").record(pnl, now);
    }

    /// Realized PnL accumulated since the last UTC midnight rollover.
    pub fn daily_pnl(&self, now: DateTime<Utc>) -> Decimal {
        self.daily_pnl.lock().expect("daily pnl mutex poisoned").realized(now)
    }

    pub fn get(&self, symbol: &str, position_side: PositionSide) -> Option<ExchangePosition> {
        self.positions.get(&(symbol.to_string(), position_side)).map(|e| e.clone())
    }

    pub fn snapshot(&self) -> Vec<ExchangePosition> {
        self.positions.iter().map(|e| e.value().clone()).collect()
    }

    /// Sum of realized PnL across every exchange position. Callers that
    /// need a calendar-day gauge (the dispatcher's risk check) track their
    /// own rollover; this is the raw cumulative figure.
    pub fn cumulative_realized_pnl(&self) -> Decimal {
        self.positions.iter().map(|e| e.realized_pnl).sum()
    }

    /// Notional exposure of all open positions, `sum(quantity * avg_price)`.
    pub fn total_exposure(&self) -> Decimal {
        self.positions.iter().filter(|e| e.is_open()).map(|e| e.quantity * e.avg_entry_price).sum()
    }
}
