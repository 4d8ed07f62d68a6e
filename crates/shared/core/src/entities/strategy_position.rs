use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::exchange_position::ExchangePositionKey;
use super::PositionSide;
use crate::values::Symbol;

pub type StrategyPositionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPositionStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    TakeProfit,
    StopLoss,
    Manual,
    Liquidation,
}

/// A virtual per-strategy position. PnL is always computed from this
/// position's own `entry_price`, never the exchange's weighted average.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyPosition {
    pub strategy_position_id: StrategyPositionId,
    pub strategy_id: String,
    pub symbol: Symbol,
    pub position_side: PositionSide,
    pub entry_price: Decimal,
    pub entry_quantity: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub status: StrategyPositionStatus,
    pub close_reason: Option<CloseReason>,
    pub realized_pnl: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub exit_time: Option<DateTime<Utc>>,
    pub opened_at: DateTime<Utc>,
}

impl StrategyPosition {
    pub fn new(
        strategy_id: impl Into<String>,
        symbol: impl Into<Symbol>,
        position_side: PositionSide,
        entry_price: Decimal,
        entry_quantity: Decimal,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            strategy_position_id: Uuid::new_v4(),
            strategy_id: strategy_id.into(),
            symbol: symbol.into(),
            position_side,
            entry_price,
            entry_quantity,
            stop_loss,
            take_profit,
            status: StrategyPositionStatus::Open,
            close_reason: None,
            realized_pnl: None,
            exit_price: None,
            exit_time: None,
            opened_at: now,
        }
    }

    pub fn exchange_position_key(&self) -> ExchangePositionKey {
        (self.symbol.clone(), self.position_side)
    }

    pub fn is_open(&self) -> bool {
        self.status == StrategyPositionStatus::Open
    }

    /// `pnl = (exit - entry) * qty` for LONG, `(entry - exit) * qty` for
    /// SHORT, minus commissions. Uses this position's own entry price.
    pub fn close(&mut self, exit_price: Decimal, reason: CloseReason, commission: Decimal, now: DateTime<Utc>) -> Decimal {
        let gross = match self.position_side {
            PositionSide::Long => (exit_price - self.entry_price) * self.entry_quantity,
            PositionSide::Short => (self.entry_price - exit_price) * self.entry_quantity,
        };
        let pnl = gross - commission;
        self.status = StrategyPositionStatus::Closed;
        self.close_reason = Some(reason);
        self.exit_price = Some(exit_price);
        self.exit_time = Some(now);
        self.realized_pnl = Some(pnl);
        pnl
    }
}
