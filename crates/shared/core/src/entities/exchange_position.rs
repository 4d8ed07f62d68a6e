use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PositionSide;
use crate::values::Symbol;

/// Identifies an aggregate exchange position. LONG and SHORT on the same
/// symbol are distinct keys and are never netted against each other.
pub type ExchangePositionKey = (Symbol, PositionSide);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Aggregate state the venue reports for `(symbol, position_side)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangePosition {
    pub symbol: Symbol,
    pub position_side: PositionSide,
    pub quantity: Decimal,
    pub avg_entry_price: Decimal,
    pub realized_pnl: Decimal,
    pub status: PositionStatus,
    pub contributing_strategy_positions: HashSet<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangePosition {
    pub fn new(symbol: impl Into<Symbol>, position_side: PositionSide, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            position_side,
            quantity: Decimal::ZERO,
            avg_entry_price: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            status: PositionStatus::Open,
            contributing_strategy_positions: HashSet::new(),
            updated_at: now,
        }
    }

    pub fn key(&self) -> ExchangePositionKey {
        (self.symbol.clone(), self.position_side)
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}
