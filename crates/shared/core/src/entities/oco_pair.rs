use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::exchange_position::ExchangePositionKey;
use super::{OrderId, PositionSide};
use crate::values::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcoStatus {
    Active,
    OneFilled,
    Cancelled,
    Completed,
}

/// Links a strategy position to its two protection orders. A key may hold
/// several concurrent pairs, one per contributing strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcoPair {
    pub strategy_position_id: Uuid,
    pub symbol: Symbol,
    pub position_side: PositionSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub sl_order_id: OrderId,
    pub tp_order_id: OrderId,
    pub status: OcoStatus,
    pub created_at: DateTime<Utc>,
}

impl OcoPair {
    pub fn exchange_position_key(&self) -> ExchangePositionKey {
        (self.symbol.clone(), self.position_side)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, OcoStatus::Active | OcoStatus::OneFilled)
    }
}
