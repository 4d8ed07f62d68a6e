use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OrderStatus, OrderType, PositionSide, Side, Timeframe, TimeInForce};
use crate::entities::Signal;
use crate::values::Symbol;

pub type OrderId = Uuid;
pub type PositionId = Uuid;

/// A copy of the originating signal's interpretive metadata, carried on the
/// order it produced so analytics and audit trails don't need to look the
/// signal back up after the fact. Orders not traced back to a single signal
/// (OCO legs placed to protect an existing position) leave this unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub rationale: Option<String>,
    pub confidence: Decimal,
    pub timeframe: Timeframe,
    pub meta: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<&Signal> for SignalSnapshot {
    fn from(signal: &Signal) -> Self {
        Self { rationale: signal.rationale.clone(), confidence: signal.confidence, timeframe: signal.timeframe, meta: signal.meta.clone() }
    }
}

/// A concrete order constructed by the dispatcher from an accepted signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOrder {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub target_price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    /// Identifies the strategy position this order will open or add to.
    pub position_id: PositionId,
    pub position_side: PositionSide,
    pub reduce_only: bool,
    pub strategy_id: String,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub avg_fill_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub signal_snapshot: Option<SignalSnapshot>,
}

impl TradeOrder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<Symbol>,
        side: Side,
        order_type: OrderType,
        quantity: Decimal,
        position_side: PositionSide,
        strategy_id: impl Into<String>,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            target_price: None,
            stop_price: None,
            time_in_force,
            position_id: Uuid::new_v4(),
            position_side,
            reduce_only: false,
            strategy_id: strategy_id.into(),
            status: OrderStatus::New,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: None,
            created_at: Utc::now(),
            signal_snapshot: None,
        }
    }

    pub fn with_target_price(mut self, price: Decimal) -> Self {
        self.target_price = Some(price);
        self
    }

    pub fn with_signal_snapshot(mut self, signal: &Signal) -> Self {
        self.signal_snapshot = Some(SignalSnapshot::from(signal));
        self
    }

    pub fn with_stop_price(mut self, price: Decimal) -> Self {
        self.stop_price = Some(price);
        self
    }

    pub fn reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }
}
