use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Action, OrderType, PositionSide, Strength, StrategyMode, Timeframe, TimeInForce};
use crate::values::Symbol;

/// A strategy-produced trading intent. Immutable once received; identity is
/// `(strategy_id, symbol, timeframe, arrival_time)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub strategy_id: String,
    pub symbol: Symbol,
    pub action: Action,
    pub confidence: Decimal,
    pub strength: Option<Strength>,
    pub timeframe: Timeframe,
    pub current_price: Decimal,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub time_in_force: TimeInForce,
    #[serde(default)]
    pub strategy_mode: StrategyMode,
    pub position_size_pct: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub rationale: Option<String>,
    /// When true, the aggregation window closes immediately on arrival
    /// instead of waiting for the configured window duration.
    #[serde(default)]
    pub immediate: bool,
    pub arrival_time: DateTime<Utc>,
    /// Free-form strategy-supplied context, carried through unexamined.
    #[serde(default)]
    pub meta: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::Market
    }
}

impl Signal {
    /// Validates the fields the aggregator requires before admitting a
    /// signal to a window. Missing fields surface as `malformed_signal`.
    pub fn is_well_formed(&self) -> bool {
        self.confidence >= Decimal::ZERO
            && self.confidence <= Decimal::ONE
            && self.current_price > Decimal::ZERO
            && !self.strategy_id.is_empty()
            && !self.symbol.is_empty()
    }

    /// Window key: a sliding aggregation window opens per symbol and the
    /// side a fresh position on this signal would take. `hold` actions have
    /// no side and are never windowed — they short-circuit before reaching
    /// the window map.
    pub fn aggregation_key(&self) -> Option<(Symbol, PositionSide)> {
        self.action.position_side().map(|side| (self.symbol.clone(), side))
    }
}
