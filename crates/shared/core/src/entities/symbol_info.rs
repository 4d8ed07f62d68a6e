use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStatus {
    Tradeable,
    Halted,
}

/// Per-symbol exchange filters consumed by the dispatcher and the exchange
/// adapter when rounding quantities and prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub price_tick: Decimal,
    pub quantity_step: Decimal,
    pub min_quantity: Decimal,
    pub min_notional: Decimal,
    pub status: SymbolStatus,
}

impl SymbolInfo {
    pub fn is_tradeable(&self) -> bool {
        self.status == SymbolStatus::Tradeable
    }
}
