use std::collections::HashMap;

use rust_decimal::Decimal;
use tradeengine_core::PositionSide;

/// The dispatcher-facing risk configuration: the three gauges the pipeline
/// checks before converting a signal into an order. Overrides are looked up
/// symbol-side first, then symbol, then this default — the same hierarchy
/// the engine's configuration tree documents for every overridable knob.
/// A symbol-side entry is keyed `"{symbol}_{side:?}"` (e.g. `"BTCUSDT_Long"`).
#[derive(Debug, Clone)]
pub struct RiskLimits {
    pub daily_loss_limit: Decimal,
    pub default_max_position: Decimal,
    pub symbol_max_position: HashMap<String, Decimal>,
    pub portfolio_exposure_cap: Decimal,
}

impl RiskLimits {
    pub fn max_position_for(&self, symbol: &str, side: PositionSide) -> Decimal {
        let qualified = format!("{symbol}_{side:?}");
        self.symbol_max_position
            .get(&qualified)
            .or_else(|| self.symbol_max_position.get(symbol))
            .copied()
            .unwrap_or(self.default_max_position)
    }
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            daily_loss_limit: Decimal::new(5000, 0),
            default_max_position: Decimal::new(10, 0),
            symbol_max_position: HashMap::new(),
            portfolio_exposure_cap: Decimal::new(100_000, 0),
        }
    }
}
