use std::time::Duration;

use rust_decimal::Decimal;
use tradeengine_core::PositionSide;
use tradeengine_dispatcher::DispatchConfig;
use tradeengine_risk::RiskLimits;
use tradeengine_signal_aggregator::AggregatorConfig;

/// The in-scope slice of the 31-parameter configuration tree: aggregation
/// policy, risk limits, lock/venue/OCO timing, and the unprotected-position
/// policy, all reachable from one typed struct with documented defaults.
/// Reading this from a ConfigMap or file is an engine-embedding concern,
/// not this struct's.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub aggregator: AggregatorConfig,
    pub risk_limits: RiskLimits,
    pub dispatch: DispatchConfig,
    pub oco_poll_interval: Duration,
    pub lock_sweep_interval: Duration,
    pub aggregator_sweep_interval: Duration,
    /// Grace period `shutdown` waits for in-flight dispatch tasks to drain
    /// before cancelling the OCO monitor.
    pub shutdown_grace_period: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            risk_limits: RiskLimits::default(),
            dispatch: DispatchConfig::default(),
            oco_poll_interval: Duration::from_millis(500),
            lock_sweep_interval: Duration::from_secs(10),
            aggregator_sweep_interval: Duration::from_millis(50),
            shutdown_grace_period: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    /// Sets the position-limit override one tier above a plain symbol
    /// override: `RiskLimits::max_position_for` resolves symbol-side keys
    /// (`"{symbol}_{side:?}"`) before the plain symbol key, before the
    /// global default.
    pub fn set_max_position_override(&mut self, symbol: &str, side: PositionSide, limit: Decimal) {
        self.risk_limits.symbol_max_position.insert(format!("{symbol}_{side:?}"), limit);
    }

    pub fn max_position_for(&self, symbol: &str, side: PositionSide) -> Decimal {
        self.risk_limits.max_position_for(symbol, side)
    }
}
