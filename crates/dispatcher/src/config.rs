use std::time::Duration;

use chrono::Duration as ChronoDuration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// What happens to a StrategyPosition left unprotected after a partial OCO
/// placement failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnprotectedPolicy {
    RemainOpen,
    AutoClose,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub min_confidence: Decimal,
    /// Fraction of `default_order_notional` a signal's own
    /// `position_size_pct` scales, when present.
    pub default_order_notional: Decimal,
    pub lock_ttl: ChronoDuration,
    pub lock_acquire_timeout: Duration,
    pub lock_poll_interval: Duration,
    pub unprotected_policy: UnprotectedPolicy,
    /// Must agree with what `ExchangeAdapter::verify_hedge_mode` reports.
    /// Checked once by `refresh_symbol_info`; LONG/SHORT coexist per symbol
    /// only when both sides agree.
    pub hedge_mode: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            min_confidence: dec!(0.5),
            default_order_notional: dec!(1000),
            lock_ttl: ChronoDuration::seconds(30),
            lock_acquire_timeout: Duration::from_secs(60),
            lock_poll_interval: Duration::from_millis(50),
            unprotected_policy: UnprotectedPolicy::RemainOpen,
            hedge_mode: true,
        }
    }
}
