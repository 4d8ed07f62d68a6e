use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// How conflicting signals on opposite sides of the same symbol are resolved.
/// Only consulted when `hedge_mode` is `false` — in hedge mode, opposite-side
/// signals are never conflicts, they are independent positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    HigherTimeframeWins,
    TimeframeWeighted,
    StrongestWins,
    FirstComeFirstServed,
    ManualReview,
}

/// How multiple same-direction signals on the same key within one window
/// are collapsed before being passed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameDirectionConflictResolution {
    /// All signals pass through; the dispatcher opens one strategy position
    /// per signal against the shared exchange position.
    Accumulate,
    /// Only the most recently arrived signal passes; earlier ones in the
    /// window are rejected.
    Replace,
    /// Only the earliest signal passes; later ones in the window are
    /// rejected.
    Reject,
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// When true, opposite-side signals on the same symbol are independent
    /// and windowed separately — never compared by a resolution policy.
    pub hedge_mode: bool,
    pub resolution_policy: ResolutionPolicy,
    pub same_direction_conflict_resolution: SameDirectionConflictResolution,
    pub window_duration: Duration,
    /// Minimum |net weighted score| required for `TimeframeWeighted` (and a
    /// tied `HigherTimeframeWins`) to pass a signal through.
    pub quorum_threshold: Decimal,
    /// Per-strategy score multiplier override, default 1 when absent.
    pub strategy_weights: HashMap<String, Decimal>,
    /// Per-symbol resolution policy override.
    pub symbol_resolution_overrides: HashMap<String, ResolutionPolicy>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            hedge_mode: true,
            resolution_policy: ResolutionPolicy::TimeframeWeighted,
            same_direction_conflict_resolution: SameDirectionConflictResolution::Accumulate,
            window_duration: Duration::from_millis(200),
            quorum_threshold: dec!(0.15),
            strategy_weights: HashMap::new(),
            symbol_resolution_overrides: HashMap::new(),
        }
    }
}

impl AggregatorConfig {
    pub fn resolution_policy_for(&self, symbol: &str) -> ResolutionPolicy {
        self.symbol_resolution_overrides.get(symbol).copied().unwrap_or(self.resolution_policy)
    }

    pub fn strategy_weight(&self, strategy_id: &str) -> Decimal {
        self.strategy_weights.get(strategy_id).copied().unwrap_or(Decimal::ONE)
    }
}
