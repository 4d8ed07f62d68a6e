use serde::{Deserialize, Serialize};

/// How a strategy arrived at a signal. Carried through for audit and for the
/// `timeframe_weighted` resolution policy's mode multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    Deterministic,
    LlmReasoning,
    MlModel,
}

impl Default for StrategyMode {
    fn default() -> Self {
        StrategyMode::Deterministic
    }
}

impl StrategyMode {
    /// Score multiplier applied in `timeframe_weighted` resolution.
    /// Deterministic strategies are trusted at face value; model-derived
    /// signals are discounted slightly until corroborated by confidence.
    pub fn score_multiplier(self) -> rust_decimal::Decimal {
        use rust_decimal_macros::dec;
        match self {
            StrategyMode::Deterministic => dec!(1.0),
            StrategyMode::MlModel => dec!(0.9),
            StrategyMode::LlmReasoning => dec!(0.8),
        }
    }
}
