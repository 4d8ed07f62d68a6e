use serde::{Deserialize, Serialize};

/// Timeframe a signal was computed on. Carries a fixed weight in `[0.3, 2.0]`
/// used by the aggregator's `timeframe_weighted` resolution policy and by
/// `higher_timeframe_wins` to break ties between conflicting signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Tick,
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "8h")]
    H8,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "3d")]
    D3,
    #[serde(rename = "1w")]
    W1,
    #[serde(rename = "1M")]
    Mo1,
}

impl Timeframe {
    /// Weight used by score-based resolution. Assigned monotonically by
    /// timeframe length, bounded to `[0.3, 2.0]` per the documented range.
    pub fn weight(self) -> rust_decimal::Decimal {
        use rust_decimal_macros::dec;
        match self {
            Timeframe::Tick => dec!(0.3),
            Timeframe::M1 => dec!(0.4),
            Timeframe::M3 => dec!(0.5),
            Timeframe::M5 => dec!(0.6),
            Timeframe::M15 => dec!(0.75),
            Timeframe::M30 => dec!(0.9),
            Timeframe::H1 => dec!(1.0),
            Timeframe::H2 => dec!(1.15),
            Timeframe::H4 => dec!(1.3),
            Timeframe::H6 => dec!(1.45),
            Timeframe::H8 => dec!(1.55),
            Timeframe::H12 => dec!(1.65),
            Timeframe::D1 => dec!(1.8),
            Timeframe::D3 => dec!(1.9),
            Timeframe::W1 => dec!(1.95),
            Timeframe::Mo1 => dec!(2.0),
        }
    }
}
