use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradeengine_core::PositionSide;

use crate::parameters::RiskLimits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCheckType {
    DailyLossLimit,
    PositionLimit,
    ExposureLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskViolation {
    pub check: RiskCheckType,
    pub message: String,
    pub requested: Decimal,
    pub limit: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskResult {
    pub passed: bool,
    pub violations: Vec<RiskViolation>,
}

/// Stateless validator run by the dispatcher's risk-check step. Evaluates
/// all three checks so a single rejection reports every violated gauge,
/// not just the first.
pub struct RiskValidator;

impl RiskValidator {
    /// `daily_realized_pnl` is negative when the day is in the red;
    /// `projected_position_size` and `projected_portfolio_exposure` are the
    /// notional values the order under consideration would produce.
    pub fn validate(
        symbol: &str,
        position_side: PositionSide,
        limits: &RiskLimits,
        daily_realized_pnl: Decimal,
        projected_position_size: Decimal,
        projected_portfolio_exposure: Decimal,
    ) -> RiskResult {
        let mut violations = Vec::new();

        if -daily_realized_pnl >= limits.daily_loss_limit {
            violations.push(RiskViolation {
                check: RiskCheckType::DailyLossLimit,
                message: format!("daily realized loss {} has reached the limit", -daily_realized_pnl),
                requested: -daily_realized_pnl,
                limit: limits.daily_loss_limit,
            });
        }

        let symbol_max = limits.max_position_for(symbol, position_side);
        if projected_position_size > symbol_max {
            violations.push(RiskViolation {
                check: RiskCheckType::PositionLimit,
                message: format!("projected position {symbol} size {projected_position_size} exceeds max {symbol_max}"),
                requested: projected_position_size,
                limit: symbol_max,
            });
        }

        if projected_portfolio_exposure > limits.portfolio_exposure_cap {
            violations.push(RiskViolation {
                check: RiskCheckType::ExposureLimit,
                message: format!(
                    "projected portfolio exposure {projected_portfolio_exposure} exceeds cap {}",
                    limits.portfolio_exposure_cap
                ),
                requested: projected_portfolio_exposure,
                limit: limits.portfolio_exposure_cap,
            });
        }

        RiskResult { passed: violations.is_empty(), violations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> RiskLimits {
        RiskLimits {
            daily_loss_limit: Decimal::new(1000, 0),
            default_max_position: Decimal::new(5, 0),
            symbol_max_position: Default::default(),
            portfolio_exposure_cap: Decimal::new(50_000, 0),
        }
    }

    #[test]
    fn passes_when_within_all_gauges() {
        let result = RiskValidator::validate("BTCUSDT", PositionSide::Long, &limits(), Decimal::new(-100, 0), Decimal::new(1, 0), Decimal::new(1000, 0));
        assert!(result.passed);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn rejects_on_daily_loss_limit() {
        let result = RiskValidator::validate("BTCUSDT", PositionSide::Long, &limits(), Decimal::new(-1000, 0), Decimal::new(1, 0), Decimal::new(1000, 0));
        assert!(!result.passed);
        assert_eq!(result.violations[0].check, RiskCheckType::DailyLossLimit);
    }

    #[test]
    fn rejects_on_symbol_position_limit() {
        let result = RiskValidator::validate("BTCUSDT", PositionSide::Long, &limits(), Decimal::ZERO, Decimal::new(10, 0), Decimal::new(1000, 0));
        assert!(!result.passed);
        assert!(result.violations.iter().any(|v| v.check == RiskCheckType::PositionLimit));
    }

    #[test]
    fn rejects_on_portfolio_exposure_cap() {
        let result = RiskValidator::validate("BTCUSDT", PositionSide::Long, &limits(), Decimal::ZERO, Decimal::new(1, 0), Decimal::new(100_000, 0));
        assert!(!result.passed);
        assert!(result.violations.iter().any(|v| v.check == RiskCheckType::ExposureLimit));
    }

    #[test]
    fn reports_all_violations_at_once() {
        let result = RiskValidator::validate("BTCUSDT", PositionSide::Long, &limits(), Decimal::new(-1000, 0), Decimal::new(10, 0), Decimal::new(100_000, 0));
        assert_eq!(result.violations.len(), 3);
    }
}
