//! Position Manager & Strategy Position Tracker
//!
//! Two-level position model: `PositionManager` owns the aggregate
//! `(symbol, position_side) -> ExchangePosition` the venue reports;
//! `StrategyPositionTracker` owns the per-strategy virtual positions that
//! share an exchange position and attributes PnL using each strategy's own
//! entry price.

mod error;
mod exchange_positions;
mod strategy_positions;

pub use error::{PositionError, Result};
pub use exchange_positions::PositionManager;
pub use strategy_positions::StrategyPositionTracker;
