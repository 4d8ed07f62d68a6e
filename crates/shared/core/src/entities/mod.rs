mod action;
mod exchange_position;
mod lock;
mod oco_pair;
mod order_status;
mod order_type;
mod position_side;
mod side;
mod signal;
mod strategy_mode;
mod strategy_position;
mod strength;
mod symbol_info;
mod time_in_force;
mod timeframe;
mod trade_order;

pub use action::Action;
pub use exchange_position::{ExchangePosition, ExchangePositionKey, PositionStatus};
pub use lock::Lock;
pub use oco_pair::{OcoPair, OcoStatus};
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use position_side::PositionSide;
pub use side::Side;
pub use signal::Signal;
pub use strategy_mode::StrategyMode;
pub use strategy_position::{CloseReason, StrategyPosition, StrategyPositionId, StrategyPositionStatus};
pub use strength::Strength;
pub use symbol_info::{SymbolInfo, SymbolStatus};
pub use time_in_force::TimeInForce;
pub use timeframe::Timeframe;
pub use trade_order::{OrderId, PositionId, SignalSnapshot, TradeOrder};
