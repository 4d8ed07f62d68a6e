//! Core Domain
//!
//! Pure domain types for the trading engine core. No async, no I/O; 100%
//! unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    Action,
    CloseReason,
    ExchangePosition,
    ExchangePositionKey,
    Lock,
    OcoPair,
    OcoStatus,
    OrderId,
    OrderStatus,
    OrderType,
    PositionId,
    PositionSide,
    PositionStatus,
    Side,
    Signal,
    StrategyMode,
    StrategyPosition,
    StrategyPositionId,
    StrategyPositionStatus,
    Strength,
    SymbolInfo,
    SymbolStatus,
    TimeInForce,
    Timeframe,
    TradeOrder,
};
pub use values::{Price, Quantity, Symbol, Timestamp};
