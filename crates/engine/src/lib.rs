//! Engine
//!
//! Top-level wiring for the trading core: constructs the Position Manager,
//! Strategy Position Tracker, OCO Manager, Signal Aggregator and Dispatcher
//! around a shared exchange adapter and lock store, exposes the single
//! `submit_signal` entrypoint external collaborators call into, and owns
//! the background tasks (OCO monitor, lock sweeper, aggregator sweeper,
//! event-dispatch loop) along with graceful shutdown.

mod config;
mod engine;
mod error;
mod metrics;

pub use config::EngineConfig;
pub use engine::{EngineHandle, TradingEngine};
pub use error::{EngineError, Result};
pub use metrics::EngineMetricsSnapshot;
