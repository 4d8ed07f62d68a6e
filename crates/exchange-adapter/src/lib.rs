//! Exchange Adapter
//!
//! The logical contract a hedge-mode futures venue must satisfy: symbol
//! filters, quantity/price rounding, order placement/cancel/query, and
//! retry/backoff with retryable-vs-non-retryable classification. The trait
//! itself lives in `tradeengine-ports`; this crate provides the reference
//! in-memory implementation used by tests and by the engine when no live
//! venue binding is configured.

mod error;
mod retry;
mod simulated;

pub use error::{ExchangeError, Result};
pub use retry::with_retry;
pub use simulated::SimulatedExchangeAdapter;
