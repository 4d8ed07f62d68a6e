//! Signal Aggregator
//!
//! Windows incoming signals per `(symbol, side)`, applies a configurable
//! resolution policy to cross-side conflicts, and a same-direction
//! collapse policy to multiple signals sharing a side. In hedge mode
//! opposite-side signals are never conflicts — each side gets its own
//! window and both resolve independently.

mod aggregator;
mod config;
mod error;
mod events;
mod resolution;
mod sweeper;
mod window;

pub use aggregator::SignalAggregator;
pub use config::{AggregatorConfig, ResolutionPolicy, SameDirectionConflictResolution};
pub use error::{AggregatorError, Result};
pub use events::{AggregatorEvent, RejectionReason};
pub use sweeper::run_sweeper;
