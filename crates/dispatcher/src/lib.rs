//! Dispatcher
//!
//! Sequences a signal's journey from acceptance to a placed order: validate,
//! risk-check, convert to a concrete order, acquire the per-key distributed
//! lock, execute against the venue, and record the resulting fill — with the
//! lock released on every exit path, including venue and persistence
//! failures.

mod config;
mod dispatcher;
mod error;
mod metrics;
mod outcome;

pub use config::{DispatchConfig, UnprotectedPolicy};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use metrics::DispatcherMetrics;
pub use outcome::{DispatchOutcome, DispatchStatus};
