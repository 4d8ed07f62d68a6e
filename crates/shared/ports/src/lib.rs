//! Ports
//!
//! Port definitions (traits) for the trading engine. These define the
//! boundaries between domain logic and infrastructure: the venue, the
//! distributed lock, and the persistence stores.

mod clock;
mod error;
mod exchange_adapter;
mod lock_store;
mod persistence;

pub use clock::Clock;
pub use error::{PortError, PortResult};
pub use exchange_adapter::{ExchangeAdapter, OrderAck};
pub use lock_store::LockStore;
pub use persistence::{AnalyticsStore, PositionContribution, PositionStore};
