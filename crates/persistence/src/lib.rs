//! Persistence
//!
//! Bindings for the `PositionStore` and `AnalyticsStore` ports declared in
//! `tradeengine-ports`: concurrent-map reference implementations for tests
//! and single-instance deployments, and the MongoDB-backed production
//! store for positions, strategy positions, OCO pairs and the contribution
//! ledger. The analytics mirror has no production binding here — it is a
//! relational store outside this crate's scope; the in-memory reference
//! implementation is what tests exercise.

mod in_memory;
mod mongo;

pub use in_memory::{InMemoryAnalyticsStore, InMemoryPositionStore};
pub use mongo::MongoPositionStore;
