use async_trait::async_trait;
use chrono::Duration;
use tradeengine_core::Lock;

use crate::error::PortResult;

/// Port for the distributed lock. In production backed by MongoDB so
/// multiple engine instances serialise against the same document; in tests
/// and single-instance deployments backed by an in-process store.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Attempts to acquire `name` for `holder_id`, held for `ttl`. Returns
    /// `Ok(Some(lock))` on success, `Ok(None)` if already held by someone
    /// else and not expired.
    async fn try_acquire(&self, name: &str, holder_id: &str, ttl: Duration) -> PortResult<Option<Lock>>;

    /// Releases `name` if currently held by `holder_id`. Releasing a lock
    /// not held by the caller (already expired and reclaimed, or never
    /// held) is a no-op, not an error.
    async fn release(&self, name: &str, holder_id: &str) -> PortResult<()>;

    /// Removes expired locks. Called periodically by a sweeper task.
    async fn sweep_expired(&self) -> PortResult<u64>;
}
