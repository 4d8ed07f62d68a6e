use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use log::debug;
use tradeengine_core::Lock;
use tradeengine_ports::{LockStore, PortResult};

/// Default lock store: a single process's view of the lock table, backed
/// by a concurrent map. Used in tests and in single-instance deployments
/// where no external coordination is needed.
#[derive(Default)]
pub struct InMemoryLockStore {
    locks: DashMap<String, Lock>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn try_acquire(&self, name: &str, holder_id: &str, ttl: Duration) -> PortResult<Option<Lock>> {
        let now = Utc::now();
        let mut acquired = None;
        self.locks
            .entry(name.to_string())
            .and_modify(|existing| {
                if existing.is_expired(now) {
                    *existing = Lock {
                        name: name.to_string(),
                        holder_id: holder_id.to_string(),
                        acquired_at: now,
                        expires_at: now + ttl,
                    };
                    acquired = Some(existing.clone());
                }
            })
            .or_insert_with(|| {
                let lock = Lock {
                    name: name.to_string(),
                    holder_id: holder_id.to_string(),
                    acquired_at: now,
                    expires_at: now + ttl,
                };
                acquired = Some(lock.clone());
                lock
            });
        debug!("lock {name} acquire attempt by {holder_id}: {}", acquired.is_some());
        Ok(acquired)
    }

    async fn release(&self, name: &str, holder_id: &str) -> PortResult<()> {
        if let Some(entry) = self.locks.get(name) {
            if entry.holder_id != holder_id {
                return Ok(());
            }
        } else {
            return Ok(());
        }
        self.locks.remove_if(name, |_, lock| lock.holder_id == holder_id);
        Ok(())
    }

    async fn sweep_expired(&self) -> PortResult<u64> {
        let now = Utc::now();
        let before = self.locks.len();
        self.locks.retain(|_, lock| !lock.is_expired(now));
        Ok((before - self.locks.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_fails_while_held() {
        let store = InMemoryLockStore::new();
        let ttl = Duration::seconds(60);
        let first = store.try_acquire("order_execution_BTCUSDT_LONG", "worker-a", ttl).await.unwrap();
        assert!(first.is_some());

        let second = store.try_acquire("order_execution_BTCUSDT_LONG", "worker-b", ttl).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn release_by_non_holder_is_noop() {
        let store = InMemoryLockStore::new();
        let ttl = Duration::seconds(60);
        store.try_acquire("k", "a", ttl).await.unwrap();
        store.release("k", "b").await.unwrap();

        let retry = store.try_acquire("k", "b", ttl).await.unwrap();
        assert!(retry.is_none(), "lock held by a must not be releasable by b");
    }

    #[tokio::test]
    async fn release_then_reacquire_succeeds() {
        let store = InMemoryLockStore::new();
        let ttl = Duration::seconds(60);
        store.try_acquire("k", "a", ttl).await.unwrap();
        store.release("k", "a").await.unwrap();

        let retry = store.try_acquire("k", "b", ttl).await.unwrap();
        assert!(retry.is_some());
    }

    #[tokio::test]
    async fn expired_lock_is_reacquirable() {
        let store = InMemoryLockStore::new();
        store.try_acquire("k", "a", Duration::milliseconds(-1)).await.unwrap();

        let retry = store.try_acquire("k", "b", Duration::seconds(60)).await.unwrap();
        assert!(retry.is_some());
        assert_eq!(retry.unwrap().holder_id, "b");
    }

    #[tokio::test]
    async fn sweep_removes_only_expired() {
        let store = InMemoryLockStore::new();
        store.try_acquire("expired", "a", Duration::milliseconds(-1)).await.unwrap();
        store.try_acquire("alive", "a", Duration::seconds(60)).await.unwrap();

        let removed = store.sweep_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.locks.len(), 1);
    }
}
