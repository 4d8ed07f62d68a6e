use async_trait::async_trait;
use chrono::{Duration, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tradeengine_core::Lock;
use tradeengine_ports::{LockStore, PortError, PortResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockDocument {
    #[serde(rename = "_id")]
    name: String,
    holder_id: String,
    acquired_at: BsonDateTime,
    expires_at: BsonDateTime,
}

/// Production lock store backed by the `distributed_locks` collection.
/// Acquisition is a single `findOneAndUpdate` with an upsert filtered on
/// "not currently held, or expired" so the compare-and-swap happens inside
/// the database rather than in two round trips.
pub struct MongoLockStore {
    collection: Collection<LockDocument>,
}

impl MongoLockStore {
    pub async fn connect(uri: &str, database: &str) -> PortResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| PortError::LockStoreUnavailable(e.to_string()))?;
        let collection = client.database(database).collection("distributed_locks");
        Ok(Self { collection })
    }

    pub fn from_collection(collection: Collection<LockDocument>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl LockStore for MongoLockStore {
    async fn try_acquire(&self, name: &str, holder_id: &str, ttl: Duration) -> PortResult<Option<Lock>> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let filter = doc! {
            "_id": name,
            "$or": [
                { "expires_at": { "$lte": BsonDateTime::from_chrono(now) } },
                { "holder_id": holder_id },
            ],
        };
        let update = doc! {
            "$set": {
                "holder_id": holder_id,
                "acquired_at": BsonDateTime::from_chrono(now),
                "expires_at": BsonDateTime::from_chrono(expires_at),
            },
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let result = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await
            .map_err(|e| PortError::LockStoreUnavailable(e.to_string()))?;

        match result {
            Some(doc) if doc.holder_id == holder_id => Ok(Some(Lock {
                name: doc.name,
                holder_id: doc.holder_id,
                acquired_at: doc.acquired_at.to_chrono(),
                expires_at: doc.expires_at.to_chrono(),
            })),
            _ => Ok(None),
        }
    }

    async fn release(&self, name: &str, holder_id: &str) -> PortResult<()> {
        let filter = doc! { "_id": name, "holder_id": holder_id };
        self.collection
            .delete_one(filter)
            .await
            .map_err(|e| PortError::LockStoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn sweep_expired(&self) -> PortResult<u64> {
        let now = Utc::now();
        let filter = doc! { "expires_at": { "$lte": BsonDateTime::from_chrono(now) } };
        let result = self
            .collection
            .delete_many(filter)
            .await
            .map_err(|e| PortError::LockStoreUnavailable(e.to_string()))?;
        Ok(result.deleted_count)
    }
}
