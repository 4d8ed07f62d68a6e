use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndReplaceOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};
use tradeengine_core::{ExchangePosition, OcoPair, StrategyPosition};
use tradeengine_ports::{PortError, PortResult, PositionContribution, PositionStore};

/// Production `PositionStore` binding: one collection per document type in
/// the primary store, matching `positions`, `strategy_positions`,
/// `oco_pairs`, `position_contributions`. Construction and the query shape
/// are real; exercising it against a live cluster is out of scope here.
pub struct MongoPositionStore {
    positions: Collection<ExchangePosition>,
    strategy_positions: Collection<StrategyPosition>,
    oco_pairs: Collection<OcoPair>,
    contributions: Collection<PositionContribution>,
}

impl MongoPositionStore {
    pub async fn connect(uri: &str, database: &str) -> PortResult<Self> {
        let client = Client::with_uri_str(uri).await.map_err(|e| PortError::StoreUnavailable(e.to_string()))?;
        Ok(Self::from_database(client.database(database)))
    }

    pub fn from_database(database: Database) -> Self {
        Self {
            positions: database.collection("positions"),
            strategy_positions: database.collection("strategy_positions"),
            oco_pairs: database.collection("oco_pairs"),
            contributions: database.collection("position_contributions"),
        }
    }
}

#[async_trait]
impl PositionStore for MongoPositionStore {
    async fn upsert_exchange_position(&self, position: &ExchangePosition) -> PortResult<()> {
        let filter = doc! { "symbol": &position.symbol, "position_side": position_side_str(position.position_side) };
        let options = FindOneAndReplaceOptions::builder().upsert(true).return_document(ReturnDocument::After).build();
        self.positions
            .find_one_and_replace(filter, position)
            .with_options(options)
            .await
            .map_err(|e| PortError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn upsert_strategy_position(&self, position: &StrategyPosition) -> PortResult<()> {
        let filter = doc! { "strategy_position_id": position.strategy_position_id.to_string() };
        let options = FindOneAndReplaceOptions::builder().upsert(true).return_document(ReturnDocument::After).build();
        self.strategy_positions
            .find_one_and_replace(filter, position)
            .with_options(options)
            .await
            .map_err(|e| PortError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn upsert_oco_pair(&self, pair: &OcoPair) -> PortResult<()> {
        let filter = doc! { "strategy_position_id": pair.strategy_position_id.to_string() };
        let options = FindOneAndReplaceOptions::builder().upsert(true).return_document(ReturnDocument::After).build();
        self.oco_pairs.find_one_and_replace(filter, pair).with_options(options).await.map_err(|e| PortError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn append_contribution(&self, contribution: &PositionContribution) -> PortResult<()> {
        self.contributions.insert_one(contribution).await.map_err(|e| PortError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn load_active_oco_pairs(&self) -> PortResult<Vec<OcoPair>> {
        load_all(&self.oco_pairs, doc! { "status": { "$in": ["active", "one_filled"] } }).await
    }

    async fn load_open_strategy_positions(&self) -> PortResult<Vec<StrategyPosition>> {
        load_all(&self.strategy_positions, doc! { "status": "open" }).await
    }
}

async fn load_all<T>(collection: &Collection<T>, filter: mongodb::bson::Document) -> PortResult<Vec<T>>
where
    T: serde::de::DeserializeOwned + Unpin + Send + Sync,
{
    use futures_util::TryStreamExt;
    let cursor = collection.find(filter).await.map_err(|e| PortError::StoreUnavailable(e.to_string()))?;
    cursor.try_collect().await.map_err(|e| PortError::StoreUnavailable(e.to_string()))
}

fn position_side_str(side: tradeengine_core::PositionSide) -> &'static str {
    match side {
        tradeengine_core::PositionSide::Long => "LONG",
        tradeengine_core::PositionSide::Short => "SHORT",
    }
}
