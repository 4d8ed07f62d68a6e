use async_trait::async_trait;
use dashmap::DashMap;
use tradeengine_core::{ExchangePosition, ExchangePositionKey, OcoPair, StrategyPosition, StrategyPositionId};
use tradeengine_ports::{AnalyticsStore, PositionContribution, PositionStore, PortResult};

/// Reference `PositionStore`: the authoritative document store, backed by
/// concurrent maps instead of a real database. Used in tests and as the
/// default when no `mongodb` URI is configured.
#[derive(Default)]
pub struct InMemoryPositionStore {
    exchange_positions: DashMap<ExchangePositionKey, ExchangePosition>,
    strategy_positions: DashMap<StrategyPositionId, StrategyPosition>,
    oco_pairs: DashMap<StrategyPositionId, OcoPair>,
    contributions: DashMap<u64, PositionContribution>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    async fn upsert_exchange_position(&self, position: &ExchangePosition) -> PortResult<()> {
        self.exchange_positions.insert(position.key(), position.clone());
        Ok(())
    }

    async fn upsert_strategy_position(&self, position: &StrategyPosition) -> PortResult<()> {
        self.strategy_positions.insert(position.strategy_position_id, position.clone());
        Ok(())
    }

    async fn upsert_oco_pair(&self, pair: &OcoPair) -> PortResult<()> {
        self.oco_pairs.insert(pair.strategy_position_id, pair.clone());
        Ok(())
    }

    async fn append_contribution(&self, contribution: &PositionContribution) -> PortResult<()> {
        self.contributions.insert(contribution.sequence_number, contribution.clone());
        Ok(())
    }

    async fn load_active_oco_pairs(&self) -> PortResult<Vec<OcoPair>> {
        Ok(self.oco_pairs.iter().filter(|e| e.is_active()).map(|e| e.value().clone()).collect())
    }

    async fn load_open_strategy_positions(&self) -> PortResult<Vec<StrategyPosition>> {
        Ok(self.strategy_positions.iter().filter(|e| e.is_open()).map(|e| e.value().clone()).collect())
    }
}

/// Reference `AnalyticsStore`: an in-memory mirror with no retry loop of
/// its own. The production binding is a relational store written to on a
/// best-effort basis by the dispatcher; this stands in for it in tests.
#[derive(Default)]
pub struct InMemoryAnalyticsStore {
    exchange_positions: DashMap<ExchangePositionKey, ExchangePosition>,
    strategy_positions: DashMap<StrategyPositionId, StrategyPosition>,
    contributions: DashMap<u64, PositionContribution>,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exchange_position_count(&self) -> usize {
        self.exchange_positions.len()
    }

    pub fn strategy_position_count(&self) -> usize {
        self.strategy_positions.len()
    }

    pub fn contribution_count(&self) -> usize {
        self.contributions.len()
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn mirror_exchange_position(&self, position: &ExchangePosition) -> PortResult<()> {
        self.exchange_positions.insert(position.key(), position.clone());
        Ok(())
    }

    async fn mirror_strategy_position(&self, position: &StrategyPosition) -> PortResult<()> {
        self.strategy_positions.insert(position.strategy_position_id, position.clone());
        Ok(())
    }

    async fn mirror_contribution(&self, contribution: &PositionContribution) -> PortResult<()> {
        self.contributions.insert(contribution.sequence_number, contribution.clone());
        Ok(())
    }
}
