use async_trait::async_trait;
use tradeengine_core::{ExchangePosition, OcoPair, StrategyPosition};

use crate::error::PortResult;

/// A single append-only entry in the position contribution ledger.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PositionContribution {
    pub strategy_position_id: uuid::Uuid,
    pub symbol: String,
    pub sequence_number: u64,
    pub qty_delta: rust_decimal::Decimal,
    pub price: rust_decimal::Decimal,
    pub time: chrono::DateTime<chrono::Utc>,
    pub contribution_pnl_at_close: Option<rust_decimal::Decimal>,
}

/// The authoritative document store: positions, strategy positions, OCO
/// pairs, the contribution ledger, and distributed locks live here. Reads
/// that drive correctness-critical decisions always go through this port.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn upsert_exchange_position(&self, position: &ExchangePosition) -> PortResult<()>;
    async fn upsert_strategy_position(&self, position: &StrategyPosition) -> PortResult<()>;
    async fn upsert_oco_pair(&self, pair: &OcoPair) -> PortResult<()>;
    async fn append_contribution(&self, contribution: &PositionContribution) -> PortResult<()>;
    async fn load_active_oco_pairs(&self) -> PortResult<Vec<OcoPair>>;
    async fn load_open_strategy_positions(&self) -> PortResult<Vec<StrategyPosition>>;
}

/// The analytics mirror: best-effort dual write, eventually consistent,
/// never read back for correctness-critical decisions. Failures here are
/// logged and retried by a background sync loop rather than propagated.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn mirror_exchange_position(&self, position: &ExchangePosition) -> PortResult<()>;
    async fn mirror_strategy_position(&self, position: &StrategyPosition) -> PortResult<()>;
    async fn mirror_contribution(&self, contribution: &PositionContribution) -> PortResult<()>;
}
