use serde::{Deserialize, Serialize};

/// Order type as understood by the exchange adapter contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    TakeProfit,
    TakeProfitLimit,
}

impl OrderType {
    /// True if the type requires a limit price.
    pub fn requires_price(self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit | OrderType::TakeProfitLimit)
    }

    /// True if the type requires a stop/trigger price.
    pub fn requires_trigger(self) -> bool {
        matches!(
            self,
            OrderType::Stop | OrderType::StopLimit | OrderType::TakeProfit | OrderType::TakeProfitLimit
        )
    }
}
