use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tradeengine_core::{OrderId, OrderStatus, Symbol, SymbolInfo, TradeOrder};

use crate::error::PortResult;

/// Result of submitting or querying an order on the venue.
#[derive(Debug, Clone)]
pub struct OrderAck {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub filled_qty: Decimal,
    pub avg_fill_price: Option<Decimal>,
    pub commission: Decimal,
}

/// The logical contract the core programs against for a hedge-mode futures
/// venue. Production bindings (REST/WebSocket client) are out of scope;
/// this trait is what the dispatcher, position manager, and OCO manager
/// actually call.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Loads per-symbol filters (tick size, step size, minimum notional).
    async fn load_symbol_info(&self) -> PortResult<HashMap<Symbol, SymbolInfo>>;

    /// Rounds a quantity down to the symbol's step size.
    fn format_quantity(&self, info: &SymbolInfo, quantity: Decimal) -> Decimal;

    /// Rounds a price to the symbol's tick size.
    fn format_price(&self, info: &SymbolInfo, price: Decimal) -> Decimal;

    /// Smallest quantity that satisfies both the minimum quantity and
    /// minimum notional filters at the given price.
    fn calc_min_quantity(&self, info: &SymbolInfo, price: Decimal) -> Decimal;

    /// Places an order. Side and position_side are both sent; hedge mode
    /// derives `reduceOnly` from position_side, so no explicit flag is sent.
    async fn place_order(&self, order: &TradeOrder) -> PortResult<OrderAck>;

    /// Cancels an order. Idempotent: cancelling an order that is already
    /// gone is treated as success.
    async fn cancel_order(&self, symbol: &str, order_id: OrderId) -> PortResult<()>;

    /// Queries the current state of an order.
    async fn query_order(&self, symbol: &str, order_id: OrderId) -> PortResult<OrderAck>;

    /// Lists currently open orders for a symbol.
    async fn list_open_orders(&self, symbol: &str) -> PortResult<Vec<OrderAck>>;

    /// True if the venue is configured for hedge mode (LONG/SHORT coexist).
    async fn verify_hedge_mode(&self) -> PortResult<bool>;
}
