use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tradeengine_core::{OrderId, OrderStatus, OrderType, Symbol, SymbolInfo, TradeOrder};
use tradeengine_ports::{ExchangeAdapter, OrderAck, PortError, PortResult};

use crate::error::ExchangeError;
use crate::retry::with_retry;

#[derive(Debug, Clone)]
struct OrderRecord {
    symbol: String,
    quantity: Decimal,
    ack: OrderAck,
}

/// Reference implementation of the exchange adapter contract. Exercises the
/// full logical contract (symbol filters, rounding, place/cancel/query,
/// retry classification) without a real venue connection. Market orders
/// fill immediately; other order types stay open until `simulate_fill` or
/// `simulate_cancel` is called, which is how OCO manager tests drive fills.
pub struct SimulatedExchangeAdapter {
    symbols: DashMap<String, SymbolInfo>,
    orders: DashMap<OrderId, OrderRecord>,
    hedge_mode: bool,
    max_attempts: u32,
}

impl SimulatedExchangeAdapter {
    pub fn new(hedge_mode: bool) -> Self {
        Self { symbols: DashMap::new(), orders: DashMap::new(), hedge_mode, max_attempts: 3 }
    }

    pub fn register_symbol(&self, info: SymbolInfo) {
        self.symbols.insert(info.symbol.clone(), info);
    }

    pub fn simulate_fill(&self, order_id: OrderId, fill_price: Decimal) {
        if let Some(mut record) = self.orders.get_mut(&order_id) {
            record.ack.status = OrderStatus::Filled;
            record.ack.avg_fill_price = Some(fill_price);
            record.ack.filled_qty = record.quantity;
        }
    }

    pub fn simulate_cancel(&self, order_id: OrderId) {
        if let Some(mut record) = self.orders.get_mut(&order_id) {
            record.ack.status = OrderStatus::Cancelled;
        }
    }

    fn round_down_to_step(value: Decimal, step: Decimal) -> Decimal {
        if step.is_zero() {
            return value;
        }
        (value / step).floor() * step
    }

    fn round_up_to_step(value: Decimal, step: Decimal) -> Decimal {
        if step.is_zero() {
            return value;
        }
        (value / step).ceil() * step
    }
}

#[async_trait]
impl ExchangeAdapter for SimulatedExchangeAdapter {
    async fn load_symbol_info(&self) -> PortResult<HashMap<Symbol, SymbolInfo>> {
        Ok(self.symbols.iter().map(|e| (e.key().clone(), e.value().clone())).collect())
    }

    fn format_quantity(&self, info: &SymbolInfo, quantity: Decimal) -> Decimal {
        Self::round_down_to_step(quantity, info.quantity_step)
    }

    fn format_price(&self, info: &SymbolInfo, price: Decimal) -> Decimal {
        Self::round_down_to_step(price, info.price_tick)
    }

    fn calc_min_quantity(&self, info: &SymbolInfo, price: Decimal) -> Decimal {
        if price.is_zero() {
            return info.min_quantity;
        }
        let notional_floor = Self::round_up_to_step(info.min_notional / price, info.quantity_step);
        info.min_quantity.max(notional_floor)
    }

    async fn place_order(&self, order: &TradeOrder) -> PortResult<OrderAck> {
        let info = self
            .symbols
            .get(&order.symbol)
            .ok_or_else(|| PortError::UnknownSymbol(order.symbol.clone()))?
            .clone();

        let result = with_retry(self.max_attempts, "place_order", || async {
            if order.quantity < info.min_quantity {
                return Err(ExchangeError::InvalidQuantity {
                    symbol: order.symbol.clone(),
                    quantity: order.quantity.to_string(),
                });
            }
            let immediate_fill = order.order_type == OrderType::Market;
            let ack = OrderAck {
                order_id: order.order_id,
                status: if immediate_fill { OrderStatus::Filled } else { OrderStatus::New },
                filled_qty: if immediate_fill { order.quantity } else { Decimal::ZERO },
                avg_fill_price: if immediate_fill { order.target_price.or(Some(Decimal::ZERO)) } else { None },
                commission: if immediate_fill {
                    order.quantity * order.target_price.unwrap_or(Decimal::ZERO) * Decimal::new(4, 4)
                } else {
                    Decimal::ZERO
                },
            };
            Ok(ack)
        })
        .await
        .map_err(to_port_error)?;

        self.orders.insert(order.order_id, OrderRecord { symbol: order.symbol.clone(), quantity: order.quantity, ack: result.clone() });
        Ok(result)
    }

    async fn cancel_order(&self, _symbol: &str, order_id: OrderId) -> PortResult<()> {
        if let Some(mut record) = self.orders.get_mut(&order_id) {
            if !record.ack.status.is_terminal() {
                record.ack.status = OrderStatus::Cancelled;
            }
        }
        Ok(())
    }

    async fn query_order(&self, _symbol: &str, order_id: OrderId) -> PortResult<OrderAck> {
        self.orders.get(&order_id).map(|r| r.ack.clone()).ok_or_else(|| PortError::OrderNotFound(order_id.to_string()))
    }

    async fn list_open_orders(&self, symbol: &str) -> PortResult<Vec<OrderAck>> {
        Ok(self
            .orders
            .iter()
            .filter(|e| e.value().symbol == symbol && e.value().ack.status.is_open())
            .map(|e| e.value().ack.clone())
            .collect())
    }

    async fn verify_hedge_mode(&self) -> PortResult<bool> {
        Ok(self.hedge_mode)
    }
}

fn to_port_error(err: ExchangeError) -> PortError {
    if err.is_retryable() {
        PortError::Retryable(err.to_string())
    } else {
        PortError::NonRetryable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradeengine_core::{PositionSide, Side, SymbolStatus, TimeInForce};

    fn btc_info() -> SymbolInfo {
        SymbolInfo {
            symbol: "BTCUSDT".into(),
            price_tick: Decimal::new(1, 1),
            quantity_step: Decimal::new(1, 3),
            min_quantity: Decimal::new(1, 3),
            min_notional: Decimal::new(10, 0),
            status: SymbolStatus::Tradeable,
        }
    }

    #[tokio::test]
    async fn market_order_fills_immediately() {
        let adapter = SimulatedExchangeAdapter::new(true);
        adapter.register_symbol(btc_info());
        let order = TradeOrder::new("BTCUSDT", Side::Buy, OrderType::Market, Decimal::new(1, 3), PositionSide::Long, "s1", TimeInForce::Gtc)
            .with_target_price(Decimal::new(45000, 0));

        let ack = adapter.place_order(&order).await.unwrap();
        assert_eq!(ack.status, OrderStatus::Filled);
        assert_eq!(ack.filled_qty, Decimal::new(1, 3));
    }

    #[tokio::test]
    async fn limit_order_stays_open_until_simulated_fill() {
        let adapter = SimulatedExchangeAdapter::new(true);
        adapter.register_symbol(btc_info());
        let order = TradeOrder::new("BTCUSDT", Side::Sell, OrderType::TakeProfit, Decimal::new(1, 3), PositionSide::Long, "s1", TimeInForce::Gtc)
            .with_target_price(Decimal::new(48000, 0));

        let ack = adapter.place_order(&order).await.unwrap();
        assert_eq!(ack.status, OrderStatus::New);

        let open = adapter.list_open_orders("BTCUSDT").await.unwrap();
        assert_eq!(open.len(), 1);

        adapter.simulate_fill(order.order_id, Decimal::new(48000, 0));
        let queried = adapter.query_order("BTCUSDT", order.order_id).await.unwrap();
        assert_eq!(queried.status, OrderStatus::Filled);

        let open_after = adapter.list_open_orders("BTCUSDT").await.unwrap();
        assert!(open_after.is_empty());
    }

    #[tokio::test]
    async fn rejects_quantity_below_minimum() {
        let adapter = SimulatedExchangeAdapter::new(true);
        adapter.register_symbol(btc_info());
        let order = TradeOrder::new("BTCUSDT", Side::Buy, OrderType::Market, Decimal::new(1, 6), PositionSide::Long, "s1", TimeInForce::Gtc)
            .with_target_price(Decimal::new(45000, 0));

        let result = adapter.place_order(&order).await;
        assert!(result.is_err());
    }

    #[test]
    fn calc_min_quantity_honours_notional_floor() {
        let adapter = SimulatedExchangeAdapter::new(true);
        let info = btc_info();
        let min_qty = adapter.calc_min_quantity(&info, Decimal::new(50, 0));
        assert_eq!(min_qty, Decimal::new(2, 1));
    }
}
