use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tradeengine_core::{CloseReason, OcoStatus, PositionSide, SymbolInfo, SymbolStatus};
use tradeengine_exchange_adapter::SimulatedExchangeAdapter;
use tradeengine_oco_manager::OcoManager;
use tradeengine_ports::ExchangeAdapter;
use tradeengine_position_manager::{PositionManager, StrategyPositionTracker};

fn btc_info() -> SymbolInfo {
    SymbolInfo {
        symbol: "BTCUSDT".into(),
        price_tick: Decimal::new(1, 1),
        quantity_step: Decimal::new(1, 6),
        min_quantity: Decimal::new(1, 6),
        min_notional: Decimal::new(1, 0),
        status: SymbolStatus::Tradeable,
    }
}

fn setup() -> (Arc<SimulatedExchangeAdapter>, Arc<StrategyPositionTracker>, Arc<PositionManager>, Arc<OcoManager>) {
    let adapter = Arc::new(SimulatedExchangeAdapter::new(true));
    adapter.register_symbol(btc_info());
    let tracker = Arc::new(StrategyPositionTracker::new());
    let positions = Arc::new(PositionManager::new());
    let oco = Arc::new(OcoManager::new(adapter.clone(), tracker.clone(), positions.clone()));
    (adapter, tracker, positions, oco)
}

// S1 — single strategy, TP hits: SL cancelled, strategy closes with the
// correct PnL, exchange position closes.
#[tokio::test]
async fn s1_single_strategy_take_profit_hits() {
    let (adapter, tracker, positions, oco) = setup();
    let now = Utc::now();

    let (strategy, _) = tracker.open("mom_v1", "BTCUSDT", PositionSide::Long, Decimal::new(45000, 0), Decimal::new(1, 3), Some(Decimal::new(43000, 0)), Some(Decimal::new(48000, 0)), now);
    positions.apply_fill("BTCUSDT", PositionSide::Long, strategy.strategy_position_id, Decimal::new(1, 3), Decimal::new(45000, 0), now);

    let pair = oco
        .place_pair(strategy.strategy_position_id, "BTCUSDT", PositionSide::Long, "mom_v1", Decimal::new(45000, 0), Decimal::new(1, 3), Decimal::new(43000, 0), Decimal::new(48000, 0))
        .await
        .unwrap();

    adapter.simulate_fill(pair.tp_order_id, Decimal::new(48000, 0));
    oco.poll_once().await;

    let closed = tracker.get(strategy.strategy_position_id).unwrap();
    assert!(!closed.is_open());
    assert_eq!(closed.close_reason, Some(CloseReason::TakeProfit));
    assert_eq!(closed.realized_pnl, Some(Decimal::new(3, 0)));

    let exchange_position = positions.get("BTCUSDT", PositionSide::Long).unwrap();
    assert_eq!(exchange_position.quantity, Decimal::ZERO);

    // the surviving SL leg must have been cancelled
    let sl_status = adapter.query_order("BTCUSDT", pair.sl_order_id).await.unwrap();
    assert!(!sl_status.status.is_open());

    let completed = oco.pair_for(strategy.strategy_position_id).unwrap();
    assert_eq!(completed.status, OcoStatus::Completed);
}

// S2 — two strategies accumulate on the same key; only the filled
// strategy's pair completes, the other remains active and unaffected.
#[tokio::test]
async fn s2_two_strategies_independent_pairs() {
    let (adapter, tracker, positions, oco) = setup();
    let now = Utc::now();

    let (a, _) = tracker.open("a", "BTCUSDT", PositionSide::Long, Decimal::new(45000, 0), Decimal::new(1, 3), Some(Decimal::new(43000, 0)), Some(Decimal::new(48000, 0)), now);
    positions.apply_fill("BTCUSDT", PositionSide::Long, a.strategy_position_id, Decimal::new(1, 3), Decimal::new(45000, 0), now);
    let pair_a = oco.place_pair(a.strategy_position_id, "BTCUSDT", PositionSide::Long, "a", Decimal::new(45000, 0), Decimal::new(1, 3), Decimal::new(43000, 0), Decimal::new(48000, 0)).await.unwrap();

    let (b, _) = tracker.open("b", "BTCUSDT", PositionSide::Long, Decimal::new(46000, 0), Decimal::new(2, 3), Some(Decimal::new(44000, 0)), Some(Decimal::new(49000, 0)), now);
    positions.apply_fill("BTCUSDT", PositionSide::Long, b.strategy_position_id, Decimal::new(2, 3), Decimal::new(46000, 0), now);
    let _pair_b = oco.place_pair(b.strategy_position_id, "BTCUSDT", PositionSide::Long, "b", Decimal::new(46000, 0), Decimal::new(2, 3), Decimal::new(44000, 0), Decimal::new(49000, 0)).await.unwrap();

    adapter.simulate_fill(pair_a.tp_order_id, Decimal::new(48000, 0));
    oco.poll_once().await;

    let closed_a = tracker.get(a.strategy_position_id).unwrap();
    assert!(!closed_a.is_open());
    assert_eq!(closed_a.realized_pnl, Some(Decimal::new(3, 0)));

    let still_open_b = tracker.get(b.strategy_position_id).unwrap();
    assert!(still_open_b.is_open(), "strategy b must be untouched by a's close");

    let exchange_position = positions.get("BTCUSDT", PositionSide::Long).unwrap();
    assert_eq!(exchange_position.quantity, Decimal::new(2, 3));
    assert!(exchange_position.is_open());

    let pair_b_state = oco.pair_for(b.strategy_position_id).unwrap();
    assert_eq!(pair_b_state.status, OcoStatus::Active);
}

/// Wraps the reference adapter and rejects the Nth `place_order` call, so
/// tests can drive a take_profit-placement failure after a successful
/// stop_loss placement.
struct RejectingNthOrder {
    inner: Arc<SimulatedExchangeAdapter>,
    reject_call_index: u32,
    calls: std::sync::atomic::AtomicU32,
}

#[async_trait::async_trait]
impl tradeengine_ports::ExchangeAdapter for RejectingNthOrder {
    async fn load_symbol_info(&self) -> tradeengine_ports::PortResult<std::collections::HashMap<String, SymbolInfo>> {
        self.inner.load_symbol_info().await
    }
    fn format_quantity(&self, info: &SymbolInfo, q: Decimal) -> Decimal {
        self.inner.format_quantity(info, q)
    }
    fn format_price(&self, info: &SymbolInfo, p: Decimal) -> Decimal {
        self.inner.format_price(info, p)
    }
    fn calc_min_quantity(&self, info: &SymbolInfo, p: Decimal) -> Decimal {
        self.inner.calc_min_quantity(info, p)
    }
    async fn place_order(&self, order: &tradeengine_core::TradeOrder) -> tradeengine_ports::PortResult<tradeengine_ports::OrderAck> {
        let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if n == self.reject_call_index {
            return Err(tradeengine_ports::PortError::NonRetryable("synthetic take_profit rejection".into()));
        }
        self.inner.place_order(order).await
    }
    async fn cancel_order(&self, symbol: &str, order_id: uuid::Uuid) -> tradeengine_ports::PortResult<()> {
        self.inner.cancel_order(symbol, order_id).await
    }
    async fn query_order(&self, symbol: &str, order_id: uuid::Uuid) -> tradeengine_ports::PortResult<tradeengine_ports::OrderAck> {
        self.inner.query_order(symbol, order_id).await
    }
    async fn list_open_orders(&self, symbol: &str) -> tradeengine_ports::PortResult<Vec<tradeengine_ports::OrderAck>> {
        self.inner.list_open_orders(symbol).await
    }
    async fn verify_hedge_mode(&self) -> tradeengine_ports::PortResult<bool> {
        self.inner.verify_hedge_mode().await
    }
}

// S4 — SL placement succeeds, TP placement fails: the SL is cancelled, the
// pair is not created, and the unprotected-strategy counter increments.
#[tokio::test]
async fn s4_tp_placement_failure_cancels_sl_and_flags_unprotected() {
    let (adapter, tracker, _positions, _oco) = setup();
    let now = Utc::now();
    let (strategy, _) = tracker.open("c", "BTCUSDT", PositionSide::Long, Decimal::new(45000, 0), Decimal::new(1, 3), None, None, now);

    let failing = Arc::new(RejectingNthOrder { inner: adapter.clone(), reject_call_index: 1, calls: std::sync::atomic::AtomicU32::new(0) });
    let positions2 = Arc::new(PositionManager::new());
    let oco_failing = OcoManager::new(failing, tracker.clone(), positions2);

    let result = oco_failing
        .place_pair(strategy.strategy_position_id, "BTCUSDT", PositionSide::Long, "c", Decimal::new(45000, 0), Decimal::new(1, 3), Decimal::new(43000, 0), Decimal::new(48000, 0))
        .await;

    assert!(result.is_err());
    assert_eq!(oco_failing.metrics.strategy_unprotected_total.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(oco_failing.pair_for(strategy.strategy_position_id).is_none());

    // strategy position remains open — the caller decides whether to auto-close
    let still_open = tracker.get(strategy.strategy_position_id).unwrap();
    assert!(still_open.is_open());
}

// S5 — a monitor race where both legs disappear between polls: when only
// one is actually filled, close with that reason and never double-count
// the anomaly counter; when both are filled, prefer take_profit and count
// exactly one anomaly.
#[tokio::test]
async fn s5_both_legs_gone_prefers_confirmed_fill() {
    let (adapter, tracker, positions, oco) = setup();
    let now = Utc::now();
    let (strategy, _) = tracker.open("d", "BTCUSDT", PositionSide::Long, Decimal::new(45000, 0), Decimal::new(1, 3), Some(Decimal::new(43000, 0)), Some(Decimal::new(48000, 0)), now);
    positions.apply_fill("BTCUSDT", PositionSide::Long, strategy.strategy_position_id, Decimal::new(1, 3), Decimal::new(45000, 0), now);
    let pair = oco.place_pair(strategy.strategy_position_id, "BTCUSDT", PositionSide::Long, "d", Decimal::new(45000, 0), Decimal::new(1, 3), Decimal::new(43000, 0), Decimal::new(48000, 0)).await.unwrap();

    // only SL actually filled; TP was cancelled out of band
    adapter.simulate_fill(pair.sl_order_id, Decimal::new(43000, 0));
    adapter.simulate_cancel(pair.tp_order_id);
    oco.poll_once().await;

    let closed = tracker.get(strategy.strategy_position_id).unwrap();
    assert_eq!(closed.close_reason, Some(CloseReason::StopLoss));
    assert_eq!(oco.metrics.anomaly_total.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn s5_variant_both_filled_counts_one_anomaly_and_prefers_take_profit() {
    let (adapter, tracker, positions, oco) = setup();
    let now = Utc::now();
    let (strategy, _) = tracker.open("e", "BTCUSDT", PositionSide::Long, Decimal::new(45000, 0), Decimal::new(1, 3), Some(Decimal::new(43000, 0)), Some(Decimal::new(48000, 0)), now);
    positions.apply_fill("BTCUSDT", PositionSide::Long, strategy.strategy_position_id, Decimal::new(1, 3), Decimal::new(45000, 0), now);
    let pair = oco.place_pair(strategy.strategy_position_id, "BTCUSDT", PositionSide::Long, "e", Decimal::new(45000, 0), Decimal::new(1, 3), Decimal::new(43000, 0), Decimal::new(48000, 0)).await.unwrap();

    adapter.simulate_fill(pair.sl_order_id, Decimal::new(43000, 0));
    adapter.simulate_fill(pair.tp_order_id, Decimal::new(48000, 0));
    oco.poll_once().await;

    let closed = tracker.get(strategy.strategy_position_id).unwrap();
    assert_eq!(closed.close_reason, Some(CloseReason::TakeProfit));
    assert_eq!(oco.metrics.anomaly_total.load(std::sync::atomic::Ordering::SeqCst), 1);
}
