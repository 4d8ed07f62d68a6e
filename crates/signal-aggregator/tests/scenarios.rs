use std::time::Duration;

use chrono::Utc;
use rust_decimal_macros::dec;
use tradeengine_core::{Action, OrderType, Strength, StrategyMode, TimeInForce, Timeframe};
use tradeengine_signal_aggregator::{AggregatorConfig, AggregatorEvent, RejectionReason, SignalAggregator};

fn signal(strategy_id: &str, symbol: &str, action: Action, confidence: rust_decimal::Decimal, immediate: bool) -> tradeengine_core::Signal {
    tradeengine_core::Signal {
        strategy_id: strategy_id.to_string(),
        symbol: symbol.to_string(),
        action,
        confidence,
        strength: Some(Strength::Strong),
        timeframe: Timeframe::H1,
        current_price: dec!(45000),
        order_type: OrderType::Market,
        time_in_force: TimeInForce::Gtc,
        strategy_mode: StrategyMode::Deterministic,
        position_size_pct: None,
        stop_loss: Some(dec!(43000)),
        take_profit: Some(dec!(48000)),
        rationale: None,
        immediate,
        arrival_time: Utc::now(),
        meta: None,
    }
}

// S3 — hedge-mode simultaneous LONG and SHORT signals on the same symbol:
// both must pass through as independent accepted events, never compared
// against each other as a conflict.
#[tokio::test]
async fn s3_hedge_mode_opposite_sides_both_pass_independently() {
    let config = AggregatorConfig { hedge_mode: true, ..Default::default() };
    let (aggregator, mut events) = SignalAggregator::new(config);

    aggregator.submit_signal(signal("trend_long", "BTCUSDT", Action::Buy, dec!(0.8), true)).unwrap();
    aggregator.submit_signal(signal("trend_short", "BTCUSDT", Action::Sell, dec!(0.8), true)).unwrap();

    let mut accepted = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let AggregatorEvent::Accepted(signal) = event {
            accepted.push(signal);
        }
    }
    assert_eq!(accepted.len(), 2, "both sides of a hedge-mode pair must pass through independently");
    assert!(accepted.iter().any(|s| s.action == Action::Buy));
    assert!(accepted.iter().any(|s| s.action == Action::Sell));
}

#[tokio::test]
async fn non_hedge_mode_opposite_sides_are_resolved_as_a_conflict() {
    let config = AggregatorConfig { hedge_mode: false, ..Default::default() };
    let (aggregator, mut events) = SignalAggregator::new(config);

    aggregator.submit_signal(signal("trend_long", "BTCUSDT", Action::Buy, dec!(0.9), true)).unwrap();
    aggregator.submit_signal(signal("trend_short", "BTCUSDT", Action::Sell, dec!(0.3), true)).unwrap();

    let mut accepted = Vec::new();
    let mut rejected_opposite = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            AggregatorEvent::Accepted(s) => accepted.push(s),
            AggregatorEvent::Rejected { reason: RejectionReason::OppositeHigherTimeframe, .. } => rejected_opposite += 1,
            _ => {}
        }
    }
    assert_eq!(accepted.len(), 1);
    assert_eq!(rejected_opposite, 1);
}

#[tokio::test]
async fn malformed_signal_is_rejected_before_windowing() {
    let (aggregator, _events) = SignalAggregator::new(AggregatorConfig::default());
    let mut bad = signal("a", "BTCUSDT", Action::Buy, dec!(0.9), true);
    bad.confidence = dec!(-1);
    assert!(aggregator.submit_signal(bad).is_err());
}

#[tokio::test]
async fn hold_signals_are_filtered_with_reason() {
    let (aggregator, mut events) = SignalAggregator::new(AggregatorConfig::default());
    aggregator.submit_signal(signal("a", "BTCUSDT", Action::Hold, dec!(0.9), false)).unwrap();
    let event = events.recv().await.unwrap();
    assert!(matches!(event, AggregatorEvent::Rejected { reason: RejectionReason::HoldFiltered, .. }));
}

#[tokio::test(start_paused = true)]
async fn window_closes_on_its_own_without_an_immediate_flag() {
    let config = AggregatorConfig { window_duration: Duration::from_millis(50), ..Default::default() };
    let (aggregator, mut events) = SignalAggregator::new(config);

    aggregator.submit_signal(signal("a", "ETHUSDT", Action::Buy, dec!(0.8), false)).unwrap();
    assert_eq!(aggregator.open_window_count(), 1);

    tokio::time::advance(Duration::from_millis(60)).await;
    aggregator.sweep_expired();

    let event = events.recv().await.unwrap();
    assert!(matches!(event, AggregatorEvent::Accepted(_)));
}
