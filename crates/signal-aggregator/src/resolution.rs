use rust_decimal::Decimal;
use tradeengine_core::{Action, Signal};

use crate::config::{AggregatorConfig, ResolutionPolicy, SameDirectionConflictResolution};
use crate::events::{AggregatorEvent, RejectionReason};

/// Confidence-weighted score combining timeframe weight, per-strategy weight
/// and the discount a non-deterministic strategy mode carries.
pub fn score(signal: &Signal, config: &AggregatorConfig) -> Decimal {
    signal.confidence * signal.timeframe.weight() * config.strategy_weight(&signal.strategy_id) * signal.strategy_mode.score_multiplier()
}

fn apply_same_direction(mut group: Vec<Signal>, resolution: SameDirectionConflictResolution) -> (Vec<Signal>, Vec<Signal>) {
    if group.len() <= 1 {
        return (group, Vec::new());
    }
    group.sort_by_key(|s| s.arrival_time);
    match resolution {
        SameDirectionConflictResolution::Accumulate => (group, Vec::new()),
        SameDirectionConflictResolution::Replace => {
            let kept = group.pop().expect("len > 1");
            (vec![kept], group)
        }
        SameDirectionConflictResolution::Reject => {
            let mut iter = group.into_iter();
            let kept = iter.next().expect("len > 1");
            (vec![kept], iter.collect())
        }
    }
}

fn accept_all(signals: Vec<Signal>) -> Vec<AggregatorEvent> {
    signals.into_iter().map(AggregatorEvent::Accepted).collect()
}

fn reject_all(signals: Vec<Signal>, reason: RejectionReason) -> Vec<AggregatorEvent> {
    signals.into_iter().map(|signal| AggregatorEvent::Rejected { signal, reason }).collect()
}

/// Resolves one closed window's signals into accept/reject/manual-review
/// events. Signals arriving on a hedge-mode window are always single-sided
/// by construction, so the cross-side conflict branch only triggers when the
/// aggregator is running in non-hedge mode.
pub fn finalize(signals: Vec<Signal>, config: &AggregatorConfig) -> Vec<AggregatorEvent> {
    let (buy, sell): (Vec<Signal>, Vec<Signal>) = signals.into_iter().partition(|s| s.action == Action::Buy);

    let (buy_kept, buy_dropped) = apply_same_direction(buy, config.same_direction_conflict_resolution);
    let (sell_kept, sell_dropped) = apply_same_direction(sell, config.same_direction_conflict_resolution);

    let mut events = Vec::new();
    events.extend(reject_all(buy_dropped, RejectionReason::SameDirectionReplaced));
    events.extend(reject_all(sell_dropped, RejectionReason::SameDirectionReplaced));

    match (buy_kept.is_empty(), sell_kept.is_empty()) {
        (true, true) => {}
        (false, true) => events.extend(finalize_single_side(buy_kept, config)),
        (true, false) => events.extend(finalize_single_side(sell_kept, config)),
        (false, false) => events.extend(resolve_conflict(buy_kept, sell_kept, config)),
    }
    events
}

fn finalize_single_side(side: Vec<Signal>, config: &AggregatorConfig) -> Vec<AggregatorEvent> {
    let policy = config.resolution_policy_for(&side[0].symbol);
    if policy == ResolutionPolicy::TimeframeWeighted {
        let magnitude: Decimal = side.iter().map(|s| score(s, config)).sum();
        if magnitude.abs() < config.quorum_threshold {
            return reject_all(side, RejectionReason::BelowQuorum);
        }
    }
    accept_all(side)
}

fn max_timeframe_weight(signals: &[Signal]) -> Decimal {
    signals.iter().map(|s| s.timeframe.weight()).fold(Decimal::MIN, Decimal::max)
}

fn resolve_conflict(buy: Vec<Signal>, sell: Vec<Signal>, config: &AggregatorConfig) -> Vec<AggregatorEvent> {
    let policy = config.resolution_policy_for(&buy[0].symbol);
    match policy {
        ResolutionPolicy::ManualReview => {
            let symbol = buy[0].symbol.clone();
            let candidates = buy.iter().chain(sell.iter()).cloned().collect();
            let mut events = vec![AggregatorEvent::ManualReview { symbol, candidates }];
            events.extend(reject_all(buy, RejectionReason::ManualReviewRequired));
            events.extend(reject_all(sell, RejectionReason::ManualReviewRequired));
            events
        }
        ResolutionPolicy::HigherTimeframeWins => {
            let buy_tf = max_timeframe_weight(&buy);
            let sell_tf = max_timeframe_weight(&sell);
            if buy_tf == sell_tf {
                resolve_by_weighted_score(buy, sell, config)
            } else if buy_tf > sell_tf {
                winner_take_all(buy, sell)
            } else {
                winner_take_all(sell, buy)
            }
        }
        ResolutionPolicy::TimeframeWeighted => resolve_by_weighted_score(buy, sell, config),
        ResolutionPolicy::StrongestWins => resolve_by_metric(buy, sell, |s| score(s, config)),
        ResolutionPolicy::FirstComeFirstServed => {
            let buy_first = buy.iter().map(|s| s.arrival_time).min();
            let sell_first = sell.iter().map(|s| s.arrival_time).min();
            match (buy_first, sell_first) {
                (Some(b), Some(s)) if b <= s => winner_take_all(buy, sell),
                _ => winner_take_all(sell, buy),
            }
        }
    }
}

fn resolve_by_weighted_score(buy: Vec<Signal>, sell: Vec<Signal>, config: &AggregatorConfig) -> Vec<AggregatorEvent> {
    let buy_score: Decimal = buy.iter().map(|s| score(s, config)).sum();
    let sell_score: Decimal = sell.iter().map(|s| score(s, config)).sum();
    let net = buy_score - sell_score;

    if net.abs() < config.quorum_threshold {
        let mut events = reject_all(buy, RejectionReason::BelowQuorum);
        events.extend(reject_all(sell, RejectionReason::BelowQuorum));
        return events;
    }
    if net > Decimal::ZERO {
        winner_take_all(buy, sell)
    } else {
        winner_take_all(sell, buy)
    }
}

/// Winner side passes through in full (subject to the same-direction
/// collapse already applied before this point); the loser side is rejected
/// as having lost to the opposite direction.
fn winner_take_all(winner: Vec<Signal>, loser: Vec<Signal>) -> Vec<AggregatorEvent> {
    let mut events = accept_all(winner);
    events.extend(reject_all(loser, RejectionReason::OppositeHigherTimeframe));
    events
}

/// Picks the single globally best signal across both sides by `metric` and
/// rejects everything else — same-side extras as replaced, opposite side as
/// having lost the conflict.
fn resolve_by_metric(buy: Vec<Signal>, sell: Vec<Signal>, metric: impl Fn(&Signal) -> Decimal) -> Vec<AggregatorEvent> {
    let mut scored: Vec<(Signal, Decimal)> = buy.into_iter().chain(sell).map(|s| { let m = metric(&s); (s, m) }).collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    let mut iter = scored.into_iter();
    let (winner, _) = iter.next().expect("at least one signal on each side");
    let winner_side = winner.action;

    let mut events = vec![AggregatorEvent::Accepted(winner)];
    for (signal, _) in iter {
        let reason = if signal.action == winner_side { RejectionReason::SameDirectionReplaced } else { RejectionReason::OppositeHigherTimeframe };
        events.push(AggregatorEvent::Rejected { signal, reason });
    }
    events
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use tradeengine_core::{OrderType, Strength, StrategyMode, TimeInForce, Timeframe};

    use super::*;

    fn signal(strategy_id: &str, action: Action, confidence: Decimal, timeframe: Timeframe, arrival_offset_ms: i64) -> Signal {
        Signal {
            strategy_id: strategy_id.to_string(),
            symbol: "BTCUSDT".to_string(),
            action,
            confidence,
            strength: Some(Strength::Moderate),
            timeframe,
            current_price: dec!(45000),
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Gtc,
            strategy_mode: StrategyMode::Deterministic,
            position_size_pct: None,
            stop_loss: None,
            take_profit: None,
            rationale: None,
            immediate: false,
            arrival_time: Utc::now() + Duration::milliseconds(arrival_offset_ms),
            meta: None,
        }
    }

    #[test]
    fn accumulate_keeps_every_same_direction_signal() {
        let config = AggregatorConfig { same_direction_conflict_resolution: SameDirectionConflictResolution::Accumulate, ..Default::default() };
        let signals = vec![signal("a", Action::Buy, dec!(0.9), Timeframe::H1, 0), signal("b", Action::Buy, dec!(0.8), Timeframe::H1, 10)];
        let events = finalize(signals, &config);
        assert_eq!(events.iter().filter(|e| matches!(e, AggregatorEvent::Accepted(_))).count(), 2);
    }

    #[test]
    fn replace_keeps_only_the_latest_arrival() {
        let config = AggregatorConfig { same_direction_conflict_resolution: SameDirectionConflictResolution::Replace, ..Default::default() };
        let signals = vec![signal("a", Action::Buy, dec!(0.9), Timeframe::H1, 0), signal("b", Action::Buy, dec!(0.8), Timeframe::H1, 10)];
        let events = finalize(signals, &config);
        let accepted: Vec<_> = events.iter().filter_map(|e| if let AggregatorEvent::Accepted(s) = e { Some(s) } else { None }).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].strategy_id, "b");
        assert_eq!(events.iter().filter(|e| matches!(e, AggregatorEvent::Rejected { reason: RejectionReason::SameDirectionReplaced, .. })).count(), 1);
    }

    #[test]
    fn reject_keeps_only_the_earliest_arrival() {
        let config = AggregatorConfig { same_direction_conflict_resolution: SameDirectionConflictResolution::Reject, ..Default::default() };
        let signals = vec![signal("a", Action::Buy, dec!(0.9), Timeframe::H1, 10), signal("b", Action::Buy, dec!(0.8), Timeframe::H1, 0)];
        let events = finalize(signals, &config);
        let accepted: Vec<_> = events.iter().filter_map(|e| if let AggregatorEvent::Accepted(s) = e { Some(s) } else { None }).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].strategy_id, "b");
    }

    #[test]
    fn timeframe_weighted_drops_below_quorum() {
        let config = AggregatorConfig { resolution_policy: ResolutionPolicy::TimeframeWeighted, quorum_threshold: dec!(0.5), ..Default::default() };
        let signals = vec![signal("a", Action::Buy, dec!(0.1), Timeframe::Tick, 0)];
        let events = finalize(signals, &config);
        assert!(matches!(events[0], AggregatorEvent::Rejected { reason: RejectionReason::BelowQuorum, .. }));
    }

    #[test]
    fn timeframe_weighted_conflict_picks_higher_net_score_side() {
        let config = AggregatorConfig { resolution_policy: ResolutionPolicy::TimeframeWeighted, quorum_threshold: dec!(0.05), ..Default::default() };
        let signals = vec![signal("a", Action::Buy, dec!(0.9), Timeframe::D1, 0), signal("b", Action::Sell, dec!(0.5), Timeframe::M5, 5)];
        let events = finalize(signals, &config);
        let accepted: Vec<_> = events.iter().filter_map(|e| if let AggregatorEvent::Accepted(s) = e { Some(s) } else { None }).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].action, Action::Buy);
        assert!(events.iter().any(|e| matches!(e, AggregatorEvent::Rejected { reason: RejectionReason::OppositeHigherTimeframe, .. })));
    }

    #[test]
    fn higher_timeframe_wins_breaks_tie_by_timeframe_weight() {
        let config = AggregatorConfig { resolution_policy: ResolutionPolicy::HigherTimeframeWins, ..Default::default() };
        let signals = vec![signal("a", Action::Buy, dec!(0.7), Timeframe::D1, 0), signal("b", Action::Sell, dec!(0.7), Timeframe::M5, 0)];
        let events = finalize(signals, &config);
        let accepted: Vec<_> = events.iter().filter_map(|e| if let AggregatorEvent::Accepted(s) = e { Some(s) } else { None }).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].strategy_id, "a");
    }

    #[test]
    fn strongest_wins_picks_single_best_scoring_signal() {
        let config = AggregatorConfig { resolution_policy: ResolutionPolicy::StrongestWins, ..Default::default() };
        let signals = vec![
            signal("a", Action::Buy, dec!(0.4), Timeframe::M1, 0),
            signal("b", Action::Sell, dec!(0.95), Timeframe::D1, 5),
            signal("c", Action::Buy, dec!(0.3), Timeframe::M1, 10),
        ];
        let events = finalize(signals, &config);
        let accepted: Vec<_> = events.iter().filter_map(|e| if let AggregatorEvent::Accepted(s) = e { Some(s) } else { None }).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].strategy_id, "b");
    }

    #[test]
    fn manual_review_drops_both_sides_and_surfaces_candidates() {
        let config = AggregatorConfig { resolution_policy: ResolutionPolicy::ManualReview, ..Default::default() };
        let signals = vec![signal("a", Action::Buy, dec!(0.9), Timeframe::H1, 0), signal("b", Action::Sell, dec!(0.9), Timeframe::H1, 0)];
        let events = finalize(signals, &config);
        assert!(events.iter().any(|e| matches!(e, AggregatorEvent::ManualReview { .. })));
        assert!(!events.iter().any(|e| matches!(e, AggregatorEvent::Accepted(_))));
    }
}
