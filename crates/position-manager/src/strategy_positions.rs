use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tradeengine_core::{CloseReason, ExchangePositionKey, PositionSide, StrategyPosition, StrategyPositionId, StrategyPositionStatus};
use tradeengine_ports::PositionContribution;

use crate::error::{PositionError, Result};

/// Owns the `strategy_position_id -> StrategyPosition` map and the reverse
/// index `exchange_position_key -> [strategy_position_id]` that lets the
/// OCO manager and the exchange position close flow find every strategy
/// sharing an exchange position.
#[derive(Default)]
pub struct StrategyPositionTracker {
    positions: DashMap<StrategyPositionId, StrategyPosition>,
    by_exchange_key: DashMap<ExchangePositionKey, Vec<StrategyPositionId>>,
    sequence: AtomicU64,
}

impl StrategyPositionTracker {
    pub fn new() -> Self {
        Self { positions: DashMap::new(), by_exchange_key: DashMap::new(), sequence: AtomicU64::new(0) }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &self,
        strategy_id: impl Into<String>,
        symbol: impl Into<String>,
        position_side: PositionSide,
        entry_price: Decimal,
        entry_quantity: Decimal,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> (StrategyPosition, PositionContribution) {
        let position = StrategyPosition::new(strategy_id, symbol, position_side, entry_price, entry_quantity, stop_loss, take_profit, now);
        let key = position.exchange_position_key();
        self.by_exchange_key.entry(key.clone()).or_default().push(position.strategy_position_id);

        let contribution = PositionContribution {
            strategy_position_id: position.strategy_position_id,
            symbol: key.0,
            sequence_number: self.sequence.fetch_add(1, Ordering::SeqCst),
            qty_delta: entry_quantity,
            price: entry_price,
            time: now,
            contribution_pnl_at_close: None,
        };

        self.positions.insert(position.strategy_position_id, position.clone());
        (position, contribution)
    }

    /// Closes exactly the given strategy position. Other strategies sharing
    /// its exchange key are untouched.
    pub fn close(
        &self,
        strategy_position_id: StrategyPositionId,
        exit_price: Decimal,
        reason: CloseReason,
        commission: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(StrategyPosition, PositionContribution)> {
        let mut entry = self
            .positions
            .get_mut(&strategy_position_id)
            .ok_or(PositionError::NoStrategyPosition(strategy_position_id))?;

        let pnl = entry.close(exit_price, reason, commission, now);
        let closed = entry.clone();
        drop(entry);

        self.by_exchange_key.alter(&closed.exchange_position_key(), |_, mut ids| {
            ids.retain(|id| *id != strategy_position_id);
            ids
        });

        let contribution = PositionContribution {
            strategy_position_id,
            symbol: closed.symbol.clone(),
            sequence_number: self.sequence.fetch_add(1, Ordering::SeqCst),
            qty_delta: -closed.entry_quantity,
            price: exit_price,
            time: now,
            contribution_pnl_at_close: Some(pnl),
        };

        Ok((closed, contribution))
    }

    pub fn get(&self, strategy_position_id: StrategyPositionId) -> Option<StrategyPosition> {
        self.positions.get(&strategy_position_id).map(|e| e.clone())
    }

    pub fn by_exchange_key(&self, key: &ExchangePositionKey) -> Vec<StrategyPosition> {
        self.by_exchange_key
            .get(key)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    pub fn open_by_exchange_key(&self, key: &ExchangePositionKey) -> Vec<StrategyPosition> {
        self.by_exchange_key(key).into_iter().filter(|p| p.is_open()).collect()
    }

    pub fn by_strategy(&self, strategy_id: &str) -> Vec<StrategyPosition> {
        self.positions.iter().filter(|e| e.strategy_id == strategy_id).map(|e| e.value().clone()).collect()
    }

    pub fn has_open_positions(&self, key: &ExchangePositionKey) -> bool {
        self.open_by_exchange_key(key).iter().any(|p| p.status == StrategyPositionStatus::Open)
    }

    /// Repopulates the map and its reverse index from persisted state on
    /// process restart. Positions are inserted as-is, carrying their own
    /// `strategy_position_id` rather than minting new ones via `open`.
    pub fn rebuild_from_persisted(&self, positions: Vec<StrategyPosition>) {
        for position in positions {
            let key = position.exchange_position_key();
            self.by_exchange_key.entry(key).or_default().push(position.strategy_position_id);
            self.positions.insert(position.strategy_position_id, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn two_strategies_share_an_exchange_key_independently() {
        let tracker = StrategyPositionTracker::new();
        let (a, _) = tracker.open("mom_v1", "BTCUSDT", PositionSide::Long, Decimal::new(45000, 0), Decimal::new(1, 3), None, None, now());
        let (b, _) = tracker.open("mom_v2", "BTCUSDT", PositionSide::Long, Decimal::new(46000, 0), Decimal::new(2, 3), None, None, now());

        let key = a.exchange_position_key();
        assert_eq!(tracker.open_by_exchange_key(&key).len(), 2);

        let (closed, _) = tracker.close(a.strategy_position_id, Decimal::new(48000, 0), CloseReason::TakeProfit, Decimal::ZERO, now()).unwrap();
        assert_eq!(closed.realized_pnl, Some(Decimal::new(3, 0)));

        // closing a does not touch b
        let remaining = tracker.open_by_exchange_key(&key);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].strategy_position_id, b.strategy_position_id);
    }

    #[test]
    fn pnl_uses_own_entry_price_not_shared_average() {
        let tracker = StrategyPositionTracker::new();
        let (a, _) = tracker.open("mom_v1", "BTCUSDT", PositionSide::Long, Decimal::new(45000, 0), Decimal::new(1, 3), None, None, now());

        let (closed, _) = tracker.close(a.strategy_position_id, Decimal::new(48000, 0), CloseReason::TakeProfit, Decimal::ZERO, now()).unwrap();
        // (48000 - 45000) * 0.001 = 3.0, computed from a's own 45000 entry
        assert_eq!(closed.realized_pnl, Some(Decimal::new(3, 0)));
    }

    #[test]
    fn rebuild_from_persisted_restores_the_reverse_index() {
        let original = StrategyPositionTracker::new();
        let (a, _) = original.open("mom_v1", "BTCUSDT", PositionSide::Long, Decimal::new(45000, 0), Decimal::new(1, 3), None, None, now());
        let persisted = vec![original.get(a.strategy_position_id).unwrap()];

        let restarted = StrategyPositionTracker::new();
        restarted.rebuild_from_persisted(persisted);

        let key = a.exchange_position_key();
        let restored = restarted.open_by_exchange_key(&key);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].strategy_position_id, a.strategy_position_id);
    }
}
