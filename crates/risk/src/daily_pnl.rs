use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use log::info;

/// Tracks the realized-PnL gauge the dispatcher's risk check reads. Rolls
/// over at UTC midnight so yesterday's losses don't carry into today's
/// daily loss limit.
pub struct DailyPnlTracker {
    realized: Decimal,
    day_start: DateTime<Utc>,
}

impl DailyPnlTracker {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { realized: Decimal::ZERO, day_start: now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc() }
    }

    pub fn record(&mut self, pnl: Decimal, now: DateTime<Utc>) {
        self.roll_if_needed(now);
        self.realized += pnl;
        if pnl < Decimal::ZERO {
            info!("daily realized pnl now {}", self.realized);
        }
    }

    pub fn realized(&self, now: DateTime<Utc>) -> Decimal {
        if now.date_naive() != self.day_start.date_naive() {
            Decimal::ZERO
        } else {
            self.realized
        }
    }

    fn roll_if_needed(&mut self, now: DateTime<Utc>) {
        if now.date_naive() != self.day_start.date_naive() {
            self.realized = Decimal::ZERO;
            self.day_start = now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
        }
    }
}
