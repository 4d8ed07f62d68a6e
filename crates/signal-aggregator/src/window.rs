use chrono::{DateTime, Utc};
use tradeengine_core::Signal;

pub struct Window {
    pub signals: Vec<Signal>,
    pub deadline: DateTime<Utc>,
}
