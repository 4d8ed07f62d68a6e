use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, time-bounded exclusive claim, persisted externally so multiple
/// engine instances serialise access to the same resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lock {
    pub name: String,
    pub holder_id: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Lock {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
