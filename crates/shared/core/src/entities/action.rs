use serde::{Deserialize, Serialize};

use super::{PositionSide, Side};

/// The direction a signal asks the engine to take. Distinct from `Side`: a
/// `hold` action never reaches the exchange and has no order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn is_actionable(self) -> bool {
        !matches!(self, Action::Hold)
    }

    /// Order side implied by this action, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Action::Buy => Some(Side::Buy),
            Action::Sell => Some(Side::Sell),
            Action::Hold => None,
        }
    }

    /// Position side a fresh position opened by this action would carry.
    pub fn position_side(self) -> Option<PositionSide> {
        match self {
            Action::Buy => Some(PositionSide::Long),
            Action::Sell => Some(PositionSide::Short),
            Action::Hold => None,
        }
    }
}
