use serde::{Deserialize, Serialize};

/// Hedge-mode position side. A symbol may carry a `Long` and a `Short`
/// position simultaneously; they are distinct entities and never netted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn opposite(self) -> PositionSide {
        match self {
            PositionSide::Long => PositionSide::Short,
            PositionSide::Short => PositionSide::Long,
        }
    }

    /// The order side that reduces a position on this side.
    pub fn reducing_side(self) -> super::Side {
        match self {
            PositionSide::Long => super::Side::Sell,
            PositionSide::Short => super::Side::Buy,
        }
    }
}
