use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("no exchange position for {0:?}")]
    NoExchangePosition(String),

    #[error("no strategy position: {0}")]
    NoStrategyPosition(uuid::Uuid),

    #[error("reduce quantity {reduce} exceeds open quantity {open}")]
    OverReduction { reduce: String, open: String },
}

pub type Result<T> = std::result::Result<T, PositionError>;
