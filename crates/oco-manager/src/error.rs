use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum OcoError {
    #[error("failed to place {leg} order for {symbol}: {reason}")]
    PlacementFailed { leg: &'static str, symbol: String, reason: String },

    #[error("no active pair for strategy position {0}")]
    PairNotFound(uuid::Uuid),

    #[error("venue query failed: {0}")]
    VenueQueryFailed(String),
}

pub type Result<T> = std::result::Result<T, OcoError>;
