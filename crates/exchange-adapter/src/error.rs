use thiserror::Error;

/// Venue-facing error taxonomy. `is_retryable()` drives the backoff loop:
/// non-retryable errors are surfaced to the caller immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("unknown symbol: {0}")]
    InvalidSymbol(String),

    #[error("invalid quantity for {symbol}: {quantity}")]
    InvalidQuantity { symbol: String, quantity: String },

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("invalid API key")]
    InvalidKey,

    #[error("permission denied")]
    PermissionDenied,

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("venue server error: {0}")]
    ServerError(String),
}

impl ExchangeError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExchangeError::Network(_) | ExchangeError::ServerError(_))
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
