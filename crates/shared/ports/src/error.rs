use thiserror::Error;

/// Errors raised by port implementations (adapters, stores). Distinct from
/// each component crate's own domain error — this is the boundary-crossing
/// vocabulary shared by every port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("venue rejected the request and it must not be retried: {0}")]
    NonRetryable(String),

    #[error("venue call failed transiently: {0}")]
    Retryable(String),

    #[error("symbol not recognised: {0}")]
    UnknownSymbol(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("lock store unavailable: {0}")]
    LockStoreUnavailable(String),

    #[error("persistence store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("record not found: {0}")]
    NotFound(String),
}

pub type PortResult<T> = std::result::Result<T, PortError>;
