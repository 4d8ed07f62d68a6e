use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    #[error("lock {name} not acquired within {timeout_secs}s")]
    LockTimeout { name: String, timeout_secs: u64 },

    #[error("venue call failed: {0}")]
    VenueFailed(String),

    #[error("symbol not tradable: {0}")]
    SymbolNotTradable(String),

    #[error("hedge mode configured as {configured} but the venue reports {venue}")]
    HedgeModeMismatch { configured: bool, venue: bool },
}

pub type Result<T> = std::result::Result<T, DispatchError>;
