use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("signal is malformed: missing or out-of-range required field")]
    MalformedSignal,
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
