use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("signal rejected: {0}")]
    SignalRejected(#[from] tradeengine_signal_aggregator::AggregatorError),

    #[error("engine is shutting down, not accepting new signals")]
    ShuttingDown,

    #[error("failed to load symbol info from the venue: {0}")]
    Bootstrap(#[from] tradeengine_dispatcher::DispatchError),

    #[error("failed to load persisted state for restart rebuild: {0}")]
    Restore(#[from] tradeengine_ports::PortError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
