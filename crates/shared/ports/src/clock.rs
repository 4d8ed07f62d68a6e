use tradeengine_core::Timestamp;

/// Port for time abstraction
///
/// Allows the system to use different time sources: real system time for
/// production, fixed/stepped time for deterministic tests.
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
