use std::time::Instant;

/// Port for monotonic time
///
/// This allows the system to use different time sources:
/// - Real monotonic time for production
/// - Manually advanced time for deterministic tests
pub trait Clock: Send + Sync {
    /// Get the current instant according to this clock
    fn now(&self) -> Instant;
}
