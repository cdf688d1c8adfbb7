//! Environment abstraction for deterministic testing.
//!
//! Decouples session logic from wall-clock time. Production uses the system
//! clock and tokio timers; tests drive a manual clock so keepalive behaviour
//! can be checked without waiting two minutes.

use std::time::Duration;

/// Abstract environment providing time and the timer primitive.
///
/// # Invariants
///
/// - `now()` never goes backwards within one execution context
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment.
    ///
    /// Production uses `std::time::Instant`; tests may use anything that
    /// subtracts to a [`Duration`].
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only the runtime's timer uses this. Session logic takes time as a
    /// parameter instead.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
