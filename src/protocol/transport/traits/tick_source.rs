//! Periodic wake source abstraction driving the transmit scheduler.
use crate::error::TimerError;
use futures_util::Future;

/// Fixed-period wake source. Each completed wait is one tick.
pub trait TickSource {
    /// Wait for the next period boundary.
    ///
    /// Resolves with the number of whole periods that elapsed unobserved
    /// since the previous wake (0 when the caller kept up). Callers act once
    /// per wake whatever the backlog.
    fn next_tick(&mut self) -> impl Future<Output = Result<u64, TimerError>> + Send + '_;
}
