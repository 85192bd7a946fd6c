//! Tokio-backed [`TickSource`]: a fixed-period interval that skips missed
//! deadlines instead of bursting to catch up.
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::error::TimerError;
use crate::protocol::transport::traits::tick_source::TickSource;

/// Armed periodic wake source.
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
    period: Duration,
}

impl IntervalTicks {
    /// Arm a wake source whose first tick lands one `period` from now.
    ///
    /// Must be called from within a tokio runtime with the time driver
    /// enabled. Fails with [`TimerError::TimerUnavailable`] for a zero period,
    /// when no runtime is reachable, or when the runtime was built without
    /// `enable_time()`.
    pub fn arm(period: Duration) -> Result<Self, TimerError> {
        if period.is_zero() {
            return Err(TimerError::TimerUnavailable {
                reason: "period must be non-zero",
            });
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(TimerError::TimerUnavailable {
                reason: "no tokio runtime to drive the timer",
            });
        }

        // tokio panics instead of reporting a disabled time driver.
        let mut interval = catch_unwind(AssertUnwindSafe(|| {
            interval_at(Instant::now() + period, period)
        }))
        .map_err(|_| TimerError::TimerUnavailable {
            reason: "tokio time driver disabled",
        })?;
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!(period_ms = period.as_millis() as u64, "periodic timer armed");
        Ok(Self { interval, period })
    }

    /// Configured period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> Result<u64, TimerError> {
        let deadline = self.interval.tick().await;
        let late = Instant::now().saturating_duration_since(deadline);
        Ok((late.as_nanos() / self.period.as_nanos()) as u64)
    }
}
