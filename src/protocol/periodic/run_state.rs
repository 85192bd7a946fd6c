//! Process-wide lifecycle flag shared by the foreground task and the
//! transmit scheduler.
//!
//! The state lives in an `AtomicU8`: stop requests publish with `Release`,
//! readers observe with `Acquire`. The first transition out of
//! [`RunState::Running`] wins; it is never reversed.
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures_util::pin_mut;
use tokio::sync::Notify;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
/// Lifecycle of a transmit run.
pub enum RunState {
    /// Frames are being produced.
    Running = 0,
    /// Stop asked from outside (operator interrupt, caller).
    StoppingRequested = 1,
    /// Stop forced by a transmit or timer failure.
    StoppingFaulted = 2,
}

impl RunState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => RunState::Running,
            1 => RunState::StoppingRequested,
            _ => RunState::StoppingFaulted,
        }
    }

    /// `true` only for [`RunState::Running`].
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Why a stop is requested.
pub enum StopReason {
    /// External request, e.g. ctrl-c.
    Requested,
    /// Internal failure.
    Faulted,
}

impl From<StopReason> for RunState {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Requested => RunState::StoppingRequested,
            StopReason::Faulted => RunState::StoppingFaulted,
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: AtomicU8,
    changed: Notify,
}

/// Cloneable handle on the shared [`RunState`].
#[derive(Clone, Debug)]
pub struct RunControl {
    shared: Arc<Shared>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    /// New handle in the `Running` state.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: AtomicU8::new(RunState::Running as u8),
                changed: Notify::new(),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        RunState::from_raw(self.shared.state.load(Ordering::Acquire))
    }

    /// Shorthand for `state().is_running()`.
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Leave `Running` for the state matching `reason`.
    ///
    /// Returns `true` when this call performed the transition, `false` when
    /// the run was already stopping (the earlier reason is kept).
    pub fn request_stop(&self, reason: StopReason) -> bool {
        let target = RunState::from(reason) as u8;
        let won = self
            .shared
            .state
            .compare_exchange(
                RunState::Running as u8,
                target,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won {
            self.shared.changed.notify_waiters();
        }
        won
    }

    /// Resolve once the state has left `Running`, with the final state.
    pub async fn stopped(&self) -> RunState {
        loop {
            let notified = self.shared.changed.notified();
            pin_mut!(notified);
            // Register before checking so a concurrent request cannot slip
            // between the load and the await.
            notified.as_mut().enable();

            let state = self.state();
            if !state.is_running() {
                return state;
            }
            notified.await;
        }
    }
}
