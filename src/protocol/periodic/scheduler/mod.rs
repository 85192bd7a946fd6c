//! Background transmit loop: one tokio task owning the bus, the wake source
//! and the frame assembler.
//!
//! Each wake reads the [`RunState`], assembles one frame, sends it and hands
//! it to the diagnostic sink. A send or wake-source failure flips the run to
//! [`RunState::StoppingFaulted`] and ends the loop in the same tick.
//! [`TickScheduler::stop`] joins the task and returns the bus, so the caller
//! can only close the transport once no further send is possible.
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures_util::{
    future::{select, Either},
    pin_mut,
};
use tokio::task::JoinHandle;

use crate::error::TickError;
use crate::infra::report::FrameSink;
use crate::protocol::periodic::{
    assembler::FrameAssembler,
    run_state::{RunControl, RunState, StopReason},
};
use crate::protocol::transport::traits::{can_bus::CanBus, tick_source::TickSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
/// Scheduler lifecycle: `Idle → Armed → Ticking → Stopped`.
pub enum SchedulerState {
    Idle = 0,
    Armed = 1,
    Ticking = 2,
    Stopped = 3,
}

impl SchedulerState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => SchedulerState::Idle,
            1 => SchedulerState::Armed,
            2 => SchedulerState::Ticking,
            _ => SchedulerState::Stopped,
        }
    }
}

#[derive(Debug, Default)]
struct StateCell(AtomicU8);

impl StateCell {
    fn get(&self) -> SchedulerState {
        SchedulerState::from_raw(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: SchedulerState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// What the transmit task hands back when it ends.
#[derive(Debug)]
pub struct SchedulerExit<C: CanBus> {
    /// The bus, still open. Closing it is the caller's job.
    pub bus: C,
    /// Frames accepted by the bus.
    pub frames_sent: u64,
    /// Periods the wake source reported as skipped.
    pub missed_ticks: u64,
    /// Failure that ended the loop, `None` for a requested stop.
    pub fault: Option<TickError<C::Error>>,
}

/// Handle on the running transmit task.
pub struct TickScheduler<C: CanBus> {
    run: RunControl,
    state: Arc<StateCell>,
    task: Option<JoinHandle<SchedulerExit<C>>>,
}

impl<C> TickScheduler<C>
where
    C: CanBus + Send + 'static,
    C::Error: Send + 'static,
{
    /// Spawn the transmit task on the current tokio runtime.
    ///
    /// `ticks` must already be armed; the sequence counter starts at 0.
    pub fn start<T, R>(bus: C, ticks: T, sink: R, run: RunControl) -> Self
    where
        T: TickSource + Send + 'static,
        R: FrameSink + Send + 'static,
    {
        Self::start_with_assembler(bus, ticks, FrameAssembler::new(), sink, run)
    }

    /// Same as [`TickScheduler::start`] with a caller-provided assembler.
    pub fn start_with_assembler<T, R>(
        bus: C,
        ticks: T,
        assembler: FrameAssembler,
        sink: R,
        run: RunControl,
    ) -> Self
    where
        T: TickSource + Send + 'static,
        R: FrameSink + Send + 'static,
    {
        let state = Arc::new(StateCell::default());
        state.set(SchedulerState::Armed);

        let task = tokio::spawn(tick_loop(
            bus,
            ticks,
            assembler,
            sink,
            run.clone(),
            state.clone(),
        ));

        Self {
            run,
            state,
            task: Some(task),
        }
    }
}

impl<C: CanBus> TickScheduler<C> {
    /// Current scheduler state.
    pub fn state(&self) -> SchedulerState {
        self.state.get()
    }

    /// `true` once the transmit task has returned.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Ask the loop to end and wait until it has.
    ///
    /// Once this returns the task is gone: no send can follow, and the bus
    /// comes back in the [`SchedulerExit`].
    pub async fn stop(mut self) -> Result<SchedulerExit<C>, TickError<C::Error>> {
        self.run.request_stop(StopReason::Requested);

        let Some(task) = self.task.take() else {
            return Err(TickError::TaskAborted);
        };
        match task.await {
            Ok(exit) => Ok(exit),
            Err(err) => {
                tracing::error!(%err, "transmit task ended abnormally");
                self.state.set(SchedulerState::Stopped);
                Err(TickError::TaskAborted)
            }
        }
    }
}

impl<C: CanBus> Drop for TickScheduler<C> {
    fn drop(&mut self) {
        // Dropped without `stop()`: let the loop wind down on its own.
        if self.task.is_some() {
            self.run.request_stop(StopReason::Requested);
        }
    }
}

async fn tick_loop<C, T, R>(
    mut bus: C,
    mut ticks: T,
    mut assembler: FrameAssembler,
    mut sink: R,
    run: RunControl,
    state: Arc<StateCell>,
) -> SchedulerExit<C>
where
    C: CanBus,
    T: TickSource,
    R: FrameSink,
{
    let mut frames_sent = 0u64;
    let mut missed_ticks = 0u64;
    state.set(SchedulerState::Ticking);
    tracing::debug!("transmit loop started");

    let fault = loop {
        let wake = {
            let tick = ticks.next_tick();
            let stop = run.stopped();
            pin_mut!(tick);
            pin_mut!(stop);

            match select(tick, stop).await {
                Either::Left((result, _)) => Some(result),
                Either::Right(_) => None,
            }
        };

        let missed = match wake {
            None => break None,
            Some(Err(err)) => {
                tracing::error!(%err, "periodic timer failed");
                run.request_stop(StopReason::Faulted);
                break Some(TickError::Timer(err));
            }
            Some(Ok(missed)) => missed,
        };

        if missed > 0 {
            missed_ticks += missed;
            tracing::warn!(missed, "transmit loop fell behind, skipping missed periods");
        }

        // A stop published before this wake wins over the tick.
        if run.state() != RunState::Running {
            break None;
        }

        let frame = assembler.next_frame();
        if let Err(err) = bus.send(&frame).await {
            tracing::error!(%err, "frame send failed, stopping");
            run.request_stop(StopReason::Faulted);
            break Some(TickError::Send(err));
        }
        frames_sent += 1;
        tracing::trace!(sequence = frame.data()[0], "frame sent");
        sink.report(&frame);
    };

    state.set(SchedulerState::Stopped);
    tracing::debug!(frames_sent, "transmit loop stopped");
    SchedulerExit {
        bus,
        frames_sent,
        missed_ticks,
        fault,
    }
}
