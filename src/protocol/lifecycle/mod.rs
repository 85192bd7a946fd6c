//! Startup and shutdown sequencing for a transmit run.
//!
//! The controller is the single authority on whether the run continues:
//! it opens the transport, arms the wake source, starts the scheduler, and on
//! the way out joins the scheduler before closing the transport.
use core::fmt::{Debug, Display};
use std::time::Duration;

use futures_util::{
    future::{select, Either},
    pin_mut,
};

use crate::error::{InitError, TickError, TimerError};
use crate::infra::report::FrameSink;
use crate::protocol::periodic::{
    run_state::{RunControl, RunState, StopReason},
    scheduler::TickScheduler,
};
use crate::protocol::transport::traits::{can_bus::CanBus, tick_source::TickSource};
#[cfg(target_os = "linux")]
use crate::{
    config::TxConfig,
    error::TransportError,
    infra::{report::TracingSink, timer::IntervalTicks},
    protocol::transport::socketcan::SocketCanBus,
};

/// Foreground re-check interval while idling.
pub const IDLE_POLL: Duration = Duration::from_secs(1);

/// Summary produced by the first [`LifecycleController::shutdown`] call.
#[derive(Debug)]
pub struct ShutdownReport<E: Debug + Display> {
    /// Run state once everything was released.
    pub final_state: RunState,
    /// Frames the scheduler got onto the bus.
    pub frames_sent: u64,
    /// Periods skipped because the loop fell behind.
    pub missed_ticks: u64,
    /// Failure that ended the run, if any.
    pub fault: Option<TickError<E>>,
}

/// Owner of a transmit run.
pub struct LifecycleController<C: CanBus> {
    run: RunControl,
    scheduler: Option<TickScheduler<C>>,
    shut_down: bool,
}

#[cfg(target_os = "linux")]
impl LifecycleController<SocketCanBus> {
    /// Bind the SocketCAN interface from `config` and start transmitting.
    ///
    /// Must run inside a tokio runtime with the time driver enabled.
    pub fn initialize(config: &TxConfig) -> Result<Self, InitError<TransportError>> {
        Self::initialize_with(
            || SocketCanBus::open(&config.interface),
            || IntervalTicks::arm(config.period),
            TracingSink,
        )
    }
}

impl<C> LifecycleController<C>
where
    C: CanBus + Send + 'static,
    C::Error: Send + 'static,
{
    /// Generic startup: `open` the transport, `arm` the wake source, start
    /// the scheduler.
    ///
    /// When arming fails the freshly opened transport is closed before the
    /// error is returned; no scheduler is ever left without a bus.
    pub fn initialize_with<O, A, T, R>(open: O, arm: A, sink: R) -> Result<Self, InitError<C::Error>>
    where
        O: FnOnce() -> Result<C, C::Error>,
        A: FnOnce() -> Result<T, TimerError>,
        T: TickSource + Send + 'static,
        R: FrameSink + Send + 'static,
    {
        let mut bus = open().map_err(|err| {
            tracing::error!(%err, "CAN init failed: cannot open transport");
            InitError::Transport(err)
        })?;

        let ticks = match arm() {
            Ok(ticks) => ticks,
            Err(err) => {
                tracing::error!(%err, "CAN init failed: cannot arm timer");
                bus.close();
                return Err(InitError::Timer(err));
            }
        };

        let run = RunControl::new();
        let scheduler = TickScheduler::start(bus, ticks, sink, run.clone());
        tracing::info!("CAN init success");

        Ok(Self {
            run,
            scheduler: Some(scheduler),
            shut_down: false,
        })
    }
}

impl<C: CanBus> LifecycleController<C> {
    /// Handle for collaborators that only need to request a stop
    /// (signal handler, supervisors).
    pub fn run_control(&self) -> RunControl {
        self.run.clone()
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.run.state()
    }

    /// Idempotent stop request; `false` if the run was already stopping.
    pub fn request_stop(&self, reason: StopReason) -> bool {
        self.run.request_stop(reason)
    }

    /// `true` once [`LifecycleController::shutdown`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Foreground idle loop: sleep in [`IDLE_POLL`] slices until the run
    /// leaves `Running`, then return the state that ended it.
    pub async fn wait(&self) -> RunState {
        loop {
            let idle = tokio::time::sleep(IDLE_POLL);
            let stopped = self.run.stopped();
            pin_mut!(idle);
            pin_mut!(stopped);

            match select(idle, stopped).await {
                Either::Left(_) => tracing::trace!("foreground idle"),
                Either::Right((state, _)) => return state,
            }
        }
    }

    /// Stop the scheduler (join), then close the transport.
    ///
    /// Only the first call does anything and returns the report; later calls
    /// return `None`. The transport is closed exactly once.
    pub async fn shutdown(&mut self) -> Option<ShutdownReport<C::Error>> {
        if self.shut_down {
            return None;
        }
        self.shut_down = true;
        self.run.request_stop(StopReason::Requested);

        let mut report = ShutdownReport {
            final_state: self.run.state(),
            frames_sent: 0,
            missed_ticks: 0,
            fault: None,
        };

        if let Some(scheduler) = self.scheduler.take() {
            match scheduler.stop().await {
                Ok(exit) => {
                    let mut bus = exit.bus;
                    bus.close();
                    report.frames_sent = exit.frames_sent;
                    report.missed_ticks = exit.missed_ticks;
                    report.fault = exit.fault;
                }
                // The bus was dropped with the task.
                Err(err) => report.fault = Some(err),
            }
        }

        report.final_state = self.run.state();
        match report.final_state {
            RunState::StoppingFaulted => tracing::warn!(
                frames_sent = report.frames_sent,
                fault = ?report.fault,
                "transmitter shut down after a fault"
            ),
            _ => tracing::info!(frames_sent = report.frames_sent, "transmitter shut down"),
        }
        Some(report)
    }
}
