//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (socket binding, frame
//! transmission, periodic wake source, startup sequencing). All of them are
//! terminal for a run: nothing here is retried.
use std::io;
use thiserror::Error;

//==================================================================================TRANSPORT_ERROR
#[derive(Error, Debug)]
/// Failures of the raw SocketCAN binding.
pub enum TransportError {
    /// The interface name does not resolve to an interface index.
    #[error("Interface {name:?} not found: does the interface exist?")]
    InterfaceNotFound { name: String },
    /// The kernel refused to create a `PF_CAN` raw socket.
    #[error("Cannot create CAN raw socket: {0}")]
    SocketCreateFailed(#[source] io::Error),
    /// The socket could not be bound to the resolved interface.
    #[error("Unable to bind socket to {name:?}: {source}")]
    BindFailed {
        name: String,
        #[source]
        source: io::Error,
    },
    /// The frame was not accepted in full without blocking.
    #[error("Problem writing frame ({written}/{expected} bytes): is the CAN interface up? {source}")]
    SendFailed {
        written: usize,
        expected: usize,
        #[source]
        source: io::Error,
    },
}

//==================================================================================TIMER_ERROR
#[derive(Error, Debug)]
/// Failures of the periodic wake source.
pub enum TimerError {
    /// The wake source could not be created or armed.
    #[error("Periodic timer unavailable: {reason}")]
    TimerUnavailable { reason: &'static str },
    /// The wake source stopped delivering ticks.
    #[error("Periodic timer stalled")]
    Stalled,
}

//==================================================================================TICK_ERROR
#[derive(Error, Debug)]
/// Reason the transmit scheduler stopped on its own.
pub enum TickError<E: core::fmt::Debug + core::fmt::Display> {
    /// The bus rejected a frame.
    #[error("CAN bus send error: {0}")]
    Send(E),
    /// The wake source failed while waiting.
    #[error(transparent)]
    Timer(#[from] TimerError),
    /// The scheduler task ended without handing the bus back.
    #[error("Scheduler task aborted")]
    TaskAborted,
}

//==================================================================================INIT_ERROR
#[derive(Error, Debug)]
/// Startup sequencing failure (`open` then `start`).
pub enum InitError<E: core::fmt::Debug + core::fmt::Display> {
    /// Opening the transport failed.
    #[error("CAN init failed: transport: {0}")]
    Transport(E),
    /// Arming the periodic wake source failed.
    #[error("CAN init failed: {0}")]
    Timer(#[from] TimerError),
}
