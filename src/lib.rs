//! `korri-tx` library: a periodic CAN frame transmitter for Linux SocketCAN.
//! A background scheduler sends one eight-byte frame per period, byte 0
//! carrying a wrapping sequence counter, until an interrupt or a send failure
//! stops the run. The crate exposes the frame model, the raw socket binding,
//! the scheduler, and the lifecycle controller tying them together.
//==================================================================================
/// Runtime configuration (interface name, period).
pub mod config;
/// Error types for binding, sending, timing and startup.
pub mod error;
/// Host plumbing: tokio wake source and diagnostic frame sink.
pub mod infra;
/// Transport, periodic production and lifecycle of a transmit run.
pub mod protocol;
/// Subscriber installation for the binary.
pub mod trace;
//==================================================================================
