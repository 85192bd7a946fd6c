//! Transmit engine: CAN transport, periodic frame production, and run
//! lifecycle.
pub mod lifecycle;
pub mod periodic;
pub mod transport;
