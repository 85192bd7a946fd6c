//! Abstraction traits used by the transport layer (CAN bus and tick source).
pub mod can_bus;
pub mod tick_source;
