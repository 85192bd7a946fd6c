//! Transport layer: classic CAN frame representation, SocketCAN identifier
//! words, the raw socket binding, and the bus/tick abstraction traits.
//!
//! ## SocketCAN constants
//!
//! Mirrors of `<linux/can.h>` kept here so the frame model stays usable on
//! hosts where the raw socket binding is not compiled.

pub mod can_frame;
pub mod can_id;
#[cfg(target_os = "linux")]
pub mod socketcan;
pub mod traits;

/// Maximum payload of a classic CAN frame.
pub const CAN_MAX_DLEN: usize = 8;

/// Size of `struct can_frame` on the wire.
pub const CAN_MTU: usize = 16;

/// Extended frame format flag (29-bit identifier).
pub const CAN_EFF_FLAG: u32 = 0x8000_0000;
/// Remote transmission request flag.
pub const CAN_RTR_FLAG: u32 = 0x4000_0000;
/// Error message frame flag.
pub const CAN_ERR_FLAG: u32 = 0x2000_0000;
/// Standard frame identifier mask.
pub const CAN_SFF_MASK: u32 = 0x0000_07FF;
/// Extended frame identifier mask.
pub const CAN_EFF_MASK: u32 = 0x1FFF_FFFF;

/// Interface used when none is supplied.
pub const DEFAULT_INTERFACE: &str = "vcan0";
