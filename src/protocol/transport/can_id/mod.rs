//! Conversion between `embedded_can::Id` and the 32-bit `can_id` word used by
//! the Linux SocketCAN `struct can_frame` (identifier plus EFF/RTR/ERR flags).
use embedded_can::{ExtendedId, Id, StandardId};

use crate::protocol::transport::{
    CAN_EFF_FLAG, CAN_EFF_MASK, CAN_ERR_FLAG, CAN_RTR_FLAG, CAN_SFF_MASK,
};

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Raw SocketCAN identifier word as it appears in bytes 0..4 of the wire frame.
pub struct CanId(pub u32);

impl CanId {
    /// Encodes a standard (11-bit) or extended (29-bit) identifier.
    /// Extended identifiers carry `CAN_EFF_FLAG`.
    pub fn from_id(id: Id) -> Self {
        match id {
            Id::Standard(sid) => Self(u32::from(sid.as_raw())),
            Id::Extended(eid) => Self(eid.as_raw() | CAN_EFF_FLAG),
        }
    }

    /// Decodes the identifier part, ignoring the RTR/ERR flags.
    pub fn id(&self) -> Id {
        if self.is_extended() {
            // Masked to 29 bits, always in range.
            Id::Extended(ExtendedId::new(self.0 & CAN_EFF_MASK).unwrap_or(ExtendedId::ZERO))
        } else {
            Id::Standard(StandardId::new((self.0 & CAN_SFF_MASK) as u16).unwrap_or(StandardId::ZERO))
        }
    }

    /// Identifier value without any flag bit.
    pub fn raw_id(&self) -> u32 {
        if self.is_extended() {
            self.0 & CAN_EFF_MASK
        } else {
            self.0 & CAN_SFF_MASK
        }
    }

    /// `true` for 29-bit identifiers.
    pub fn is_extended(&self) -> bool {
        self.0 & CAN_EFF_FLAG != 0
    }

    /// `true` when the remote transmission request bit is set.
    pub fn is_remote(&self) -> bool {
        self.0 & CAN_RTR_FLAG != 0
    }

    /// `true` when the word describes a bus error frame.
    pub fn is_error(&self) -> bool {
        self.0 & CAN_ERR_FLAG != 0
    }
}

impl From<Id> for CanId {
    fn from(id: Id) -> Self {
        Self::from_id(id)
    }
}

impl core::fmt::Display for CanId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_extended() {
            write!(f, "{:08x}", self.raw_id())
        } else {
            write!(f, "{:04x}", self.raw_id())
        }
    }
}
