//! In-memory representation of a classic CAN frame and its SocketCAN wire
//! encoding (`struct can_frame`, 16 bytes in host byte order).
use embedded_can::Id;

use crate::protocol::transport::{can_id::CanId, CAN_MAX_DLEN, CAN_MTU};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Classic CAN data frame as handed to the bus.
///
/// `len` never exceeds [`CAN_MAX_DLEN`] and bytes past `len` are always zero.
pub struct CanFrame {
    id: Id,
    data: [u8; CAN_MAX_DLEN],
    len: usize,
}

impl CanFrame {
    /// Builds a data frame; `None` when `payload` exceeds eight bytes.
    pub fn new(id: impl Into<Id>, payload: &[u8]) -> Option<Self> {
        if payload.len() > CAN_MAX_DLEN {
            return None;
        }
        let mut data = [0u8; CAN_MAX_DLEN];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            id: id.into(),
            data,
            len: payload.len(),
        })
    }

    /// Builds a full eight-byte data frame; cannot fail.
    pub fn from_payload(id: impl Into<Id>, data: [u8; CAN_MAX_DLEN]) -> Self {
        Self {
            id: id.into(),
            data,
            len: CAN_MAX_DLEN,
        }
    }

    /// Frame identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Data Length Code (0 to 8).
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` for zero-length frames.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Meaningful payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Full zero-padded payload buffer.
    pub fn padded_data(&self) -> &[u8; CAN_MAX_DLEN] {
        &self.data
    }

    /// Encodes the frame as the kernel's `struct can_frame`:
    /// `can_id` (4 bytes, native endian), `len`, three reserved zero bytes,
    /// then the eight payload bytes.
    pub fn to_wire(&self) -> [u8; CAN_MTU] {
        let mut wire = [0u8; CAN_MTU];
        wire[..4].copy_from_slice(&CanId::from_id(self.id).0.to_ne_bytes());
        wire[4] = self.len as u8;
        wire[8..].copy_from_slice(&self.data);
        wire
    }
}

impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        CanFrame::new(id, data)
    }

    // Remote frames are never produced by this transmitter.
    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        CanFrame::data(self)
    }
}

/// Diagnostic rendering: `ID = 0100 DLC = [08] - B0|00 B1|00 ...`.
impl core::fmt::Display for CanFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ID = {} DLC = [{:02x}] -", CanId::from_id(self.id), self.len)?;
        for (index, byte) in self.data().iter().enumerate() {
            write!(f, " B{}|{:02x}", index, byte)?;
        }
        Ok(())
    }
}
