//! Builds the periodic frame: fixed identifier, eight bytes, byte 0 carries a
//! wrapping 8-bit sequence counter.
use embedded_can::StandardId;

use crate::protocol::transport::{can_frame::CanFrame, CAN_MAX_DLEN};

/// Identifier of every transmitted frame.
pub const TX_FRAME_ID: u16 = 0x100;

/// Owner of the sequence counter. One assembler per stream, never shared.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    sequence: u8,
}

impl FrameAssembler {
    /// Counter starting at 0.
    pub const fn new() -> Self {
        Self { sequence: 0 }
    }

    /// Counter starting at `sequence`.
    pub const fn starting_at(sequence: u8) -> Self {
        Self { sequence }
    }

    /// Value byte 0 of the next frame will carry.
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Produce the next frame and advance the counter (0xFF wraps to 0x00).
    pub fn next_frame(&mut self) -> CanFrame {
        let mut payload = [0u8; CAN_MAX_DLEN];
        payload[0] = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        // 0x100 fits in 11 bits.
        let id = StandardId::new(TX_FRAME_ID).unwrap_or(StandardId::ZERO);
        CanFrame::from_payload(id, payload)
    }
}

impl Iterator for FrameAssembler {
    type Item = CanFrame;

    fn next(&mut self) -> Option<CanFrame> {
        Some(self.next_frame())
    }
}
