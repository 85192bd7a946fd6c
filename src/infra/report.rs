//! Diagnostic sink receiving every frame that reached the bus.
use crate::protocol::transport::can_frame::CanFrame;

/// Reporting hook called after each successful send. Purely informational:
/// nothing it does feeds back into the transmit loop.
pub trait FrameSink {
    fn report(&mut self, frame: &CanFrame);
}

/// Logs each frame through `tracing` at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FrameSink for TracingSink {
    fn report(&mut self, frame: &CanFrame) {
        tracing::info!(target: "korri_tx::frames", "{frame}");
    }
}

impl<F> FrameSink for F
where
    F: FnMut(&CanFrame),
{
    fn report(&mut self, frame: &CanFrame) {
        self(frame)
    }
}
