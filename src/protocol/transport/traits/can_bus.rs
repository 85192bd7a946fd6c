//! Minimal abstraction for a transmit-only CAN bus. Allows the scheduler to
//! drive the raw SocketCAN binding in production and an in-memory bus in tests.
use crate::protocol::transport::can_frame::CanFrame;
use futures_util::Future;

/// Contract to emit CAN frames and release the underlying resource.
pub trait CanBus {
    type Error: core::fmt::Debug + core::fmt::Display;
    /// Emit a frame on the bus. Implementations must not wait for buffer
    /// space: a frame the transport cannot take right away is an error.
    fn send<'a>(
        &'a mut self,
        frame: &'a CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
    /// Release the transport. Calling it again is a no-op.
    fn close(&mut self);
}
