//! Read/write capability pair the dispatcher is written against. Backed by
//! an embedded CAN peripheral, a SocketCAN socket or an in-memory test bus.
use crate::protocol::transport::can_frame::CanFrame;
use futures_util::Future;

/// Frame transport seen by the Kepler node.
pub trait CanBus {
    /// Driver failure; ends the dispatcher loop.
    type Error: core::fmt::Debug;
    /// Put `frame` on the bus.
    fn send<'a>(
        &'a mut self,
        frame: &'a CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
    /// Next received frame.
    ///
    /// Blocking drivers wait until data arrives; polling drivers return
    /// `Ok(None)` when nothing is pending and let the caller back off.
    fn recv<'a>(&'a mut self) -> impl Future<Output = Result<Option<CanFrame>, Self::Error>> + 'a;
}
