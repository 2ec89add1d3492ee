//! Linux SocketCAN transport and tokio timer backing the host binary.
use korri_kepler::protocol::transport::{
    can_frame::CanFrame,
    traits::{can_bus::CanBus, korri_timer::KorriTimer},
};
use socketcan::{CanSocket, Socket};
use std::{future::Future, io, time::Duration};
use tracing::trace;

/// How long a read may block before reporting an idle bus.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Raw CAN socket bound to one interface.
pub struct SocketCanBus {
    socket: CanSocket,
}

impl SocketCanBus {
    pub fn open(interface: &str) -> io::Result<Self> {
        let socket = CanSocket::open(interface)?;
        socket.set_read_timeout(READ_TIMEOUT)?;
        Ok(Self { socket })
    }

    fn read(&self) -> io::Result<Option<CanFrame>> {
        match tokio::task::block_in_place(|| self.socket.read_frame()) {
            Ok(frame) => {
                let frame = CanFrame::from_embedded(&frame);
                if frame.is_none() {
                    trace!("Skipping non-J1939 frame");
                }
                Ok(frame)
            }
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn write(&self, frame: &CanFrame) -> io::Result<()> {
        let frame: socketcan::CanFrame = frame
            .to_embedded()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid CAN frame"))?;
        self.socket.write_frame(&frame)
    }
}

impl CanBus for SocketCanBus {
    type Error = io::Error;

    fn send<'a>(
        &'a mut self,
        frame: &'a CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a {
        async move { self.write(frame) }
    }

    fn recv<'a>(&'a mut self) -> impl Future<Output = Result<Option<CanFrame>, Self::Error>> + 'a {
        async move { self.read() }
    }
}

//==================================================================================TIMER
/// [`KorriTimer`] backed by `tokio::time`.
pub struct TokioTimer;

impl KorriTimer for TokioTimer {
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl Future<Output = ()> + 'a {
        tokio::time::sleep(Duration::from_millis(u64::from(millis)))
    }
}
