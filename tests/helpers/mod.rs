//! Test doubles to simulate the CAN bus and timer during integration tests.
use korri_kepler::protocol::transport::{
    can_frame::CanFrame,
    can_id::CanId,
    traits::{can_bus::CanBus, korri_timer::KorriTimer},
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{mpsc, Mutex};

/// Source address used by the simulated client node.
#[allow(dead_code)]
pub const CLIENT_ADDRESS: u8 = 120;

#[derive(Clone)]
#[allow(dead_code)]
/// In-memory CAN bus reproducing the `CanBus` trait behavior.
pub struct MockCanBus {
    tx: mpsc::UnboundedSender<CanFrame>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<CanFrame>>>,
}

#[allow(dead_code)]
impl MockCanBus {
    /// Construct a pair of interconnected buses (server ↔ client).
    pub fn create_pair() -> (Self, Self) {
        let (server_tx, client_rx) = mpsc::unbounded_channel();
        let (client_tx, server_rx) = mpsc::unbounded_channel();

        let server_bus = Self {
            tx: server_tx,
            rx: Arc::new(Mutex::new(server_rx)),
        };

        let client_bus = Self {
            tx: client_tx,
            rx: Arc::new(Mutex::new(client_rx)),
        };

        (server_bus, client_bus)
    }
}

impl CanBus for MockCanBus {
    type Error = ();

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.tx.send(frame.clone()).map_err(|_| ())?;
        Ok(())
    }

    /// Waits for the peer; a dropped peer reads as a bus failure.
    async fn recv(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.map(Some).ok_or(())
    }
}

#[derive(Default)]
#[allow(dead_code)]
/// Polling-style bus replaying a fixed sequence of reads.
///
/// Once the script is exhausted every read returns `Ok(None)`.
pub struct ScriptedBus {
    pub reads: VecDeque<Result<Option<CanFrame>, ()>>,
    pub sent: Vec<CanFrame>,
    pub fail_send: bool,
}

#[allow(dead_code)]
impl ScriptedBus {
    pub fn new(reads: impl IntoIterator<Item = Result<Option<CanFrame>, ()>>) -> Self {
        Self {
            reads: reads.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl CanBus for ScriptedBus {
    type Error = ();

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        if self.fail_send {
            return Err(());
        }
        self.sent.push(frame.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        self.reads.pop_front().unwrap_or(Ok(None))
    }
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Timer recording requested delays instead of sleeping.
pub struct MockTimer {
    pub delays: Arc<StdMutex<Vec<u32>>>,
}

#[allow(dead_code)]
impl MockTimer {
    pub fn recorded(&self) -> Vec<u32> {
        self.delays.lock().unwrap().clone()
    }
}

impl KorriTimer for MockTimer {
    async fn delay_ms(&mut self, millis: u32) {
        self.delays.lock().unwrap().push(millis);
        tokio::task::yield_now().await;
    }
}

#[allow(dead_code)]
/// Request frame as the client node sends it (PGN 0xFF14, SA 120).
pub fn request_frame(raw_mean_anomaly: u32, raw_eccentricity: u16) -> CanFrame {
    let mut payload = [0xFF; 8];
    payload[..4].copy_from_slice(&raw_mean_anomaly.to_le_bytes());
    payload[4..6].copy_from_slice(&raw_eccentricity.to_le_bytes());
    CanFrame::new(CanId::builder(0xFF14, CLIENT_ADDRESS).build(), &payload)
}

#[allow(dead_code)]
/// Raw eccentric-anomaly field of a reply frame.
pub fn reply_raw(frame: &CanFrame) -> u32 {
    u32::from_le_bytes([frame.data[0], frame.data[1], frame.data[2], frame.data[3]])
}
