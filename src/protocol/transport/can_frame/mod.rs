//! In-memory representation of a SAE J1939 CAN frame.
use crate::protocol::transport::can_id::{CanId, CAN_ID_MASK};
use embedded_can::{ExtendedId, Frame, Id};

/// Classic CAN payload capacity.
pub const CAN_MAX_DLC: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw J1939 frame as read from the CAN bus.
pub struct CanFrame {
    /// Full 29-bit CAN identifier stored inside a `u32`.
    pub id: CanId,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// Build a frame from the first (at most eight) bytes of `payload`.
    pub fn new(id: CanId, payload: &[u8]) -> Self {
        let len = payload.len().min(CAN_MAX_DLC);
        let mut data = [0u8; CAN_MAX_DLC];
        data[..len].copy_from_slice(&payload[..len]);
        Self { id, data, len }
    }

    /// Valid payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len.min(CAN_MAX_DLC)]
    }

    /// Convert from any `embedded-can` frame.
    ///
    /// Standard (11-bit) identifiers and remote frames carry no J1939 data
    /// and yield `None`.
    pub fn from_embedded<F: Frame>(frame: &F) -> Option<Self> {
        if frame.is_remote_frame() {
            return None;
        }
        match frame.id() {
            Id::Extended(id) => Some(Self::new(CanId::from_raw(id.as_raw()), frame.data())),
            Id::Standard(_) => None,
        }
    }

    /// Convert into an `embedded-can` frame with an extended identifier.
    pub fn to_embedded<F: Frame>(&self) -> Option<F> {
        let id = ExtendedId::new(self.id.0 & CAN_ID_MASK)?;
        F::new(id, self.payload())
    }
}

//==================================================================================TESTS
#[cfg(test)]
mod tests {
    use super::*;
    use embedded_can::StandardId;

    /// Minimal driver-side frame.
    #[derive(Debug)]
    struct DriverFrame {
        id: Id,
        data: [u8; 8],
        dlc: usize,
        remote: bool,
    }

    impl Frame for DriverFrame {
        fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
            if data.len() > 8 {
                return None;
            }
            let mut buf = [0u8; 8];
            buf[..data.len()].copy_from_slice(data);
            Some(Self {
                id: id.into(),
                data: buf,
                dlc: data.len(),
                remote: false,
            })
        }

        fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
            Some(Self {
                id: id.into(),
                data: [0; 8],
                dlc,
                remote: true,
            })
        }

        fn is_extended(&self) -> bool {
            matches!(self.id, Id::Extended(_))
        }

        fn is_remote_frame(&self) -> bool {
            self.remote
        }

        fn id(&self) -> Id {
            self.id
        }

        fn dlc(&self) -> usize {
            self.dlc
        }

        fn data(&self) -> &[u8] {
            &self.data[..self.dlc]
        }
    }

    #[test]
    fn test_new_clamps_payload() {
        let frame = CanFrame::new(CanId(0x18FF1500), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(frame.len, 8);
        assert_eq!(frame.payload(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        let short = CanFrame::new(CanId(0x18FF1500), &[0xAA, 0xBB]);
        assert_eq!(short.payload(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_embedded_conversion() {
        let frame = CanFrame::new(CanId(0x18FF1417), &[0, 1, 2, 3, 4, 5, 0xFF, 0xFF]);
        let driver: DriverFrame = frame.to_embedded().unwrap();
        assert!(driver.is_extended());
        assert_eq!(driver.data(), frame.payload());

        let back = CanFrame::from_embedded(&driver).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_embedded_rejects_non_j1939_frames() {
        let standard = DriverFrame::new(StandardId::new(0x123).unwrap(), &[1, 2]).unwrap();
        assert!(CanFrame::from_embedded(&standard).is_none());

        let remote = DriverFrame::new_remote(ExtendedId::new(0x18FF1417).unwrap(), 8).unwrap();
        assert!(CanFrame::from_embedded(&remote).is_none());
    }
}
