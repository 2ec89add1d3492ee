//! Single-frame messages exchanged by the Kepler node.
//!
//! | PGN    | Direction        | Bytes 0..3            | Bytes 4..5   | Bytes 6..7 |
//! |--------|------------------|-----------------------|--------------|------------|
//! | 0xFF14 | client → server  | mean anomaly          | eccentricity | 0xFF       |
//! | 0xFF15 | server → client  | eccentric anomaly     | 0xFF         | 0xFF       |
//!
//! Angles use 1e-6 deg/bit with a −210° offset; eccentricity uses 0.0015625/bit.
//! All fields are little-endian.
use crate::{
    error::{DeserializationError, SerializationError},
    infra::codec::{
        bits::{BitReader, BitWriter},
        slot,
        traits::{FromPayload, PgnMessage, ToPayload},
    },
    protocol::transport::can_frame::CAN_MAX_DLC,
};

/// PGN of an eccentric-anomaly request.
pub const REQUEST_PGN: u32 = 0xFF14;
/// PGN of the solver reply.
pub const RESULTS_PGN: u32 = 0xFF15;
/// Filler for unused payload bytes.
pub const PADDING_BYTE: u8 = 0xFF;

/// Prepare an 8-byte output buffer filled with the padding byte.
fn padded_buffer(buffer: &mut [u8]) -> Result<&mut [u8], SerializationError> {
    if buffer.len() < CAN_MAX_DLC {
        return Err(SerializationError::BufferTooSmall {
            len: buffer.len(),
            required: CAN_MAX_DLC,
        });
    }
    let frame = &mut buffer[..CAN_MAX_DLC];
    frame.fill(PADDING_BYTE);
    Ok(frame)
}

fn check_len(payload: &[u8], required: usize) -> Result<(), DeserializationError> {
    if payload.len() < required {
        return Err(DeserializationError::InvalidDataLength {
            len: payload.len(),
            required,
        });
    }
    Ok(())
}

//==================================================================================REQUEST
#[derive(Clone, Copy, Debug, PartialEq, Default)]
/// PGN 0xFF14: solve Kepler's equation for this orbit position.
pub struct KeplerRequest {
    /// Mean anomaly in degrees; `[0, 360)` once decoded.
    pub mean_anomaly: f64,
    /// Eccentricity; `[0, 1)` once decoded.
    pub eccentricity: f64,
}

impl KeplerRequest {
    pub fn new(mean_anomaly: f64, eccentricity: f64) -> Self {
        Self {
            mean_anomaly,
            eccentricity,
        }
    }

    /// Mean anomaly in radians, as the solver expects it.
    pub fn mean_anomaly_rad(&self) -> f64 {
        slot::deg_to_rad(self.mean_anomaly)
    }
}

impl PgnMessage for KeplerRequest {
    const PGN: u32 = REQUEST_PGN;
    const FIELDS_LEN: usize = 6;
}

impl FromPayload for KeplerRequest {
    fn from_payload(bytes_slice: &[u8]) -> Result<Self, DeserializationError> {
        check_len(bytes_slice, Self::FIELDS_LEN)?;
        let mut reader = BitReader::new(bytes_slice);
        let raw_mean_anomaly = reader
            .read_u32(32)
            .map_err(|err| DeserializationError::BitReaderError { err })?;
        let raw_eccentricity = reader
            .read_u16(16)
            .map_err(|err| DeserializationError::BitReaderError { err })?;

        Ok(Self {
            mean_anomaly: slot::mean_anomaly_deg_from_raw(raw_mean_anomaly),
            eccentricity: slot::eccentricity_from_raw(raw_eccentricity),
        })
    }
}

impl ToPayload for KeplerRequest {
    fn to_payload(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let frame = padded_buffer(buffer)?;
        let mut writer = BitWriter::new(frame);
        writer
            .write_u32(slot::angle_deg_to_raw(self.mean_anomaly), 32)
            .map_err(|err| SerializationError::BitWriteError { err })?;
        writer
            .write_u16(slot::eccentricity_to_raw(self.eccentricity), 16)
            .map_err(|err| SerializationError::BitWriteError { err })?;
        Ok(CAN_MAX_DLC)
    }

    fn payload_len(&self) -> usize {
        CAN_MAX_DLC
    }
}

//==================================================================================RESULT
#[derive(Clone, Copy, Debug, PartialEq, Default)]
/// PGN 0xFF15: eccentric anomaly computed by the server.
pub struct KeplerResult {
    /// Eccentric anomaly in degrees, `(−180, 180]`.
    pub eccentric_anomaly: f64,
}

impl KeplerResult {
    /// Wrap a solver output (radians, any range).
    pub fn from_radians(eccentric_anomaly: f64) -> Self {
        Self {
            eccentric_anomaly: slot::normalize_deg_signed(slot::rad_to_deg(eccentric_anomaly)),
        }
    }

    pub fn eccentric_anomaly_rad(&self) -> f64 {
        slot::deg_to_rad(self.eccentric_anomaly)
    }
}

impl PgnMessage for KeplerResult {
    const PGN: u32 = RESULTS_PGN;
    const FIELDS_LEN: usize = 4;
}

impl FromPayload for KeplerResult {
    fn from_payload(bytes_slice: &[u8]) -> Result<Self, DeserializationError> {
        check_len(bytes_slice, Self::FIELDS_LEN)?;
        let raw = BitReader::new(bytes_slice)
            .read_u32(32)
            .map_err(|err| DeserializationError::BitReaderError { err })?;
        Ok(Self {
            eccentric_anomaly: slot::angle_deg_from_raw(raw),
        })
    }
}

impl ToPayload for KeplerResult {
    fn to_payload(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let frame = padded_buffer(buffer)?;
        let raw = slot::angle_deg_to_raw(slot::normalize_deg_signed(self.eccentric_anomaly));
        BitWriter::new(frame)
            .write_u32(raw, 32)
            .map_err(|err| SerializationError::BitWriteError { err })?;
        Ok(CAN_MAX_DLC)
    }

    fn payload_len(&self) -> usize {
        CAN_MAX_DLC
    }
}
