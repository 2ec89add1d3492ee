//! Public traits exposed by the payload codec. They decouple the message
//! structures from the byte layout and provide a uniform API to the
//! dispatcher and to test clients.
use crate::error::{DeserializationError, SerializationError};

//==================================================================================PGN_MESSAGE
/// Static description of a single-frame J1939 message.
pub trait PgnMessage {
    /// Parameter Group Number carried in the CAN identifier.
    const PGN: u32;
    /// Minimum number of payload bytes holding the message fields.
    const FIELDS_LEN: usize;
}
//==================================================================================TO_PAYLOAD
/// Serialize a message into a sequence of bytes.
pub trait ToPayload {
    /// Serialize the structure into the provided buffer.
    ///
    /// * `buffer`: destination buffer for serialized bytes.
    ///
    /// Returns the number of bytes written on success.
    fn to_payload(&self, buffer: &mut [u8]) -> Result<usize, SerializationError>;
    /// Serialized payload length for this structure.
    fn payload_len(&self) -> usize;
}
//==================================================================================FROM_PAYLOAD
/// Deserialize a sequence of bytes into a message structure.
pub trait FromPayload: Sized {
    /// Deserialize a byte slice to produce a new instance.
    fn from_payload(bytes_slice: &[u8]) -> Result<Self, DeserializationError>;
}
