//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (payload extraction,
//! serialization/deserialization, bit access, dispatcher loop, etc.).
use thiserror_no_std::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures while extracting business data from a raw CAN frame.
pub enum ExtractionError {
    /// The frame carries fewer payload bytes than the message layout needs.
    #[error("Invalid data length: got {len} bytes, need {required}")]
    InvalidDataLen { len: usize, required: usize },
    /// The payload could not be interpreted.
    #[error("Invalid incoming frame")]
    InvalidIncomingFrame,
}

//================================================================================CODEC_ERROR

#[derive(Debug, Error)]
/// Issues encountered while serializing a message into a buffer.
pub enum SerializationError {
    /// Provided buffer is too small for the payload.
    #[error("Buffer too small: got {len} bytes, need {required}")]
    BufferTooSmall { len: usize, required: usize },
    /// Failed while writing bits into the output buffer.
    #[error("BitWrite error: {err}")]
    BitWriteError { err: BitWriterError },
}

#[derive(Debug, Error)]
/// Errors raised while deserializing a CAN buffer into a message structure.
pub enum DeserializationError {
    /// Payload is shorter than the message layout.
    #[error("Invalid data length: got {len} bytes, need {required}")]
    InvalidDataLength { len: usize, required: usize },
    /// Bit-level access on the buffer failed (out of bounds, misalignment…).
    #[error("BitReader error: {err}")]
    BitReaderError { err: BitReaderError },
}

impl From<DeserializationError> for ExtractionError {
    fn from(err: DeserializationError) -> Self {
        match err {
            DeserializationError::InvalidDataLength { len, required } => {
                ExtractionError::InvalidDataLen { len, required }
            }
            DeserializationError::BitReaderError { .. } => ExtractionError::InvalidIncomingFrame,
        }
    }
}

//==================================================================================SERVER_ERROR
#[derive(Debug, Error)]
/// Transport failures that terminate the request dispatcher loop.
pub enum ServerError<E: core::fmt::Debug> {
    /// Unable to receive frames from the bus.
    #[error("CAN bus receive error: {0:?}")]
    Receive(E),
    /// CAN layer refused or failed to send the reply frame.
    #[error("CAN bus send error: {0:?}")]
    Send(E),
}

//==================================================================================BITREADER_ERRORS
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
/// Errors raised during bitwise buffer reads.
pub enum BitReaderError {
    /// Attempted to read past the end of the buffer.
    #[error("Attempted to read out of bounds -> asked: {asked}, available: {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Requested more bits than the target type can hold.
    #[error("Cannot read more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}
//==================================================================================BITWRITER_ERRORS
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
/// Errors raised during bitwise writes into a buffer.
pub enum BitWriterError {
    /// Attempted to write beyond the provided capacity.
    #[error("Attempted to write out of bounds -> asked: {asked}, available: {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Field is too large for the provided type.
    #[error("Cannot write more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}
