//! Bit-level access to CAN payloads.
//!
//! J1939 numeric fields are packed least-significant bit first: bit 0 of a
//! field lands in bit 0 of its first byte. A byte-aligned 32-bit field is
//! therefore a little-endian `u32`.
//!
//! Both cursors work on a window of at most nine bytes, loaded into a `u128`,
//! so any field of up to 64 bits at any bit offset is a single shift and mask.
use crate::error::{BitReaderError, BitWriterError};

/// Widest field a cursor handles.
const MAX_FIELD_BITS: u8 = 64;

/// Low `num_bits` set, `num_bits` in `1..=64`.
fn field_mask(num_bits: u8) -> u64 {
    u64::MAX >> (MAX_FIELD_BITS - num_bits)
}

/// Byte span `[first, last]` covered by `num_bits` bits starting at `cursor`.
fn byte_span(cursor: usize, num_bits: u8) -> (usize, usize) {
    (cursor / 8, (cursor + num_bits as usize - 1) / 8)
}

fn load_window(bytes: &[u8]) -> u128 {
    bytes
        .iter()
        .enumerate()
        .fold(0u128, |window, (index, byte)| window | (*byte as u128) << (8 * index))
}

//==================================================================================BITREADER
/// Sequential reader over a received payload.
pub struct BitReader<'a> {
    buffer: &'a [u8],
    /// Bits consumed since the start of `buffer`.
    bit_cursor: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            bit_cursor: 0,
        }
    }

    pub fn bits_remaining(&self) -> usize {
        self.buffer.len() * 8 - self.bit_cursor
    }

    /// Consume the next `num_bits` bits (1 to 64).
    ///
    /// On error the cursor does not move.
    pub fn read_u64(&mut self, num_bits: u8) -> Result<u64, BitReaderError> {
        if num_bits == 0 || num_bits > MAX_FIELD_BITS {
            return Err(BitReaderError::TooLongForType {
                max: MAX_FIELD_BITS,
                asked: num_bits,
            });
        }
        let available = self.bits_remaining();
        if num_bits as usize > available {
            return Err(BitReaderError::OutOfBounds {
                asked: num_bits as usize,
                available,
            });
        }

        let (first, last) = byte_span(self.bit_cursor, num_bits);
        let window = load_window(&self.buffer[first..=last]);
        let value = (window >> (self.bit_cursor % 8)) as u64 & field_mask(num_bits);

        self.bit_cursor += num_bits as usize;
        Ok(value)
    }

    pub fn read_u16(&mut self, num_bits: u8) -> Result<u16, BitReaderError> {
        if num_bits > 16 {
            return Err(BitReaderError::TooLongForType {
                max: 16,
                asked: num_bits,
            });
        }
        Ok(self.read_u64(num_bits)? as u16)
    }

    pub fn read_u32(&mut self, num_bits: u8) -> Result<u32, BitReaderError> {
        if num_bits > 32 {
            return Err(BitReaderError::TooLongForType {
                max: 32,
                asked: num_bits,
            });
        }
        Ok(self.read_u64(num_bits)? as u32)
    }
}

//==================================================================================BITWRITER
/// Sequential writer into an outgoing payload.
///
/// Only the bits of each written field change; reserved bytes keep whatever
/// the caller pre-filled (0xFF on the wire).
pub struct BitWriter<'a> {
    buffer: &'a mut [u8],
    /// Bits produced since the start of `buffer`.
    bit_cursor: usize,
}

impl<'a> BitWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            bit_cursor: 0,
        }
    }

    pub fn bit_cursor(&self) -> usize {
        self.bit_cursor
    }

    /// Store the low `num_bits` bits of `value` (1 to 64) at the cursor.
    pub fn write_u64(&mut self, value: u64, num_bits: u8) -> Result<(), BitWriterError> {
        if num_bits == 0 || num_bits > MAX_FIELD_BITS {
            return Err(BitWriterError::TooLongForType {
                max: MAX_FIELD_BITS,
                asked: num_bits,
            });
        }
        let available = self.buffer.len() * 8 - self.bit_cursor;
        if num_bits as usize > available {
            return Err(BitWriterError::OutOfBounds {
                asked: num_bits as usize,
                available,
            });
        }

        let (first, last) = byte_span(self.bit_cursor, num_bits);
        let shift = self.bit_cursor % 8;
        let mask = (field_mask(num_bits) as u128) << shift;
        let bytes = &mut self.buffer[first..=last];
        let window = (load_window(bytes) & !mask) | (((value as u128) << shift) & mask);

        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = (window >> (8 * index)) as u8;
        }

        self.bit_cursor += num_bits as usize;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16, num_bits: u8) -> Result<(), BitWriterError> {
        if num_bits > 16 {
            return Err(BitWriterError::TooLongForType {
                max: 16,
                asked: num_bits,
            });
        }
        self.write_u64(value as u64, num_bits)
    }

    pub fn write_u32(&mut self, value: u32, num_bits: u8) -> Result<(), BitWriterError> {
        if num_bits > 32 {
            return Err(BitWriterError::TooLongForType {
                max: 32,
                asked: num_bits,
            });
        }
        self.write_u64(value as u64, num_bits)
    }
}
