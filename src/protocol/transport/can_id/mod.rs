//! Creation and extraction of the 29-bit CAN identifiers defined by SAE J1939.
//!
//! ```text
//!  28 26 25 24 23      16 15       8 7        0
//! +-----+--+--+----------+----------+----------+
//! | P   |R |DP| PF       | PS       | SA       |
//! +-----+--+--+----------+----------+----------+
//! ```
//!
//! `PF` (format byte) selects the addressing format:
//! - `PF < 0xF0` (PDU1): `PS` is the destination address and is not part of the PGN.
//! - `PF ≥ 0xF0` (PDU2): broadcast; `PS` is the group extension and belongs to the PGN.
//!
//! Decoding never fails: any 29-bit value is interpreted per the layout above.

/// Destination address meaning "every node".
pub const GLOBAL_ADDRESS: u8 = 255;
/// First format byte of the broadcast (PDU2) range.
pub const PDU2_THRESHOLD: u8 = 0xF0;
/// Mask of the 29 identifier bits.
pub const CAN_ID_MASK: u32 = 0x1FFF_FFFF;
/// Extended-frame marker used by raw socket APIs (`CAN_EFF_FLAG`).
pub const EXTENDED_FRAME_FLAG: u32 = 0x8000_0000;
/// Mask of the 18-bit PGN space (R, DP, PF, PS).
pub const PGN_MASK: u32 = 0x3_FFFF;

/// Format byte of an 18-bit PGN.
#[inline]
fn pdu_format(pgn: u32) -> u8 {
    ((pgn >> 8) & 0xFF) as u8
}

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Encapsulates an extended CAN identifier (29 bits) and exposes accessors
/// for priority, PGN, destination, and source.
pub struct CanId(pub u32);

impl CanId {
    /// Creates a pre-configured `CanIdBuilder` for a PGN and source address.
    pub fn builder(pgn: u32, source_address: u8) -> CanIdBuilder {
        CanIdBuilder::new(pgn, source_address)
    }

    /// Wrap an identifier read from a raw socket, dropping the EFF/RTR/ERR flag bits.
    pub fn from_raw(raw: u32) -> Self {
        CanId(raw & CAN_ID_MASK)
    }

    /// Identifier with the extended-format marker set, as raw sockets expect it.
    pub fn to_raw_extended(&self) -> u32 {
        (self.0 & CAN_ID_MASK) | EXTENDED_FRAME_FLAG
    }

    /// Split the identifier into its J1939 fields.
    pub fn decode(&self) -> J1939Id {
        J1939Id {
            priority: self.priority(),
            pgn: self.pgn(),
            destination: self.destination().unwrap_or(GLOBAL_ADDRESS),
            source_address: self.source_address(),
        }
    }

    /// Returns the priority (3 bits, value 0-7) encoded in the CAN ID.
    pub fn priority(&self) -> u8 {
        ((self.0 >> 26) & 0x07) as u8
    }

    /// PDU format byte (bits 16..23).
    pub fn pdu_format(&self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// PDU specific byte (bits 8..15): destination or group extension.
    pub fn pdu_specific(&self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Whether the identifier uses the broadcast (PDU2) format.
    pub fn is_broadcast_format(&self) -> bool {
        self.pdu_format() >= PDU2_THRESHOLD
    }

    /// Extracts the 18-bit PGN, handling the PDU1/PDU2 distinction.
    pub fn pgn(&self) -> u32 {
        if self.is_broadcast_format() {
            // PDU2: PS is the group extension.
            (self.0 >> 8) & PGN_MASK
        } else {
            // PDU1: PS carries the destination, the PGN low byte is zero.
            (self.0 >> 8) & (PGN_MASK & !0xFF)
        }
    }

    /// Returns the destination address (PDU1); `None` for broadcast PGNs.
    pub fn destination(&self) -> Option<u8> {
        if self.is_broadcast_format() {
            None
        } else {
            Some(self.pdu_specific())
        }
    }

    /// Eight-bit source address (logical node identifier on the bus).
    pub fn source_address(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

//==================================================================================J1939_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Structured view of a J1939 identifier.
///
/// For broadcast PGNs (format byte ≥ 0xF0) `destination` is implicitly
/// [`GLOBAL_ADDRESS`]: it has no bits of its own on the wire.
pub struct J1939Id {
    /// 3-bit priority (0 = highest).
    pub priority: u8,
    /// 18-bit Parameter Group Number.
    pub pgn: u32,
    pub destination: u8,
    pub source_address: u8,
}

impl J1939Id {
    /// Pack into a 29-bit identifier.
    ///
    /// Uses the same "format byte ≥ 0xF0" rule as [`CanId::decode`], so
    /// `id.encode().decode() == id` for every identifier produced by `decode`.
    /// Out-of-range priority and PGN bits are masked off.
    pub fn encode(&self) -> CanId {
        let pgn = self.pgn & PGN_MASK;
        let mut id = ((self.priority as u32 & 0x07) << 26) | (self.source_address as u32);

        if pdu_format(pgn) >= PDU2_THRESHOLD {
            id |= pgn << 8;
        } else {
            id |= (pgn & !0xFF) << 8;
            id |= (self.destination as u32) << 8;
        }
        CanId(id)
    }
}

impl From<J1939Id> for CanId {
    fn from(id: J1939Id) -> Self {
        id.encode()
    }
}

impl From<CanId> for J1939Id {
    fn from(id: CanId) -> Self {
        id.decode()
    }
}

//==================================================================================CAN_ID_BUILDER
#[derive(Debug)]
/// Fluent builder over [`J1939Id`].
pub struct CanIdBuilder {
    pub priority: u8,
    pub pgn: u32,
    pub source_address: u8,
    pub destination: Option<u8>,
}

impl CanIdBuilder {
    /// Initializes the builder for a given PGN and source address.
    pub fn new(pgn: u32, source_address: u8) -> Self {
        Self {
            priority: 6, // Default priority
            pgn,
            source_address,
            destination: None,
        }
    }

    /// Sets the priority (3 bits) to use during construction.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority & 0x07;
        self
    }

    /// Assigns a destination address. Ignored for broadcast (PDU2) PGNs.
    pub fn to_destination(mut self, destination_address: u8) -> Self {
        self.destination = Some(destination_address);
        self
    }

    /// Builds the identifier. A missing destination means [`GLOBAL_ADDRESS`].
    pub fn build(self) -> CanId {
        J1939Id {
            priority: self.priority,
            pgn: self.pgn,
            destination: self.destination.unwrap_or(GLOBAL_ADDRESS),
            source_address: self.source_address,
        }
        .into()
    }
}
