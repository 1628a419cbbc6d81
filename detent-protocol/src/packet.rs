//! Fixed-size packet framing.
//!
//! Packet layout:
//! - MARKER (1 byte): protocol marker, `0xFD` device → host, `0xFE` host → device
//! - TYPE (1 byte): event-kind tag or command tag
//! - SOURCE (1 byte): source/target id, always 0 for a single encoder
//! - VALUE (1 byte): event value or first command argument
//! - TIMESTAMP (2 bytes): little-endian wrapping device tick (device → host only)
//! - PADDING (26 bytes): zero-filled, commands may use bytes 4-5 for arguments

use core::fmt;

/// Size of every packet in both directions
pub const PACKET_SIZE: usize = 32;

/// Bytes that must be present for a packet to be interpreted
pub const HEADER_SIZE: usize = 6;

/// Marker for device → host event packets
pub const EVENT_MARKER: u8 = 0xFD;

/// Marker for host → device command packets
pub const COMMAND_MARKER: u8 = 0xFE;

pub(crate) const OFFSET_MARKER: usize = 0;
pub(crate) const OFFSET_TYPE: usize = 1;
pub(crate) const OFFSET_SOURCE: usize = 2;
pub(crate) const OFFSET_VALUE: usize = 3;
pub(crate) const OFFSET_TIMESTAMP: usize = 4;

/// Errors that can occur while decoding a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Marker byte belongs to another protocol on the same endpoint
    ForeignProtocol(u8),
    /// Message type tag is not known to this protocol version
    UnknownKind(u8),
    /// Fewer bytes than the packet header
    Truncated(usize),
    /// Argument value outside its valid range
    InvalidArgument,
}

impl DecodeError {
    /// True for packets that simply belong to the co-resident protocol
    ///
    /// These are dropped without being treated as errors.
    pub fn is_foreign(&self) -> bool {
        matches!(self, DecodeError::ForeignProtocol(_))
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::ForeignProtocol(marker) => {
                write!(f, "foreign protocol marker 0x{:02X}", marker)
            }
            DecodeError::UnknownKind(tag) => write!(f, "unknown message type 0x{:02X}", tag),
            DecodeError::Truncated(len) => write!(f, "truncated packet ({} bytes)", len),
            DecodeError::InvalidArgument => f.write_str("invalid argument"),
        }
    }
}

/// A raw 32-byte packet
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet([u8; PACKET_SIZE]);

impl Default for Packet {
    fn default() -> Self {
        Self([0; PACKET_SIZE])
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Padding is always zero, the header is all that matters
        write!(f, "Packet({:02X?})", &self.0[..HEADER_SIZE])
    }
}

impl Packet {
    /// Create a zeroed packet with the given marker and type
    pub fn new(marker: u8, msg_type: u8) -> Self {
        let mut bytes = [0; PACKET_SIZE];
        bytes[OFFSET_MARKER] = marker;
        bytes[OFFSET_TYPE] = msg_type;
        Self(bytes)
    }

    /// Build a packet from a received report of any length
    ///
    /// Shorter reports are zero-padded as long as the header is present,
    /// longer reports are cut to `PACKET_SIZE`.
    pub fn from_slice(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < HEADER_SIZE {
            return Err(DecodeError::Truncated(data.len()));
        }

        let len = data.len().min(PACKET_SIZE);
        let mut bytes = [0; PACKET_SIZE];
        bytes[..len].copy_from_slice(&data[..len]);
        Ok(Self(bytes))
    }

    /// Raw packet bytes
    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.0
    }

    pub fn marker(&self) -> u8 {
        self.0[OFFSET_MARKER]
    }

    pub fn msg_type(&self) -> u8 {
        self.0[OFFSET_TYPE]
    }

    pub fn source(&self) -> u8 {
        self.0[OFFSET_SOURCE]
    }

    pub fn value(&self) -> u8 {
        self.0[OFFSET_VALUE]
    }

    /// Byte at an arbitrary offset, 0 if out of range
    pub fn byte(&self, offset: usize) -> u8 {
        self.0.get(offset).copied().unwrap_or(0)
    }

    pub fn timestamp(&self) -> u16 {
        u16::from_le_bytes([self.0[OFFSET_TIMESTAMP], self.0[OFFSET_TIMESTAMP + 1]])
    }

    pub(crate) fn set(&mut self, offset: usize, byte: u8) {
        self.0[offset] = byte;
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: u16) {
        let [lo, hi] = timestamp.to_le_bytes();
        self.0[OFFSET_TIMESTAMP] = lo;
        self.0[OFFSET_TIMESTAMP + 1] = hi;
    }

    /// Check the marker byte before interpreting the rest
    pub(crate) fn expect_marker(&self, marker: u8) -> Result<(), DecodeError> {
        if self.marker() == marker {
            Ok(())
        } else {
            Err(DecodeError::ForeignProtocol(self.marker()))
        }
    }
}
