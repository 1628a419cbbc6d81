//! Gesture events sent from the encoder to the host

use crate::packet::{DecodeError, Packet, EVENT_MARKER, OFFSET_SOURCE, OFFSET_VALUE};

/// Gesture kinds produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// Encoder rotated clockwise (1 detent)
    RotateCw,
    /// Encoder rotated counter-clockwise (1 detent)
    RotateCcw,
    /// Single tap confirmed (no second press in the double-tap window)
    Press,
    /// Button released (after a tap or a long press)
    Release,
    /// Button held past the long-press threshold
    LongPress,
    /// Second press inside the double-tap window
    DoubleTap,
}

// Wire format values, stable across firmware and host versions
const EVENT_ROTATE_CW: u8 = 0x01;
const EVENT_ROTATE_CCW: u8 = 0x02;
const EVENT_PRESS: u8 = 0x03;
const EVENT_RELEASE: u8 = 0x04;
const EVENT_LONG_PRESS: u8 = 0x05;
const EVENT_DOUBLE_TAP: u8 = 0x06;

impl EventKind {
    /// Parse an event kind from its wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            EVENT_ROTATE_CW => Some(EventKind::RotateCw),
            EVENT_ROTATE_CCW => Some(EventKind::RotateCcw),
            EVENT_PRESS => Some(EventKind::Press),
            EVENT_RELEASE => Some(EventKind::Release),
            EVENT_LONG_PRESS => Some(EventKind::LongPress),
            EVENT_DOUBLE_TAP => Some(EventKind::DoubleTap),
            _ => None,
        }
    }

    /// Convert to wire tag
    pub fn tag(self) -> u8 {
        match self {
            EventKind::RotateCw => EVENT_ROTATE_CW,
            EventKind::RotateCcw => EVENT_ROTATE_CCW,
            EventKind::Press => EVENT_PRESS,
            EventKind::Release => EVENT_RELEASE,
            EventKind::LongPress => EVENT_LONG_PRESS,
            EventKind::DoubleTap => EVENT_DOUBLE_TAP,
        }
    }

    /// Returns true if this is a rotation event
    pub fn is_rotation(&self) -> bool {
        matches!(self, EventKind::RotateCw | EventKind::RotateCcw)
    }

    /// Returns true if this is a button event
    pub fn is_button(&self) -> bool {
        !self.is_rotation()
    }

    /// Returns the rotation direction as a signed delta (-1, 0, or +1)
    pub fn rotation_delta(&self) -> i8 {
        match self {
            EventKind::RotateCw => 1,
            EventKind::RotateCcw => -1,
            _ => 0,
        }
    }
}

/// A classified gesture
///
/// `value` is the absolute position index for rotations; button events
/// carry the position at the time of the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    pub kind: EventKind,
    pub source_id: u8,
    pub value: u8,
    /// Wrapping device tick counter (low 16 bits of milliseconds)
    pub timestamp: u16,
}

impl Event {
    pub fn new(kind: EventKind, value: u8, timestamp: u16) -> Self {
        Self {
            kind,
            source_id: 0,
            value,
            timestamp,
        }
    }

    /// Encode into a device → host packet
    pub fn encode(&self) -> Packet {
        let mut packet = Packet::new(EVENT_MARKER, self.kind.tag());
        packet.set(OFFSET_SOURCE, self.source_id);
        packet.set(OFFSET_VALUE, self.value);
        packet.set_timestamp(self.timestamp);
        packet
    }

    /// Decode a device → host packet
    ///
    /// Packets from the co-resident protocol come back as
    /// [`DecodeError::ForeignProtocol`] and should be dropped silently.
    pub fn decode(packet: &Packet) -> Result<Self, DecodeError> {
        packet.expect_marker(EVENT_MARKER)?;

        let kind = EventKind::from_tag(packet.msg_type())
            .ok_or(DecodeError::UnknownKind(packet.msg_type()))?;

        Ok(Self {
            kind,
            source_id: packet.source(),
            value: packet.value(),
            timestamp: packet.timestamp(),
        })
    }
}
