//! Host → device commands
//!
//! Commands are fire-and-forget: there is no acknowledgement field and the
//! host never retries. Every command sets absolute state, so sending the
//! same command twice leaves the device exactly where one send would.

use crate::packet::{DecodeError, Packet, COMMAND_MARKER, OFFSET_VALUE};

// Command tags
pub const CMD_SET_MODE: u8 = 0x01;
pub const CMD_SET_COLOR: u8 = 0x02;

/// An RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// LED effect the device renders the current colour with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedEffect {
    #[default]
    Solid,
    Breathing,
    /// Single pulse, then back to solid
    Pulse,
    Gradient,
    /// React to keypresses
    Reactive,
}

impl LedEffect {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(LedEffect::Solid),
            0x01 => Some(LedEffect::Breathing),
            0x02 => Some(LedEffect::Pulse),
            0x03 => Some(LedEffect::Gradient),
            0x04 => Some(LedEffect::Reactive),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            LedEffect::Solid => 0x00,
            LedEffect::Breathing => 0x01,
            LedEffect::Pulse => 0x02,
            LedEffect::Gradient => 0x03,
            LedEffect::Reactive => 0x04,
        }
    }
}

/// Commands sent from the host to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceCommand {
    /// Select the LED effect
    SetMode(LedEffect),
    /// Set the LED colour
    SetColor(Rgb),
}

impl DeviceCommand {
    /// Encode into a host → device packet
    ///
    /// Byte 2 is the target id (0 for the single encoder); arguments start
    /// at byte 3.
    pub fn encode(&self) -> Packet {
        match self {
            DeviceCommand::SetMode(effect) => {
                let mut packet = Packet::new(COMMAND_MARKER, CMD_SET_MODE);
                packet.set(OFFSET_VALUE, effect.to_byte());
                packet
            }
            DeviceCommand::SetColor(rgb) => {
                let mut packet = Packet::new(COMMAND_MARKER, CMD_SET_COLOR);
                packet.set(OFFSET_VALUE, rgb.r);
                packet.set(OFFSET_VALUE + 1, rgb.g);
                packet.set(OFFSET_VALUE + 2, rgb.b);
                packet
            }
        }
    }

    /// Decode a host → device packet (device side)
    pub fn decode(packet: &Packet) -> Result<Self, DecodeError> {
        packet.expect_marker(COMMAND_MARKER)?;

        match packet.msg_type() {
            CMD_SET_MODE => LedEffect::from_byte(packet.value())
                .map(DeviceCommand::SetMode)
                .ok_or(DecodeError::InvalidArgument),
            CMD_SET_COLOR => Ok(DeviceCommand::SetColor(Rgb::new(
                packet.value(),
                packet.byte(OFFSET_VALUE + 1),
                packet.byte(OFFSET_VALUE + 2),
            ))),
            other => Err(DecodeError::UnknownKind(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::EVENT_MARKER;

    #[test]
    fn test_set_color_layout() {
        let packet = DeviceCommand::SetColor(Rgb::new(100, 100, 255)).encode();
        let bytes = packet.as_bytes();

        assert_eq!(bytes[0], COMMAND_MARKER);
        assert_eq!(bytes[1], CMD_SET_COLOR);
        assert_eq!(bytes[2], 0); // target
        assert_eq!(&bytes[3..6], &[100, 100, 255]);
        assert!(bytes[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_mode_layout() {
        let packet = DeviceCommand::SetMode(LedEffect::Pulse).encode();

        assert_eq!(packet.marker(), COMMAND_MARKER);
        assert_eq!(packet.msg_type(), CMD_SET_MODE);
        assert_eq!(packet.value(), 0x02);
        assert_eq!(packet.source(), 0); // target
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let cmd = DeviceCommand::SetColor(Rgb::new(1, 2, 3));
        assert_eq!(cmd.encode(), cmd.encode());
    }

    #[test]
    fn test_decode_commands() {
        for cmd in [
            DeviceCommand::SetMode(LedEffect::Breathing),
            DeviceCommand::SetMode(LedEffect::Reactive),
            DeviceCommand::SetColor(Rgb::new(255, 0, 0)),
        ] {
            assert_eq!(DeviceCommand::decode(&cmd.encode()), Ok(cmd));
        }
    }

    #[test]
    fn test_decode_rejects_event_packets() {
        let packet = Packet::new(EVENT_MARKER, CMD_SET_MODE);
        assert_eq!(
            DeviceCommand::decode(&packet),
            Err(DecodeError::ForeignProtocol(EVENT_MARKER))
        );
    }

    #[test]
    fn test_decode_invalid_effect() {
        let mut packet = Packet::new(COMMAND_MARKER, CMD_SET_MODE);
        packet.set(OFFSET_VALUE, 0x09);
        assert_eq!(
            DeviceCommand::decode(&packet),
            Err(DecodeError::InvalidArgument)
        );
    }

    #[test]
    fn test_decode_unknown_command() {
        let packet = Packet::new(COMMAND_MARKER, 0x33);
        assert_eq!(
            DeviceCommand::decode(&packet),
            Err(DecodeError::UnknownKind(0x33))
        );
    }
}
