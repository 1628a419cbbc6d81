//! LED indicator state driven by host commands
//!
//! Commands set absolute state, so a duplicated or replayed packet can never
//! leave the indicator somewhere a single delivery would not.

use detent_protocol::{DecodeError, DeviceCommand, LedEffect, Packet, Rgb};

/// Colour shown before the host sends anything
pub const BOOT_COLOR: Rgb = Rgb::new(100, 100, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Indicator {
    pub effect: LedEffect,
    pub color: Rgb,
}

impl Default for Indicator {
    fn default() -> Self {
        Self {
            effect: LedEffect::Solid,
            color: BOOT_COLOR,
        }
    }
}

impl Indicator {
    /// Apply a command, returning true if the visible state changed
    pub fn apply(&mut self, command: DeviceCommand) -> bool {
        let before = *self;
        match command {
            DeviceCommand::SetMode(effect) => self.effect = effect,
            DeviceCommand::SetColor(color) => self.color = color,
        }
        *self != before
    }

    /// Decode and apply a received packet
    ///
    /// Event packets echoed back and configuration-protocol reports come back
    /// as `ForeignProtocol` and leave the state untouched.
    pub fn apply_packet(&mut self, packet: &Packet) -> Result<bool, DecodeError> {
        let command = DeviceCommand::decode(packet)?;
        Ok(self.apply(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detent_protocol::{Event, EventKind};

    #[test]
    fn test_apply_is_idempotent() {
        let mut indicator = Indicator::default();
        let cmd = DeviceCommand::SetColor(Rgb::new(255, 50, 255));

        assert!(indicator.apply(cmd));
        let once = indicator;
        assert!(!indicator.apply(cmd));
        assert_eq!(indicator, once);
    }

    #[test]
    fn test_apply_packet() {
        let mut indicator = Indicator::default();
        let packet = DeviceCommand::SetMode(LedEffect::Breathing).encode();

        assert_eq!(indicator.apply_packet(&packet), Ok(true));
        assert_eq!(indicator.effect, LedEffect::Breathing);
        assert_eq!(indicator.apply_packet(&packet), Ok(false));
    }

    #[test]
    fn test_foreign_packet_leaves_state() {
        let mut indicator = Indicator::default();
        let packet = Event::new(EventKind::Press, 0, 0).encode();

        let err = indicator.apply_packet(&packet).unwrap_err();
        assert!(err.is_foreign());
        assert_eq!(indicator, Indicator::default());
    }
}
