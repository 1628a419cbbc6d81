//! LED feedback
//!
//! Mirrors the active mode on the encoder's LED: the command list is shown
//! in the root colour, each mode in its accent, and a contained error
//! flashes red until the next state change.

use detent_core::{NotificationLevel, Output};
use detent_protocol::{DeviceCommand, LedEffect, Rgb};

pub const ROOT_COLOR: Rgb = Rgb::new(100, 100, 255);
pub const ERROR_COLOR: Rgb = Rgb::new(255, 0, 0);

#[derive(Debug, Clone)]
pub struct LedFeedback {
    /// Colour of the mode on top of the stack
    mode_color: Rgb,
    /// What the device was last told, `None` until the first command
    shown_effect: Option<LedEffect>,
    shown_color: Option<Rgb>,
}

impl Default for LedFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl LedFeedback {
    pub fn new() -> Self {
        Self {
            mode_color: ROOT_COLOR,
            shown_effect: None,
            shown_color: None,
        }
    }

    /// Commands needed to reflect `output`; nothing if the LED is already
    /// right
    pub fn observe(&mut self, output: &Output) -> Vec<DeviceCommand> {
        match output {
            Output::ModeChanged { accent, .. } => {
                self.mode_color = accent.unwrap_or(ROOT_COLOR);
                self.show(LedEffect::Solid, self.mode_color)
            }
            Output::Notify(n) if n.level == NotificationLevel::Error => {
                self.show(LedEffect::Pulse, ERROR_COLOR)
            }
            Output::Display(_) => self.show(LedEffect::Solid, self.mode_color),
            Output::Notify(_) => Vec::new(),
        }
    }

    /// Forget what the device shows, e.g. after it was replugged
    pub fn resync(&mut self) -> Vec<DeviceCommand> {
        self.shown_effect = None;
        self.shown_color = None;
        self.show(LedEffect::Solid, self.mode_color)
    }

    fn show(&mut self, effect: LedEffect, color: Rgb) -> Vec<DeviceCommand> {
        let mut commands = Vec::new();
        if self.shown_effect != Some(effect) {
            self.shown_effect = Some(effect);
            commands.push(DeviceCommand::SetMode(effect));
        }
        if self.shown_color != Some(color) {
            self.shown_color = Some(color);
            commands.push(DeviceCommand::SetColor(color));
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detent_core::{DisplayDescriptor, ModeId, Notification};

    const MEDIA: Rgb = Rgb::new(255, 50, 255);

    fn mode_changed(accent: Option<Rgb>) -> Output {
        Output::ModeChanged {
            mode: accent.map(|_| ModeId::from("media")),
            accent,
        }
    }

    #[test]
    fn test_first_mode_change_sets_everything() {
        let mut led = LedFeedback::new();
        assert_eq!(
            led.observe(&mode_changed(None)),
            [
                DeviceCommand::SetMode(LedEffect::Solid),
                DeviceCommand::SetColor(ROOT_COLOR)
            ]
        );
    }

    #[test]
    fn test_duplicates_are_not_resent() {
        let mut led = LedFeedback::new();
        led.observe(&mode_changed(None));
        assert!(led.observe(&mode_changed(None)).is_empty());
        assert!(led
            .observe(&Output::Display(DisplayDescriptor::default()))
            .is_empty());
    }

    #[test]
    fn test_accent_and_back_to_root() {
        let mut led = LedFeedback::new();
        led.observe(&mode_changed(None));
        assert_eq!(
            led.observe(&mode_changed(Some(MEDIA))),
            [DeviceCommand::SetColor(MEDIA)]
        );
        assert_eq!(
            led.observe(&mode_changed(None)),
            [DeviceCommand::SetColor(ROOT_COLOR)]
        );
    }

    #[test]
    fn test_error_flash_then_restore() {
        let mut led = LedFeedback::new();
        led.observe(&mode_changed(Some(MEDIA)));

        let flash = led.observe(&Output::Notify(Notification::error("boom")));
        assert_eq!(
            flash,
            [
                DeviceCommand::SetMode(LedEffect::Pulse),
                DeviceCommand::SetColor(ERROR_COLOR)
            ]
        );

        // Info notifications leave the flash alone
        assert!(led
            .observe(&Output::Notify(Notification::executed("x")))
            .is_empty());

        let restore = led.observe(&Output::Display(DisplayDescriptor::default()));
        assert_eq!(
            restore,
            [
                DeviceCommand::SetMode(LedEffect::Solid),
                DeviceCommand::SetColor(MEDIA)
            ]
        );
    }

    #[test]
    fn test_resync_resends() {
        let mut led = LedFeedback::new();
        led.observe(&mode_changed(None));
        assert_eq!(led.resync().len(), 2);
    }
}
