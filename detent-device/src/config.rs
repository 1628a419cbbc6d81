//! Classifier thresholds

/// Default hold time before a press becomes a long press
pub const DEFAULT_LONG_PRESS_MS: u16 = 500;

/// Default window for the second press of a double tap
pub const DEFAULT_DOUBLE_TAP_MS: u16 = 300;

/// Default time a button level must be stable before it counts
pub const DEFAULT_DEBOUNCE_MS: u16 = 5;

/// Default number of host-visible selectable slots
pub const DEFAULT_SLOTS: u8 = 4;

/// Gesture classifier configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassifierConfig {
    pub long_press_ms: u16,
    pub double_tap_ms: u16,
    pub debounce_ms: u16,
    /// Modulus of the absolute position index sent with rotations
    pub slots: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            double_tap_ms: DEFAULT_DOUBLE_TAP_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            slots: DEFAULT_SLOTS,
        }
    }
}
