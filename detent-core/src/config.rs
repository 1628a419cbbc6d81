//! Host configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file at all) is a valid configuration.
//!
//! ```toml
//! menu_timeout_ms = 8000
//! rotation_encoding = "relative"
//!
//! [device]
//! vendor_id = 0x3434
//! product_id = 0x0311
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Upper bound for the event queue
pub const MAX_QUEUE_CAPACITY: usize = 100;

/// Upper bound for one blocking read
pub const MAX_READ_TIMEOUT_MS: u64 = 1000;

/// Position slots the firmware wraps its rotation index at
pub const DEFAULT_ROTATION_SLOTS: usize = 4;

/// How the device reports rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationEncoding {
    /// Event value is an index modulo the slot count; direction is inferred
    #[default]
    Absolute,
    /// Event kind carries the direction, the value is ignored
    Relative,
}

/// USB HID identification of the encoder's raw endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0x3434,
            product_id: 0x0311,
            usage_page: 0xFF60,
            usage: 0x61,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device-side long-press threshold, reported for reference
    pub long_press_ms: u16,
    /// Device-side double-tap window
    pub double_tap_ms: u16,
    /// Inactivity before the menu drops back to the command list
    pub menu_timeout_ms: u64,
    pub queue_capacity: usize,
    pub reconnect_interval_ms: u64,
    pub read_timeout_ms: u64,
    pub tick_interval_ms: u64,
    /// Modulus of the device's absolute rotation index; must match the
    /// firmware's slot count, not the number of commands
    pub rotation_slots: usize,
    pub rotation_encoding: RotationEncoding,
    pub led_feedback: bool,
    pub device: DeviceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            double_tap_ms: 300,
            menu_timeout_ms: 5000,
            queue_capacity: 64,
            reconnect_interval_ms: 2000,
            read_timeout_ms: 100,
            tick_interval_ms: 500,
            rotation_slots: DEFAULT_ROTATION_SLOTS,
            rotation_encoding: RotationEncoding::Absolute,
            led_feedback: true,
            device: DeviceConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_QUEUE_CAPACITY).contains(&self.queue_capacity) {
            return Err(ConfigError::Invalid("queue_capacity must be within 1..=100"));
        }
        if !(1..=MAX_READ_TIMEOUT_MS).contains(&self.read_timeout_ms) {
            return Err(ConfigError::Invalid("read_timeout_ms must be within 1..=1000"));
        }
        if self.menu_timeout_ms == 0 {
            return Err(ConfigError::Invalid("menu_timeout_ms must be non-zero"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be non-zero"));
        }
        if self.reconnect_interval_ms == 0 {
            return Err(ConfigError::Invalid("reconnect_interval_ms must be non-zero"));
        }
        if self.rotation_slots < 2 {
            return Err(ConfigError::Invalid("rotation_slots must be at least 2"));
        }
        if self.double_tap_ms == 0 || self.long_press_ms == 0 {
            return Err(ConfigError::Invalid("gesture thresholds must be non-zero"));
        }
        Ok(())
    }
}
