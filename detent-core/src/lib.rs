//! Host-side navigation core for the detent encoder
//!
//! This crate turns decoded device gestures into menu navigation:
//!
//! - Command registry (the root list)
//! - Mode handler contract and stock modes (direct, submenu, cyclic list)
//! - Menu state machine with a frame stack and an inactivity timeout
//! - Rotation direction inference from absolute indices
//! - Display descriptors and notifications for an external renderer
//! - Host configuration
//!
//! Nothing here does I/O or spawns threads; the caller feeds events and
//! ticks with an explicit timestamp and drains the resulting outputs.

pub mod config;
pub mod direction;
pub mod display;
pub mod error;
pub mod machine;
pub mod mode;
pub mod registry;

pub use config::{Config, DeviceConfig, RotationEncoding};
pub use direction::{infer_direction, Direction, Inferred};
pub use display::{DisplayDescriptor, Icons, Notification, NotificationLevel};
pub use error::{ActionError, ConfigError, RegistryError};
pub use machine::{AppState, Frame, MenuStateMachine, Output};
pub use mode::{ModeHandler, ModeId, PressOutcome, Selection};
pub use registry::{Command, CommandOutcome, CommandRegistry};
