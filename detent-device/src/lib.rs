//! Device-side gesture classification for the detent encoder
//!
//! This crate contains all encoder firmware logic that does not depend on
//! specific hardware:
//!
//! - Quadrature decoding with bounce rejection
//! - Button gesture state machine (tap, long press, double tap)
//! - Absolute position index sent with every rotation
//! - LED indicator state driven by host commands
//!
//! A firmware samples its pins from a timer tick and calls
//! [`GestureClassifier::poll`]; every returned event is encoded with
//! [`detent_protocol::Event::encode`] and written to the HID endpoint.
//! Nothing here blocks or allocates.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod button;
pub mod classifier;
pub mod config;
pub mod indicator;
pub mod quadrature;

pub use classifier::{Emitted, GestureClassifier, MAX_EVENTS_PER_POLL};
pub use config::ClassifierConfig;
pub use indicator::Indicator;
