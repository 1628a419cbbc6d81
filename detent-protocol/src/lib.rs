//! Detent Encoder Packet Protocol
//!
//! This crate defines the packets exchanged between the encoder firmware
//! (gesture classifier) and the host menu daemon. Both directions use the
//! same fixed-size report, shared on one HID endpoint with an unrelated
//! configuration protocol.
//!
//! # Protocol Overview
//!
//! Every packet is exactly 32 bytes:
//! ```text
//! ┌────────┬──────┬────────┬───────┬───────────┬──────────────┐
//! │ MARKER │ TYPE │ SOURCE │ VALUE │ TIMESTAMP │ PADDING      │
//! │ 1B     │ 1B   │ 1B     │ 1B    │ 2B (LE)   │ 26B (zeroed) │
//! └────────┴──────┴────────┴───────┴───────────┴──────────────┘
//! ```
//!
//! The marker byte tells our traffic apart from the configuration protocol.
//! Packets with a foreign marker are not errors, they simply belong to
//! someone else. Host → device commands carry no acknowledgement and must be
//! idempotent.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod event;
pub mod packet;

pub use command::{DeviceCommand, LedEffect, Rgb};
pub use event::{Event, EventKind};
pub use packet::{DecodeError, Packet, COMMAND_MARKER, EVENT_MARKER, HEADER_SIZE, PACKET_SIZE};
