//! Gesture classifier
//!
//! Combines the quadrature decoder and the button state machine into the
//! single entry point a firmware calls from its polling tick. Each call does
//! a bounded amount of work and writes into a fixed-capacity buffer.

use heapless::Vec;

use detent_protocol::{Event, EventKind};

use crate::button::Button;
use crate::config::ClassifierConfig;
use crate::quadrature::Quadrature;

/// Upper bound of events one poll can produce
///
/// One rotation step plus at most two button gestures.
pub const MAX_EVENTS_PER_POLL: usize = 4;

/// Events produced by one poll
pub type Emitted = Vec<Event, MAX_EVENTS_PER_POLL>;

/// Gesture classifier for one encoder with push button
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    quadrature: Quadrature,
    button: Button,
    slots: u8,
    position: u8,
    source_id: u8,
}

impl GestureClassifier {
    /// Create a classifier from the configuration and the current pin levels
    pub fn new(config: &ClassifierConfig, a: bool, b: bool) -> Self {
        Self {
            quadrature: Quadrature::new(a, b),
            button: Button::new(config),
            slots: config.slots.max(1),
            position: 0,
            source_id: 0,
        }
    }

    /// Current absolute position index in `[0, slots)`
    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn slots(&self) -> u8 {
        self.slots
    }

    /// Change the number of selectable slots, keeping the position in range
    pub fn set_slots(&mut self, slots: u8) {
        self.slots = slots.max(1);
        self.position %= self.slots;
    }

    /// Taps waiting on the double-tap window (0 or 1)
    pub fn pending_tap_count(&self) -> u8 {
        self.button.pending_tap_count()
    }

    /// Sample the encoder and button at tick `now` (milliseconds)
    pub fn poll(&mut self, now: u32, a: bool, b: bool, button_down: bool) -> Emitted {
        let mut emitted = Emitted::new();
        // Low 16 bits of the tick, wraps on the wire
        let timestamp = now as u16;

        if let Some(kind) = self.quadrature.update(a, b) {
            self.advance(kind);
            let _ = emitted.push(self.event(kind, timestamp));
        }

        let position = self.position;
        let source_id = self.source_id;
        self.button.update(now, button_down, |kind| {
            let _ = emitted.push(Event {
                kind,
                source_id,
                value: position,
                timestamp,
            });
        });

        emitted
    }

    fn advance(&mut self, kind: EventKind) {
        self.position = match kind {
            EventKind::RotateCw => {
                if self.position + 1 >= self.slots {
                    0
                } else {
                    self.position + 1
                }
            }
            EventKind::RotateCcw => {
                if self.position == 0 {
                    self.slots - 1
                } else {
                    self.position - 1
                }
            }
            _ => self.position,
        };
    }

    fn event(&self, kind: EventKind, timestamp: u16) -> Event {
        Event {
            kind,
            source_id: self.source_id,
            value: self.position,
            timestamp,
        }
    }
}
