//! Mode handler contract and the stock handlers
//!
//! A mode is a flat implementation of [`ModeHandler`]. The state machine
//! owns the handler and the per-frame [`Selection`]; a handler only gets to
//! touch that selection through the `&mut` it is handed, and only sees it
//! committed when the call returns `Ok`.

pub mod cyclic;
pub mod direct;
pub mod submenu;

use std::borrow::Borrow;
use std::fmt;

use detent_protocol::Rgb;

use crate::direction::Direction;
use crate::display::DisplayDescriptor;
use crate::error::ActionError;

pub use cyclic::CyclicHandler;
pub use direct::{DirectHandler, Gauge};
pub use submenu::{SubmenuEntry, SubmenuHandler};

/// Name a mode handler is registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModeId(String);

impl ModeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ModeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cursor into a mode's local list
///
/// `index` is kept below `len`; a zero-length selection pins the index at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    index: usize,
    len: usize,
}

impl Selection {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resize, clamping the index to the new bound
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.clamp();
    }

    /// Jump to `index`, clamped to the last entry
    pub fn select(&mut self, index: usize) {
        self.index = index;
        self.clamp();
    }

    /// Move one entry, wrapping at both ends
    pub fn step(&mut self, direction: Direction) {
        self.index = direction.step(self.index, self.len);
    }

    pub(crate) fn clamp(&mut self) {
        if self.len == 0 {
            self.index = 0;
        } else if self.index >= self.len {
            self.index = self.len - 1;
        }
    }
}

/// Result of a press inside a mode
#[derive(Debug, Clone, PartialEq)]
pub enum PressOutcome {
    /// Remain in this mode and redisplay
    Stay(DisplayDescriptor),
    /// Push a child mode on top of this one
    EnterSubmode(ModeId),
    /// Pop this mode
    Exit,
}

/// Behaviour of one menu mode
///
/// Every method that can fail returns `Err` instead of touching navigation
/// state; the state machine turns the error (or a panic) into a
/// notification and leaves the stack where it was.
pub trait ModeHandler: Send {
    /// Called when a frame for this mode is pushed
    ///
    /// The selection starts at `Selection::default()`; set its length here.
    fn on_enter(&mut self, selection: &mut Selection) -> Result<DisplayDescriptor, ActionError>;

    /// Called once when the frame is popped, by cancel, exit or timeout
    fn on_exit(&mut self, _selection: &Selection) -> Result<(), ActionError> {
        Ok(())
    }

    fn on_rotation(
        &mut self,
        selection: &mut Selection,
        direction: Direction,
    ) -> Result<DisplayDescriptor, ActionError>;

    fn on_press(&mut self, selection: &mut Selection) -> Result<PressOutcome, ActionError>;

    /// Alternate action; `Ok(None)` means the mode has none and the gesture
    /// is ignored
    fn on_long_press(
        &mut self,
        _selection: &mut Selection,
    ) -> Result<Option<PressOutcome>, ActionError> {
        Ok(None)
    }

    /// Redraw without changing anything, used when a child mode pops back
    fn render(&self, selection: &Selection) -> DisplayDescriptor;

    /// LED colour while this mode is on top
    fn accent(&self) -> Option<Rgb> {
        None
    }
}
