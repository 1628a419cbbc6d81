//! Navigation state owned by the menu state machine

use crate::mode::{ModeId, Selection};

/// One pushed mode
///
/// The handler itself lives in the machine's handler table under `mode`;
/// the frame only carries what is local to this visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub mode: ModeId,
    pub selection: Selection,
}

/// Everything the state machine mutates
///
/// The root "normal" frame is implicit: an empty `frames` stack means the
/// command list is active, so it can never be popped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Selected command, always below the registry length (0 when empty)
    pub current_command_index: usize,
    /// Pushed modes, innermost last
    pub frames: Vec<Frame>,
    /// Last absolute rotation index received from the device
    pub last_rotation_index: usize,
    /// Host time of the last gesture handled inside a mode
    pub last_activity_ms: u64,
}

impl AppState {
    /// Stack depth counting the root frame
    pub fn depth(&self) -> usize {
        self.frames.len() + 1
    }

    pub fn is_root(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }
}
