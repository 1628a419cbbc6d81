//! Rotation direction
//!
//! The firmware reports rotation as an absolute index in `[0, N)`. The host
//! only sees consecutive samples, so the direction of a step has to be
//! recovered from the pair `(prev, curr)`:
//!
//! - `curr == prev + 1 (mod N)` is clockwise
//! - `curr == prev - 1 (mod N)` is counter-clockwise
//! - any larger jump means packets were lost; the shorter arc wins, and an
//!   exact half turn resolves to clockwise

use detent_protocol::EventKind;

/// Direction of one detent step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Cw,
    Ccw,
}

impl Direction {
    /// Direction carried by a rotation event kind
    pub fn from_kind(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::RotateCw => Some(Direction::Cw),
            EventKind::RotateCcw => Some(Direction::Ccw),
            _ => None,
        }
    }

    /// Move `index` one step in this direction, wrapping within `len`
    ///
    /// An empty range always yields 0.
    pub fn step(self, index: usize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let index = index % len;
        match self {
            Direction::Cw => (index + 1) % len,
            Direction::Ccw => (index + len - 1) % len,
        }
    }
}

/// Result of comparing two absolute rotation samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inferred {
    pub direction: Direction,
    /// Detents along the chosen arc, 1 for an adjacent step
    pub distance: usize,
}

impl Inferred {
    /// True when the step skipped one or more indices
    pub fn is_skip(&self) -> bool {
        self.distance > 1
    }
}

/// Infer the direction of travel from `prev` to `curr` modulo `modulus`
///
/// Returns `None` when the two samples are the same position (which includes
/// every pair when `modulus < 2`).
pub fn infer_direction(prev: usize, curr: usize, modulus: usize) -> Option<Inferred> {
    if modulus < 2 {
        return None;
    }
    let prev = prev % modulus;
    let curr = curr % modulus;
    if prev == curr {
        return None;
    }

    let forward = (curr + modulus - prev) % modulus;
    let backward = modulus - forward;

    Some(if forward <= backward {
        Inferred {
            direction: Direction::Cw,
            distance: forward,
        }
    } else {
        Inferred {
            direction: Direction::Ccw,
            distance: backward,
        }
    })
}
