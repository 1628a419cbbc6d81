//! Rotary Encoder Decoder
//!
//! Decodes quadrature encoder signals into detent steps.
//! Uses a state machine that only counts a step after the full two-phase
//! sequence, so contact bounce and half-turn reversals never emit.

use detent_protocol::EventKind;

/// Encoder state machine states
///
/// The encoder rests at (1,1) between detents (pull-ups, contacts open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    Rest,
    CwStep1,
    CwStep2,
    CwStep3,
    CcwStep1,
    CcwStep2,
    CcwStep3,
}

/// Quadrature decoder for one encoder
#[derive(Debug, Clone)]
pub struct Quadrature {
    state: State,
    last_a: bool,
    last_b: bool,
}

impl Quadrature {
    /// Create a decoder from the current pin levels
    pub fn new(a: bool, b: bool) -> Self {
        Self {
            state: State::Rest,
            last_a: a,
            last_b: b,
        }
    }

    /// Feed the current pin levels
    ///
    /// Returns `RotateCw` or `RotateCcw` once per completed detent.
    /// Should be called from every polling tick (1-5 ms).
    pub fn update(&mut self, a: bool, b: bool) -> Option<EventKind> {
        // No change
        if a == self.last_a && b == self.last_b {
            return None;
        }

        let step = self.decode(a, b);

        self.last_a = a;
        self.last_b = b;

        step
    }

    /// Decode encoder state
    ///
    /// CW:  A leads B: (1,1) -> (0,1) -> (0,0) -> (1,0) -> (1,1)
    /// CCW: B leads A: (1,1) -> (1,0) -> (0,0) -> (0,1) -> (1,1)
    ///
    /// A move back to the previous phase backs the state up one step, a
    /// two-bit jump (both pins changed at once) is ignored.
    fn decode(&mut self, a: bool, b: bool) -> Option<EventKind> {
        let (next, step) = match (self.state, a, b) {
            (State::Rest, false, true) => (State::CwStep1, None),
            (State::Rest, true, false) => (State::CcwStep1, None),

            (State::CwStep1, false, false) => (State::CwStep2, None),
            (State::CwStep1, true, true) => (State::Rest, None),
            (State::CwStep2, true, false) => (State::CwStep3, None),
            (State::CwStep2, false, true) => (State::CwStep1, None),
            (State::CwStep3, true, true) => (State::Rest, Some(EventKind::RotateCw)),
            (State::CwStep3, false, false) => (State::CwStep2, None),

            (State::CcwStep1, false, false) => (State::CcwStep2, None),
            (State::CcwStep1, true, true) => (State::Rest, None),
            (State::CcwStep2, false, true) => (State::CcwStep3, None),
            (State::CcwStep2, true, false) => (State::CcwStep1, None),
            (State::CcwStep3, true, true) => (State::Rest, Some(EventKind::RotateCcw)),
            (State::CcwStep3, false, false) => (State::CcwStep2, None),

            (state, _, _) => (state, None),
        };

        self.state = next;
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CW: [(bool, bool); 4] = [(false, true), (false, false), (true, false), (true, true)];
    const CCW: [(bool, bool); 4] = [(true, false), (false, false), (false, true), (true, true)];

    fn feed(q: &mut Quadrature, seq: &[(bool, bool)]) -> Option<EventKind> {
        let mut out = None;
        for &(a, b) in seq {
            if let Some(step) = q.update(a, b) {
                assert!(out.is_none(), "more than one step emitted");
                out = Some(step);
            }
        }
        out
    }

    #[test]
    fn test_full_cw_detent() {
        let mut q = Quadrature::new(true, true);
        assert_eq!(feed(&mut q, &CW), Some(EventKind::RotateCw));
    }

    #[test]
    fn test_full_ccw_detent() {
        let mut q = Quadrature::new(true, true);
        assert_eq!(feed(&mut q, &CCW), Some(EventKind::RotateCcw));
    }

    #[test]
    fn test_consecutive_detents() {
        let mut q = Quadrature::new(true, true);
        assert_eq!(feed(&mut q, &CW), Some(EventKind::RotateCw));
        assert_eq!(feed(&mut q, &CW), Some(EventKind::RotateCw));
        assert_eq!(feed(&mut q, &CCW), Some(EventKind::RotateCcw));
    }

    #[test]
    fn test_bounce_on_first_phase_rejected() {
        let mut q = Quadrature::new(true, true);
        // A chatters without B ever following
        let seq = [(false, true), (true, true), (false, true), (true, true)];
        assert_eq!(feed(&mut q, &seq), None);
    }

    #[test]
    fn test_half_turn_reversal_rejected() {
        let mut q = Quadrature::new(true, true);
        // Start CW, back off to rest before completing the detent
        let seq = [(false, true), (false, false), (false, true), (true, true)];
        assert_eq!(feed(&mut q, &seq), None);
    }

    #[test]
    fn test_bounce_mid_sequence_still_completes() {
        let mut q = Quadrature::new(true, true);
        let seq = [
            (false, true),
            (false, false),
            (false, true), // bounce back
            (false, false),
            (true, false),
            (true, true),
        ];
        assert_eq!(feed(&mut q, &seq), Some(EventKind::RotateCw));
    }

    #[test]
    fn test_two_bit_jump_ignored() {
        let mut q = Quadrature::new(true, true);
        // (1,1) -> (0,0) is electrically impossible for a clean encoder
        assert_eq!(q.update(false, false), None);
        assert_eq!(q.update(true, true), None);
    }

    #[test]
    fn test_repeated_level_is_noop() {
        let mut q = Quadrature::new(true, true);
        assert_eq!(q.update(true, true), None);
        assert_eq!(q.update(true, true), None);
    }
}
