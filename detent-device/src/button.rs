//! Button gesture state machine
//!
//! Turns a debounced button level into `Press`/`Release`, `LongPress` and
//! `DoubleTap` gestures. A tap is never reported on release: it is held back
//! for the double-tap window and only emitted (as `Press` + `Release`) once
//! the window elapses without a second press.
//!
//! All elapsed-time checks use `wrapping_sub` on the millisecond tick, so a
//! counter wrap in the middle of a gesture is harmless.

use detent_protocol::EventKind;

use crate::config::ClassifierConfig;

/// Gesture states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum State {
    /// Button up, nothing pending
    Idle,
    /// Button down, long-press threshold not reached yet
    Pressed { since: u32 },
    /// Long press already emitted, waiting for release
    LongHeld,
    /// Released after a short press, deferred tap armed
    TapPending { released_at: u32 },
    /// Double tap already emitted, waiting for release
    DoubleHeld,
}

/// Level debouncer
#[derive(Debug, Clone, Copy)]
struct Debouncer {
    stable: bool,
    candidate: bool,
    since: u32,
    hold_ms: u16,
}

impl Debouncer {
    fn new(hold_ms: u16) -> Self {
        Self {
            stable: false,
            candidate: false,
            since: 0,
            hold_ms,
        }
    }

    /// Returns the stable level after taking this sample into account
    fn update(&mut self, now: u32, raw: bool) -> bool {
        if raw != self.candidate {
            self.candidate = raw;
            self.since = now;
        }

        if self.candidate != self.stable
            && now.wrapping_sub(self.since) >= u32::from(self.hold_ms)
        {
            self.stable = self.candidate;
        }

        self.stable
    }
}

/// Button classifier
///
/// At most two gestures come out of a single update.
#[derive(Debug, Clone)]
pub struct Button {
    state: State,
    debouncer: Debouncer,
    down: bool,
    long_press_ms: u32,
    double_tap_ms: u32,
}

impl Button {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            state: State::Idle,
            debouncer: Debouncer::new(config.debounce_ms),
            down: false,
            long_press_ms: u32::from(config.long_press_ms),
            double_tap_ms: u32::from(config.double_tap_ms),
        }
    }

    /// Number of taps waiting on the double-tap window (0 or 1)
    pub fn pending_tap_count(&self) -> u8 {
        match self.state {
            State::TapPending { .. } => 1,
            _ => 0,
        }
    }

    /// True while the button is (debounced) down
    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Feed the raw button level sampled at `now`
    pub fn update(&mut self, now: u32, raw_down: bool, mut emit: impl FnMut(EventKind)) {
        let level = self.debouncer.update(now, raw_down);

        // Timers first: an expired tap window or long-press threshold is
        // resolved before this sample's edge is looked at.
        match self.state {
            State::TapPending { released_at }
                if now.wrapping_sub(released_at) >= self.double_tap_ms =>
            {
                emit(EventKind::Press);
                emit(EventKind::Release);
                self.state = State::Idle;
            }
            State::Pressed { since } if now.wrapping_sub(since) >= self.long_press_ms => {
                emit(EventKind::LongPress);
                self.state = State::LongHeld;
            }
            _ => {}
        }

        if level == self.down {
            return;
        }
        self.down = level;

        self.state = if level {
            match self.state {
                State::Idle => State::Pressed { since: now },
                State::TapPending { .. } => {
                    emit(EventKind::DoubleTap);
                    State::DoubleHeld
                }
                other => other,
            }
        } else {
            match self.state {
                State::Pressed { .. } => State::TapPending { released_at: now },
                State::LongHeld => {
                    // The long-press action already fired, no tap semantics
                    emit(EventKind::Release);
                    State::Idle
                }
                State::DoubleHeld => State::Idle,
                other => other,
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn button() -> Button {
        Button::new(&ClassifierConfig {
            debounce_ms: 0,
            ..ClassifierConfig::default()
        })
    }

    /// Feed (time, level) samples and collect every gesture
    fn run(button: &mut Button, samples: &[(u32, bool)]) -> Vec<EventKind> {
        let mut out = Vec::new();
        for &(now, level) in samples {
            button.update(now, level, |e| out.push(e));
        }
        out
    }

    #[test]
    fn test_single_tap_is_deferred() {
        let mut b = button();
        let out = run(&mut b, &[(0, true), (100, false), (200, false)]);
        assert!(out.is_empty());
        assert_eq!(b.pending_tap_count(), 1);

        let out = run(&mut b, &[(400, false)]);
        assert_eq!(out, [EventKind::Press, EventKind::Release]);
        assert_eq!(b.pending_tap_count(), 0);
    }

    #[test]
    fn test_double_tap_on_second_press_down() {
        let mut b = button();
        let out = run(&mut b, &[(0, true), (80, false), (200, true)]);
        assert_eq!(out, [EventKind::DoubleTap]);

        // Release and a long wait produce nothing more
        let out = run(&mut b, &[(260, false), (2000, false)]);
        assert!(out.is_empty());
        assert_eq!(b.pending_tap_count(), 0);
    }

    #[test]
    fn test_second_press_at_window_edge_is_new_press() {
        let mut b = button();
        // Second press exactly double_tap_ms after release
        let out = run(&mut b, &[(0, true), (50, false), (350, true)]);
        assert_eq!(out, [EventKind::Press, EventKind::Release]);

        let out = run(&mut b, &[(400, false), (700, false)]);
        assert_eq!(out, [EventKind::Press, EventKind::Release]);
    }

    #[test]
    fn test_long_press_fires_once() {
        let mut b = button();
        let mut samples = Vec::new();
        for t in (0..3000).step_by(10) {
            samples.push((t, true));
        }
        let out = run(&mut b, &samples);
        assert_eq!(out, [EventKind::LongPress]);

        let out = run(&mut b, &[(3000, false), (4000, false)]);
        assert_eq!(out, [EventKind::Release]);
    }

    #[test]
    fn test_release_at_long_press_threshold() {
        let mut b = button();
        let out = run(&mut b, &[(0, true), (500, false)]);
        assert_eq!(out, [EventKind::LongPress, EventKind::Release]);
    }

    #[test]
    fn test_timing_survives_tick_wrap() {
        let mut b = button();
        let start = u32::MAX - 100;
        let out = run(
            &mut b,
            &[(start, true), (start.wrapping_add(50), false), (start.wrapping_add(150), true)],
        );
        assert_eq!(out, [EventKind::DoubleTap]);
    }

    #[test]
    fn test_debounce_rejects_chatter() {
        let mut b = Button::new(&ClassifierConfig {
            debounce_ms: 5,
            ..ClassifierConfig::default()
        });
        // 1 ms glitches never settle
        let out = run(&mut b, &[(0, true), (1, false), (2, true), (3, false), (500, false)]);
        assert!(out.is_empty());
        assert!(!b.is_down());

        // A real press settles after the hold time
        run(&mut b, &[(600, true), (605, true)]);
        assert!(b.is_down());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn second_press_inside_window_is_double_tap(
                hold in 1u32..400,
                gap in 1u32..300,
            ) {
                let mut b = button();
                let mut out = Vec::new();
                b.update(1000, true, |e| out.push(e));
                b.update(1000 + hold, false, |e| out.push(e));
                b.update(1000 + hold + gap, true, |e| out.push(e));
                b.update(1000 + hold + gap + 50, false, |e| out.push(e));
                b.update(1000 + hold + gap + 5000, false, |e| out.push(e));

                prop_assert_eq!(out, std::vec![EventKind::DoubleTap]);
            }

            #[test]
            fn long_press_emitted_exactly_once(hold in 500u32..20_000, step in 1u32..50) {
                let mut b = button();
                let mut out = Vec::new();
                let mut t = 0;
                while t < hold {
                    b.update(t, true, |e| out.push(e));
                    t += step;
                }
                b.update(hold, true, |e| out.push(e));
                b.update(hold + 1, false, |e| out.push(e));

                let longs = out.iter().filter(|e| **e == EventKind::LongPress).count();
                prop_assert_eq!(longs, 1);
                prop_assert!(!out.contains(&EventKind::Press));
                prop_assert_eq!(out.last(), Some(&EventKind::Release));
            }
        }
    }
}
