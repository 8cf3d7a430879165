//! Button-edge and press-duration helpers shared by the loop and the console.
//!
//! Buttons are sampled once per tick.  An *edge* is a button present in this
//! tick's sample but not the previous one; everything that should fire once
//! per physical press (mode cycling, strikes, hacks, closing an editor) is
//! driven by edges, never by the held state.

use sumo_hal::clock::{Clock, StopWatch};
use sumo_types::ButtonSet;

/// Hold time that turns a press of the console button into a long press.
pub const LONG_PRESS_MS: u64 = 1500;

/// Buttons newly pressed between two consecutive samples.
pub fn pressed_edges(prev: ButtonSet, cur: ButtonSet) -> ButtonSet {
    cur.difference(prev)
}

// ────────────────────────────────────────────────────────────────────────────
// InputEdges
// ────────────────────────────────────────────────────────────────────────────

/// The current and previous button samples of one input device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEdges {
    prev: ButtonSet,
    cur: ButtonSet,
}

impl InputEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift in a new sample and return its edges.
    pub fn update(&mut self, sample: ButtonSet) -> ButtonSet {
        self.prev = self.cur;
        self.cur = sample;
        self.edges()
    }

    pub fn held(&self) -> ButtonSet {
        self.cur
    }

    pub fn edges(&self) -> ButtonSet {
        pressed_edges(self.prev, self.cur)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HoldDetector
// ────────────────────────────────────────────────────────────────────────────

/// Classification of a completed or ongoing press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Released before the threshold.
    Short,
    /// Held past the threshold.  Fires once, while still held.
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Released,
    Pressed { since: StopWatch },
    /// Press already consumed; ignore it until it is released.
    Spent,
}

/// Distinguishes short presses from long presses of a single button.
///
/// A press that has produced a [`Gesture::Long`] (or that was in progress
/// when the detector was [disarmed][Self::disarm]) produces nothing more
/// until the button is released, so one physical press never yields two
/// gestures.
#[derive(Debug, Clone, Copy)]
pub struct HoldDetector {
    threshold_ms: u64,
    state: HoldState,
}

impl HoldDetector {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms,
            state: HoldState::Released,
        }
    }

    /// Ignore the press in progress, if any.
    pub fn disarm(&mut self) {
        self.state = HoldState::Spent;
    }

    pub fn update(&mut self, held: bool, clock: &dyn Clock) -> Option<Gesture> {
        match (self.state, held) {
            (HoldState::Released, true) => {
                self.state = HoldState::Pressed {
                    since: StopWatch::started(clock),
                };
                None
            }
            (HoldState::Pressed { since }, true) => {
                if since.elapsed_ms(clock) >= self.threshold_ms {
                    self.state = HoldState::Spent;
                    Some(Gesture::Long)
                } else {
                    None
                }
            }
            (HoldState::Pressed { .. }, false) => {
                self.state = HoldState::Released;
                Some(Gesture::Short)
            }
            (HoldState::Spent, false) => {
                self.state = HoldState::Released;
                None
            }
            (HoldState::Released, false) | (HoldState::Spent, true) => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cooldown
// ────────────────────────────────────────────────────────────────────────────

/// Rate limiter for auto-repeat while a button is held.
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    period_ms: u64,
    last: Option<StopWatch>,
}

impl Cooldown {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last: None,
        }
    }

    /// Forget the last firing so the next [`ready`][Self::ready] passes.
    /// Called when the button is released, so a fresh press acts at once.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// `true` (and restart the period) when the previous firing is at least
    /// one period old.
    pub fn ready(&mut self, clock: &dyn Clock) -> bool {
        let ready = self
            .last
            .is_none_or(|w| w.elapsed_ms(clock) >= self.period_ms);
        if ready {
            self.last = Some(StopWatch::started(clock));
        }
        ready
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
