//! [`FallMonitor`] – overturn detection and the forfeit countdown.
//!
//! The robot is upright while the orientation sensor reports
//! [`REFERENCE_FACE`] pointing up.  Anything else starts a fall episode:
//! the stopwatch is reset exactly once on the upright → fallen edge and the
//! robot gets [`GRACE_PERIOD_MS`] to recover before the match is lost.
//!
//! The monitor only decides; the caller turns each [`FallEvent`] into
//! actuator and display commands.

use serde::{Deserialize, Serialize};
use sumo_hal::clock::{Clock, StopWatch};
use sumo_types::Face;
use tracing::info;

/// Hub face that points up when the robot is on its wheels.
pub const REFERENCE_FACE: Face = Face::Front;

/// Time allowed to get back up before defeat is declared.
pub const GRACE_PERIOD_MS: u64 = 9000;

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// What happens after the grace period runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeatPolicy {
    /// Keep polling and clear the episode once the robot is upright again.
    #[default]
    AutoRecover,
    /// Stay defeated for the rest of the session.
    Latch,
}

/// Outcome of one [`FallMonitor::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallEvent {
    /// Upright, nothing to do.
    Upright,
    /// The robot has just gone over.  Halt the drive now.
    Fell { remaining_s: u8 },
    /// Still down, inside the grace period.
    Countdown { remaining_s: u8 },
    /// Grace period expired on this tick.  Reported once per episode.
    Defeated,
    /// Still down after defeat.
    Down,
    /// Back on the wheels.  Restore the mode indicator.
    Recovered,
}

impl FallEvent {
    /// Whether actuation must stay suppressed this tick.
    pub fn is_fallen(self) -> bool {
        !matches!(self, FallEvent::Upright | FallEvent::Recovered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Upright,
    Fallen { since: StopWatch },
    Defeated,
}

// ────────────────────────────────────────────────────────────────────────────
// FallMonitor
// ────────────────────────────────────────────────────────────────────────────

/// Tracks one fall episode at a time.
///
/// # Example
///
/// ```
/// use sumo_hal::clock::Clock;
/// use sumo_hal::sim::SimWorld;
/// use sumo_kernel::fall_monitor::{DefeatPolicy, FallEvent, FallMonitor};
/// use sumo_types::Face;
///
/// let world = SimWorld::new();
/// let mut clock = world.clock();
/// let mut monitor = FallMonitor::new(DefeatPolicy::AutoRecover);
///
/// assert_eq!(monitor.update(Face::Top, &clock), FallEvent::Fell { remaining_s: 9 });
/// clock.wait(9000);
/// assert_eq!(monitor.update(Face::Top, &clock), FallEvent::Defeated);
/// assert_eq!(monitor.update(Face::Front, &clock), FallEvent::Recovered);
/// ```
#[derive(Debug)]
pub struct FallMonitor {
    policy: DefeatPolicy,
    phase: Phase,
}

impl FallMonitor {
    pub fn new(policy: DefeatPolicy) -> Self {
        Self {
            policy,
            phase: Phase::Upright,
        }
    }

    pub fn policy(&self) -> DefeatPolicy {
        self.policy
    }

    /// Whether a fall episode (countdown or defeat) is in progress.
    pub fn is_fallen(&self) -> bool {
        self.phase != Phase::Upright
    }

    /// Feed the face currently pointing up and advance the episode.
    pub fn update(&mut self, up: Face, clock: &dyn Clock) -> FallEvent {
        let upright = up == REFERENCE_FACE;
        match self.phase {
            Phase::Upright if upright => FallEvent::Upright,
            Phase::Upright => {
                info!(face = ?up, "robot overturned; countdown started");
                self.phase = Phase::Fallen {
                    since: StopWatch::started(clock),
                };
                match self.countdown(clock) {
                    FallEvent::Countdown { remaining_s } => FallEvent::Fell { remaining_s },
                    other => other,
                }
            }
            Phase::Fallen { .. } if upright => {
                info!("robot back on its wheels");
                self.phase = Phase::Upright;
                FallEvent::Recovered
            }
            Phase::Fallen { .. } => self.countdown(clock),
            Phase::Defeated if upright && self.policy == DefeatPolicy::AutoRecover => {
                info!("robot recovered after defeat");
                self.phase = Phase::Upright;
                FallEvent::Recovered
            }
            Phase::Defeated => FallEvent::Down,
        }
    }

    fn countdown(&mut self, clock: &dyn Clock) -> FallEvent {
        let Phase::Fallen { since } = self.phase else {
            return FallEvent::Down;
        };
        let elapsed = since.elapsed_ms(clock);
        if elapsed < GRACE_PERIOD_MS {
            let remaining_s = ((GRACE_PERIOD_MS - elapsed) / 1000) as u8;
            FallEvent::Countdown { remaining_s }
        } else {
            info!(elapsed_ms = elapsed, "grace period expired; match lost");
            self.phase = Phase::Defeated;
            FallEvent::Defeated
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sumo_hal::sim::SimWorld;

    const TICK_MS: u64 = 20;

    /// Run `ticks` loop iterations lying on `face` and collect the events.
    fn run(
        monitor: &mut FallMonitor,
        world: &SimWorld,
        face: Face,
        ticks: usize,
    ) -> Vec<FallEvent> {
        let mut clock = world.clock();
        (0..ticks)
            .map(|_| {
                let ev = monitor.update(face, &clock);
                clock.wait(TICK_MS);
                ev
            })
            .collect()
    }

    #[test]
    fn upright_robot_reports_nothing() {
        let world = SimWorld::new();
        let mut monitor = FallMonitor::new(DefeatPolicy::AutoRecover);
        let events = run(&mut monitor, &world, Face::Front, 50);
        assert!(events.iter().all(|e| *e == FallEvent::Upright));
        assert!(!monitor.is_fallen());
    }

    #[test]
    fn rising_edge_reported_once() {
        let world = SimWorld::new();
        let mut monitor = FallMonitor::new(DefeatPolicy::AutoRecover);
        let events = run(&mut monitor, &world, Face::Back, 10);
        assert_eq!(events[0], FallEvent::Fell { remaining_s: 9 });
        let fells = events
            .iter()
            .filter(|e| matches!(e, FallEvent::Fell { .. }))
            .count();
        assert_eq!(fells, 1);
        assert!(monitor.is_fallen());
    }

    #[test]
    fn defeat_declared_exactly_once_after_grace() {
        let world = SimWorld::new();
        let mut monitor = FallMonitor::new(DefeatPolicy::AutoRecover);
        // 12 s lying on its side.
        let events = run(&mut monitor, &world, Face::Left, 600);

        let defeat_at = events
            .iter()
            .position(|e| *e == FallEvent::Defeated)
            .expect("defeat must be declared");
        assert_eq!(defeat_at as u64 * TICK_MS, GRACE_PERIOD_MS);
        assert_eq!(
            events.iter().filter(|e| **e == FallEvent::Defeated).count(),
            1
        );
        assert!(events[defeat_at + 1..].iter().all(|e| *e == FallEvent::Down));
    }

    #[test]
    fn countdown_is_monotonic_and_positive() {
        let world = SimWorld::new();
        let mut monitor = FallMonitor::new(DefeatPolicy::AutoRecover);
        let events = run(&mut monitor, &world, Face::Top, 449);
        let mut last = u8::MAX;
        for ev in events {
            if let FallEvent::Countdown { remaining_s } | FallEvent::Fell { remaining_s } = ev {
                assert!(remaining_s <= last);
                last = remaining_s;
            } else {
                panic!("unexpected {ev:?} inside grace period");
            }
        }
    }

    #[test]
    fn recovery_before_grace_clears_episode() {
        let world = SimWorld::new();
        let mut monitor = FallMonitor::new(DefeatPolicy::AutoRecover);
        run(&mut monitor, &world, Face::Bottom, 200); // 4 s down
        let events = run(&mut monitor, &world, Face::Front, 3);
        assert_eq!(events[0], FallEvent::Recovered);
        assert_eq!(events[1], FallEvent::Upright);
        assert!(!monitor.is_fallen());
    }

    #[test]
    fn second_fall_restarts_timer() {
        let world = SimWorld::new();
        let mut monitor = FallMonitor::new(DefeatPolicy::AutoRecover);
        run(&mut monitor, &world, Face::Back, 400); // 8 s
        run(&mut monitor, &world, Face::Front, 1);
        let events = run(&mut monitor, &world, Face::Back, 400); // another 8 s
        assert!(!events.contains(&FallEvent::Defeated));
    }

    #[test]
    fn auto_recover_clears_after_defeat() {
        let world = SimWorld::new();
        let mut monitor = FallMonitor::new(DefeatPolicy::AutoRecover);
        run(&mut monitor, &world, Face::Back, 500);
        let events = run(&mut monitor, &world, Face::Front, 1);
        assert_eq!(events[0], FallEvent::Recovered);
        assert!(!monitor.is_fallen());
    }

    #[test]
    fn latch_policy_stays_defeated() {
        let world = SimWorld::new();
        let mut monitor = FallMonitor::new(DefeatPolicy::Latch);
        run(&mut monitor, &world, Face::Back, 500);
        let events = run(&mut monitor, &world, Face::Front, 50);
        assert!(events.iter().all(|e| *e == FallEvent::Down));
        assert!(monitor.is_fallen());
    }

    #[test]
    fn fallen_events_suppress_actuation() {
        assert!(FallEvent::Fell { remaining_s: 9 }.is_fallen());
        assert!(FallEvent::Defeated.is_fallen());
        assert!(FallEvent::Down.is_fallen());
        assert!(!FallEvent::Recovered.is_fallen());
        assert!(!FallEvent::Upright.is_fallen());
    }
}
