//! Combat policy engine.
//!
//! [`decide`] maps one tick's inputs to an ordered list of [`Action`]s.  It
//! holds no state and touches no device: the controller samples the sensors
//! once, calls `decide`, and executes the returned actions in order.  Every
//! threshold is read from the live [`Configuration`] on each call, so console
//! edits take effect on the next tick.

use serde::{Deserialize, Serialize};
use sumo_kernel::Configuration;
use sumo_types::{Button, ButtonSet, Color, Icon, Mode};

/// Light pulse period while closing in on a target.
pub const ATTACK_PULSE_MS: u64 = 500;

/// Ring-edge escape: back-off distance and turn angle.
pub const EDGE_REVERSE_MM: i32 = 100;
pub const EDGE_TURN_DEG: i32 = 120;

/// How long the post-strike charge is held before the next tick.
pub const RAM_CHARGE_MS: u64 = 400;

/// Beep played when a hack goes through.
pub const HACK_BEEP_HZ: u32 = 2000;
pub const HACK_BEEP_MS: u64 = 500;

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// One actuator or display command produced by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Fire-and-forget velocity command.
    Drive { speed: i32, turn_rate: i32 },
    /// Blocking straight-line move; negative is backwards.
    Straight { distance_mm: i32 },
    /// Blocking turn in place.
    Turn { degrees: i32 },
    /// Blocking weapon swing (recorded or default).
    Strike,
    PulseLight { color: Color, period_ms: u64 },
    ShowIcon { icon: Icon },
    /// Spend a hack: count it, beep and force combat-semi.
    Hack,
    /// Block the loop.
    Pause { ms: u64 },
}

/// Sensor values sampled once at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReadings {
    pub distance_mm: u32,
    pub reflection: u8,
}

impl Default for SensorReadings {
    /// Nothing in range, bright floor.
    fn default() -> Self {
        Self {
            distance_mm: u32::MAX,
            reflection: u8::MAX,
        }
    }
}

/// Everything a policy looks at besides the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyInput {
    pub mode: Mode,
    /// Remote buttons held this tick.
    pub held: ButtonSet,
    /// Remote buttons newly pressed this tick.
    pub edges: ButtonSet,
    pub readings: SensorReadings,
    pub hacks_used: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// decide
// ────────────────────────────────────────────────────────────────────────────

pub fn decide(input: &PolicyInput, cfg: &Configuration) -> Vec<Action> {
    match input.mode {
        Mode::Drive => drive(input, cfg),
        Mode::CombatSemi => engage(input.readings, cfg, false),
        Mode::CombatAuto => {
            if i32::from(input.readings.reflection) < cfg.line_threshold() {
                return vec![
                    Action::Straight {
                        distance_mm: -EDGE_REVERSE_MM,
                    },
                    Action::Turn {
                        degrees: EDGE_TURN_DEG,
                    },
                ];
            }
            engage(input.readings, cfg, cfg.ram_strategy())
        }
        Mode::Hacker => hacker(input, cfg),
    }
}

/// `+value` for `plus`, `-value` for `minus`, zero for both or neither.
fn axis(held: ButtonSet, plus: Button, minus: Button, value: i32) -> i32 {
    match (held.contains(plus), held.contains(minus)) {
        (true, false) => value,
        (false, true) => -value,
        _ => 0,
    }
}

fn drive(input: &PolicyInput, cfg: &Configuration) -> Vec<Action> {
    let speed = axis(input.held, Button::LeftPlus, Button::LeftMinus, cfg.max_speed());
    let turn_rate = axis(
        input.held,
        Button::RightPlus,
        Button::RightMinus,
        cfg.drive_turn_speed(),
    );
    let mut actions = vec![Action::Drive { speed, turn_rate }];
    if input.edges.contains(Button::Left) {
        actions.push(Action::Strike);
    }
    actions
}

fn engage(readings: SensorReadings, cfg: &Configuration, ram: bool) -> Vec<Action> {
    let distance = i64::from(readings.distance_mm);
    if distance >= i64::from(cfg.attack_distance()) {
        return vec![Action::Drive {
            speed: 0,
            turn_rate: cfg.turn_speed(),
        }];
    }

    let charge = Action::Drive {
        speed: cfg.max_speed(),
        turn_rate: 0,
    };
    let mut actions = vec![
        Action::PulseLight {
            color: Color::Red,
            period_ms: ATTACK_PULSE_MS,
        },
        charge,
    ];
    if distance < i64::from(cfg.fire_distance()) {
        actions.push(Action::Strike);
        if ram {
            actions.extend([
                Action::Straight {
                    distance_mm: -cfg.reverse_distance(),
                },
                charge,
                Action::Pause { ms: RAM_CHARGE_MS },
            ]);
        }
    }
    actions
}

fn hacker(input: &PolicyInput, cfg: &Configuration) -> Vec<Action> {
    let mut actions = vec![Action::ShowIcon {
        icon: Icon::Question,
    }];
    if input.edges.contains(Button::RightPlus) && input.hacks_used < cfg.hack_limit() {
        actions.push(Action::Hack);
    }
    actions
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
