//! [`Configuration`] – the session's bounded parameter store.
//!
//! Every numeric parameter has a documented `[min, max]` range and a step
//! size ([`Param::bounds`]).  Values are clamped at the moment they are
//! written, whether the write comes from a startup [`ConfigPreset`] or from
//! the engineering console, so no reader ever observes an out-of-range value.
//! Out-of-range writes are never errors; they saturate silently.
//!
//! # Read vs. write access
//!
//! Readers (combat policies, the weapon controller, the main loop) receive a
//! shared `&Configuration` and only see getters.  Mutation goes through a
//! [`ConfigEditor`], obtained with [`Configuration::editor`], which only the
//! engineering console asks for.
//!
//! Nothing here is persisted: the store lives for one session.

use serde::{Deserialize, Serialize};
use sumo_types::DigitStyle;
use tracing::{debug, warn};

// ────────────────────────────────────────────────────────────────────────────
// Parameters
// ────────────────────────────────────────────────────────────────────────────

/// Inclusive range, step and default of a numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub default: i32,
}

impl Bounds {
    const fn new(min: i32, max: i32, step: i32, default: i32) -> Self {
        Self {
            min,
            max,
            step,
            default,
        }
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// Named numeric parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    /// Top drive speed (mm/s).
    MaxSpeed,
    /// Drive acceleration (mm/s²).
    Acceleration,
    /// Search rotation speed and drive-base turn rate (deg/s).
    TurnSpeed,
    /// Manual turn rate in drive mode (deg/s).
    DriveTurnSpeed,
    /// Weapon motor speed (deg/s).
    StrikeSpeed,
    /// Default swing angle when no recording is installed (deg).
    StrikeAngle,
    /// A target closer than this is attacked (mm).
    AttackDistance,
    /// A target closer than this is struck (mm).
    FireDistance,
    /// Ram-strategy back-off distance (mm).
    ReverseDistance,
    /// Floor reflectance below this is the ring boundary (%).
    LineThreshold,
    /// Speaker volume, 0–10.
    Volume,
    /// Startup face, 1–5.
    Personality,
    /// Hacks allowed per session.
    HackLimit,
    /// Mandatory pause before the first tick (ms).
    StartupDelayMs,
}

impl Param {
    pub const COUNT: usize = 14;

    pub const ALL: [Param; Self::COUNT] = [
        Param::MaxSpeed,
        Param::Acceleration,
        Param::TurnSpeed,
        Param::DriveTurnSpeed,
        Param::StrikeSpeed,
        Param::StrikeAngle,
        Param::AttackDistance,
        Param::FireDistance,
        Param::ReverseDistance,
        Param::LineThreshold,
        Param::Volume,
        Param::Personality,
        Param::HackLimit,
        Param::StartupDelayMs,
    ];

    pub fn bounds(self) -> Bounds {
        match self {
            Param::MaxSpeed => Bounds::new(100, 1000, 50, 650),
            Param::Acceleration => Bounds::new(100, 1000, 50, 600),
            Param::TurnSpeed => Bounds::new(50, 800, 50, 150),
            Param::DriveTurnSpeed => Bounds::new(100, 1000, 50, 450),
            Param::StrikeSpeed => Bounds::new(200, 1500, 50, 1000),
            Param::StrikeAngle => Bounds::new(45, 180, 5, 180),
            Param::AttackDistance => Bounds::new(50, 2000, 10, 300),
            Param::FireDistance => Bounds::new(20, 1000, 10, 100),
            Param::ReverseDistance => Bounds::new(0, 500, 10, 150),
            Param::LineThreshold => Bounds::new(0, 100, 1, 35),
            Param::Volume => Bounds::new(0, 10, 1, 4),
            Param::Personality => Bounds::new(1, 5, 1, 5),
            Param::HackLimit => Bounds::new(1, 3, 1, 1),
            Param::StartupDelayMs => Bounds::new(0, 10_000, 500, 3000),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Param::MaxSpeed => "max_speed",
            Param::Acceleration => "acceleration",
            Param::TurnSpeed => "turn_speed",
            Param::DriveTurnSpeed => "drive_turn_speed",
            Param::StrikeSpeed => "strike_speed",
            Param::StrikeAngle => "strike_angle",
            Param::AttackDistance => "attack_distance",
            Param::FireDistance => "fire_distance",
            Param::ReverseDistance => "reverse_distance",
            Param::LineThreshold => "line_threshold",
            Param::Volume => "volume",
            Param::Personality => "personality",
            Param::HackLimit => "hack_limit",
            Param::StartupDelayMs => "startup_delay_ms",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Boolean switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Back off and re-charge after every autonomous strike.
    RamStrategy,
    /// Blank the display while in autonomous combat.
    GhostMode,
    /// Render both digits overlaid instead of the ones digit only.
    DoubleVision,
    /// Allow the console to capture hand-guided weapon motions.
    Puppeteering,
}

/// Default gear table: precision, exploration, turbo (mm/s).
pub const DEFAULT_GEARS: [i32; 3] = [350, 650, 1000];

const DEFAULT_GEAR: usize = 1;

// ────────────────────────────────────────────────────────────────────────────
// Weapon recording
// ────────────────────────────────────────────────────────────────────────────

/// Captures with this many samples or fewer are rejected as accidental.
pub const MIN_RECORDING_SAMPLES: usize = 5;

/// A hand-guided weapon motion: ordered signed angle samples in degrees.
///
/// An empty recording means "use the default swing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaponRecording {
    samples: Vec<i32>,
}

impl WeaponRecording {
    /// Accept `samples` only when there are more than
    /// [`MIN_RECORDING_SAMPLES`] of them.
    pub fn from_samples(samples: Vec<i32>) -> Option<Self> {
        (samples.len() > MIN_RECORDING_SAMPLES).then_some(Self { samples })
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Preset
// ────────────────────────────────────────────────────────────────────────────

/// Optional starting values, typically deserialised from a TOML file.
/// Missing fields keep their defaults; present fields are clamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigPreset {
    pub max_speed: Option<i32>,
    pub acceleration: Option<i32>,
    pub turn_speed: Option<i32>,
    pub drive_turn_speed: Option<i32>,
    pub strike_speed: Option<i32>,
    pub strike_angle: Option<i32>,
    pub attack_distance: Option<i32>,
    pub fire_distance: Option<i32>,
    pub reverse_distance: Option<i32>,
    pub line_threshold: Option<i32>,
    pub volume: Option<i32>,
    pub personality: Option<i32>,
    pub hack_limit: Option<i32>,
    pub startup_delay_ms: Option<i32>,
    /// 2–3 speed presets.
    pub gears: Option<Vec<i32>>,
    /// Index into `gears`; selects `max_speed` unless that is set explicitly.
    pub gear: Option<usize>,
    pub ram_strategy: Option<bool>,
    pub ghost_mode: Option<bool>,
    pub double_vision: Option<bool>,
    pub puppeteering: Option<bool>,
}

impl ConfigPreset {
    fn value(&self, param: Param) -> Option<i32> {
        match param {
            Param::MaxSpeed => self.max_speed,
            Param::Acceleration => self.acceleration,
            Param::TurnSpeed => self.turn_speed,
            Param::DriveTurnSpeed => self.drive_turn_speed,
            Param::StrikeSpeed => self.strike_speed,
            Param::StrikeAngle => self.strike_angle,
            Param::AttackDistance => self.attack_distance,
            Param::FireDistance => self.fire_distance,
            Param::ReverseDistance => self.reverse_distance,
            Param::LineThreshold => self.line_threshold,
            Param::Volume => self.volume,
            Param::Personality => self.personality,
            Param::HackLimit => self.hack_limit,
            Param::StartupDelayMs => self.startup_delay_ms,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// The live parameter set for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    values: [i32; Param::COUNT],
    gears: Vec<i32>,
    gear: usize,
    ram_strategy: bool,
    ghost_mode: bool,
    double_vision: bool,
    puppeteering: bool,
    recording: WeaponRecording,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            values: Param::ALL.map(|p| p.bounds().default),
            gears: DEFAULT_GEARS.to_vec(),
            gear: DEFAULT_GEAR,
            ram_strategy: true,
            ghost_mode: false,
            double_vision: true,
            puppeteering: true,
            recording: WeaponRecording::default(),
        }
    }
}

impl Configuration {
    /// Build a configuration from defaults overlaid with `preset`, clamping
    /// every supplied value.
    pub fn from_preset(preset: &ConfigPreset) -> Self {
        let mut cfg = Self::default();

        if let Some(gears) = &preset.gears {
            if (2..=3).contains(&gears.len()) {
                let bounds = Param::MaxSpeed.bounds();
                cfg.gears = gears.iter().map(|g| bounds.clamp(*g)).collect();
            } else {
                warn!(
                    len = gears.len(),
                    "gear table must have 2 or 3 entries; keeping the default table"
                );
            }
        }
        let gear = preset.gear.unwrap_or(DEFAULT_GEAR);
        let mut editor = cfg.editor();
        editor.select_gear(gear);

        for param in Param::ALL {
            if let Some(v) = preset.value(param) {
                editor.set(param, v);
            }
        }
        for (flag, value) in [
            (Flag::RamStrategy, preset.ram_strategy),
            (Flag::GhostMode, preset.ghost_mode),
            (Flag::DoubleVision, preset.double_vision),
            (Flag::Puppeteering, preset.puppeteering),
        ] {
            if let Some(v) = value {
                editor.set_flag(flag, v);
            }
        }
        cfg
    }

    /// Exclusive write access.  Only the engineering console should hold one.
    pub fn editor(&mut self) -> ConfigEditor<'_> {
        ConfigEditor { cfg: self }
    }

    pub fn get(&self, param: Param) -> i32 {
        self.values[param.slot()]
    }

    pub fn max_speed(&self) -> i32 {
        self.get(Param::MaxSpeed)
    }

    pub fn acceleration(&self) -> i32 {
        self.get(Param::Acceleration)
    }

    pub fn turn_speed(&self) -> i32 {
        self.get(Param::TurnSpeed)
    }

    pub fn drive_turn_speed(&self) -> i32 {
        self.get(Param::DriveTurnSpeed)
    }

    pub fn strike_speed(&self) -> i32 {
        self.get(Param::StrikeSpeed)
    }

    pub fn strike_angle(&self) -> i32 {
        self.get(Param::StrikeAngle)
    }

    pub fn attack_distance(&self) -> i32 {
        self.get(Param::AttackDistance)
    }

    pub fn fire_distance(&self) -> i32 {
        self.get(Param::FireDistance)
    }

    pub fn reverse_distance(&self) -> i32 {
        self.get(Param::ReverseDistance)
    }

    pub fn line_threshold(&self) -> i32 {
        self.get(Param::LineThreshold)
    }

    pub fn volume(&self) -> i32 {
        self.get(Param::Volume)
    }

    pub fn personality(&self) -> i32 {
        self.get(Param::Personality)
    }

    pub fn hack_limit(&self) -> i32 {
        self.get(Param::HackLimit)
    }

    pub fn startup_delay_ms(&self) -> i32 {
        self.get(Param::StartupDelayMs)
    }

    pub fn gears(&self) -> &[i32] {
        &self.gears
    }

    /// Index of the active gear.
    pub fn gear(&self) -> usize {
        self.gear
    }

    pub fn ram_strategy(&self) -> bool {
        self.ram_strategy
    }

    pub fn ghost_mode(&self) -> bool {
        self.ghost_mode
    }

    pub fn double_vision(&self) -> bool {
        self.double_vision
    }

    pub fn puppeteering(&self) -> bool {
        self.puppeteering
    }

    pub fn recording(&self) -> &WeaponRecording {
        &self.recording
    }

    /// Number style matching the `double_vision` flag.
    pub fn digit_style(&self) -> DigitStyle {
        if self.double_vision {
            DigitStyle::DoubleVision
        } else {
            DigitStyle::Plain
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ConfigEditor
// ────────────────────────────────────────────────────────────────────────────

/// Mutable handle on a [`Configuration`].  Every write clamps.
pub struct ConfigEditor<'a> {
    cfg: &'a mut Configuration,
}

impl ConfigEditor<'_> {
    /// Read access to the values being edited.
    pub fn current(&self) -> &Configuration {
        self.cfg
    }

    /// Store `value` clamped to the parameter's bounds and return what was
    /// stored.
    pub fn set(&mut self, param: Param, value: i32) -> i32 {
        let clamped = param.bounds().clamp(value);
        if clamped != value {
            debug!(param = param.name(), requested = value, stored = clamped, "clamped");
        }
        self.cfg.values[param.slot()] = clamped;
        clamped
    }

    /// Move `param` by `steps` increments of its step size, saturating at
    /// the bounds.  Returns the new value.
    pub fn step(&mut self, param: Param, steps: i32) -> i32 {
        let bounds = param.bounds();
        let target = self
            .cfg
            .get(param)
            .saturating_add(steps.saturating_mul(bounds.step));
        self.set(param, target)
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::RamStrategy => self.cfg.ram_strategy = value,
            Flag::GhostMode => self.cfg.ghost_mode = value,
            Flag::DoubleVision => self.cfg.double_vision = value,
            Flag::Puppeteering => self.cfg.puppeteering = value,
        }
    }

    /// Activate gear `index` (clamped to the table) and set the top speed to
    /// its preset.  Returns the new top speed.
    pub fn select_gear(&mut self, index: usize) -> i32 {
        let last = self.cfg.gears.len().saturating_sub(1);
        self.cfg.gear = index.min(last);
        let speed = self.cfg.gears[self.cfg.gear];
        self.set(Param::MaxSpeed, speed)
    }

    /// Shift one gear up (`up = true`) or down, saturating at either end of
    /// the table.  Returns the new top speed.
    pub fn shift_gear(&mut self, up: bool) -> i32 {
        let index = if up {
            self.cfg.gear.saturating_add(1)
        } else {
            self.cfg.gear.saturating_sub(1)
        };
        self.select_gear(index)
    }

    /// Install a fresh capture, replacing the previous recording as a whole.
    /// Captures of [`MIN_RECORDING_SAMPLES`] samples or fewer are discarded
    /// and the previous recording is kept.  Returns whether it was installed.
    pub fn install_recording(&mut self, samples: Vec<i32>) -> bool {
        let len = samples.len();
        match WeaponRecording::from_samples(samples) {
            Some(recording) => {
                self.cfg.recording = recording;
                true
            }
            None => {
                debug!(samples = len, "capture too short; discarded");
                false
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_bounds() {
        let cfg = Configuration::default();
        for p in Param::ALL {
            let b = p.bounds();
            assert!((b.min..=b.max).contains(&cfg.get(p)), "{} default", p.name());
        }
        assert_eq!(cfg.max_speed(), DEFAULT_GEARS[cfg.gear()]);
    }

    #[test]
    fn repeated_increments_saturate_at_max() {
        let mut cfg = Configuration::default();
        for p in Param::ALL {
            let max = p.bounds().max;
            for _ in 0..1000 {
                cfg.editor().step(p, 1);
            }
            assert_eq!(cfg.get(p), max, "{} must saturate", p.name());
            // Idempotent at the boundary.
            assert_eq!(cfg.editor().step(p, 1), max);
        }
    }

    #[test]
    fn repeated_decrements_saturate_at_min() {
        let mut cfg = Configuration::default();
        for p in Param::ALL {
            let min = p.bounds().min;
            for _ in 0..1000 {
                cfg.editor().step(p, -1);
            }
            assert_eq!(cfg.get(p), min, "{} must saturate", p.name());
        }
    }

    #[test]
    fn set_clamps_out_of_range_values() {
        let mut cfg = Configuration::default();
        assert_eq!(cfg.editor().set(Param::Volume, 42), 10);
        assert_eq!(cfg.editor().set(Param::Volume, -3), 0);
        assert_eq!(cfg.editor().set(Param::StrikeAngle, i32::MAX), 180);
        assert_eq!(cfg.editor().step(Param::MaxSpeed, i32::MAX), 1000);
    }

    #[test]
    fn gear_shift_saturates_and_sets_speed() {
        let mut cfg = Configuration::default();
        assert_eq!(cfg.editor().shift_gear(true), 1000);
        assert_eq!(cfg.editor().shift_gear(true), 1000);
        assert_eq!(cfg.gear(), 2);
        assert_eq!(cfg.editor().shift_gear(false), 650);
        assert_eq!(cfg.editor().shift_gear(false), 350);
        assert_eq!(cfg.editor().shift_gear(false), 350);
        assert_eq!(cfg.gear(), 0);
    }

    #[test]
    fn short_capture_keeps_previous_recording() {
        let mut cfg = Configuration::default();
        assert!(!cfg.editor().install_recording(vec![1, 2, 3, 4, 5]));
        assert!(cfg.recording().is_empty());

        assert!(cfg.editor().install_recording(vec![0, 10, 20, 30, 40, 50]));
        let installed = cfg.recording().clone();

        assert!(!cfg.editor().install_recording(vec![9; 5]));
        assert_eq!(cfg.recording(), &installed);
    }

    #[test]
    fn long_capture_replaces_recording() {
        let mut cfg = Configuration::default();
        cfg.editor().install_recording(vec![1; 6]);
        cfg.editor().install_recording(vec![2; 8]);
        assert_eq!(cfg.recording().samples(), &[2; 8]);
    }

    #[test]
    fn preset_values_are_clamped() {
        let preset: ConfigPreset = toml::from_str(
            r#"
            volume = 99
            attack_distance = 10
            ghost_mode = true
            "#,
        )
        .unwrap();
        let cfg = Configuration::from_preset(&preset);
        assert_eq!(cfg.volume(), 10);
        assert_eq!(cfg.attack_distance(), 50);
        assert!(cfg.ghost_mode());
        assert!(cfg.ram_strategy());
    }

    #[test]
    fn preset_gear_selects_speed_unless_overridden() {
        let preset = ConfigPreset {
            gears: Some(vec![300, 2000]),
            gear: Some(7),
            ..ConfigPreset::default()
        };
        let cfg = Configuration::from_preset(&preset);
        assert_eq!(cfg.gears(), &[300, 1000]);
        assert_eq!(cfg.gear(), 1);
        assert_eq!(cfg.max_speed(), 1000);

        let preset = ConfigPreset {
            gear: Some(0),
            max_speed: Some(500),
            ..ConfigPreset::default()
        };
        assert_eq!(Configuration::from_preset(&preset).max_speed(), 500);
    }

    #[test]
    fn preset_with_bad_gear_table_keeps_default() {
        let preset = ConfigPreset {
            gears: Some(vec![100, 200, 300, 400]),
            ..ConfigPreset::default()
        };
        assert_eq!(Configuration::from_preset(&preset).gears(), &DEFAULT_GEARS);
    }

    #[test]
    fn preset_rejects_unknown_fields() {
        let parsed: Result<ConfigPreset, _> = toml::from_str("warp_drive = true");
        assert!(parsed.is_err());
    }
}
