//! Weapon controller: strike playback and hand-guided capture.
//!
//! # Strike
//!
//! [`strike`] swings the weapon once and blocks until it is back at zero.
//! With a [`WeaponRecording`][sumo_kernel::WeaponRecording] installed it
//! replays the samples one by one, [`PLAYBACK_STEP_MS`] apart, without
//! waiting for each target; otherwise it sweeps to the configured strike
//! angle.
//!
//! # Capture
//!
//! [`PuppetRecorder`] and [`AngleCalibrator`] are console editors: they
//! release the motor so it can be moved by hand, are ticked by the console
//! until the operator confirms, then drive the weapon back to zero under
//! power.

use sumo_hal::clock::Clock;
use sumo_hal::hub::Display;
use sumo_hal::weapon::WeaponMotor;
use sumo_kernel::{ConfigEditor, Configuration, Param};
use sumo_types::{Completion, DigitStyle, Icon};
use tracing::{debug, info};

/// Capture sampling period.
pub const SAMPLE_PERIOD_MS: u64 = 50;

/// Pause between recorded samples during playback.
pub const PLAYBACK_STEP_MS: u64 = SAMPLE_PERIOD_MS;

/// Two-digit readout of a shaft angle: `|angle| / 10`, capped at 99.
pub fn readout(angle: i32) -> u8 {
    (angle.unsigned_abs() / 10).min(99) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Strike
// ────────────────────────────────────────────────────────────────────────────

/// Swing the weapon once and return it to zero.  Blocks.
pub fn strike(weapon: &mut dyn WeaponMotor, clock: &mut dyn Clock, cfg: &Configuration) {
    let speed = cfg.strike_speed();
    let recording = cfg.recording();
    if recording.is_empty() {
        weapon.run_target(speed, cfg.strike_angle(), Completion::Wait);
    } else {
        for &angle in recording.samples() {
            weapon.run_target(speed, angle, Completion::Detach);
            clock.wait(PLAYBACK_STEP_MS);
        }
    }
    weapon.run_target(speed, 0, Completion::Wait);
}

// ────────────────────────────────────────────────────────────────────────────
// PuppetRecorder
// ────────────────────────────────────────────────────────────────────────────

/// Captures a hand-guided motion as a new weapon recording.
#[derive(Debug)]
pub struct PuppetRecorder {
    samples: Vec<i32>,
    /// Clock time of the next sample slot, on a fixed [`SAMPLE_PERIOD_MS`]
    /// grid from the first sample.
    next_due_ms: Option<u64>,
}

impl PuppetRecorder {
    /// Release the motor and show the recording icon.
    pub fn begin(weapon: &mut dyn WeaponMotor, display: &mut dyn Display) -> Self {
        weapon.coast();
        display.icon(Icon::Clock);
        debug!("weapon capture started");
        Self {
            samples: Vec::new(),
            next_due_ms: None,
        }
    }

    /// Take a sample if one is due and show its readout.
    pub fn tick(
        &mut self,
        weapon: &dyn WeaponMotor,
        display: &mut dyn Display,
        style: DigitStyle,
        clock: &dyn Clock,
    ) {
        let now = clock.now_ms();
        if self.next_due_ms.is_none_or(|due| now >= due) {
            // Missed slots are skipped, never sampled in a burst.
            let mut due = self.next_due_ms.unwrap_or(now);
            while due <= now {
                due += SAMPLE_PERIOD_MS;
            }
            self.next_due_ms = Some(due);
            let angle = weapon.angle();
            self.samples.push(angle);
            display.digits(readout(angle), style);
        }
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Install the capture if it is long enough, then return the weapon to
    /// zero.  Returns whether the capture was installed.
    pub fn finish(self, editor: &mut ConfigEditor<'_>, weapon: &mut dyn WeaponMotor) -> bool {
        let len = self.samples.len();
        let installed = editor.install_recording(self.samples);
        if installed {
            info!(samples = len, "weapon recording installed");
        } else {
            debug!(samples = len, "capture too short; discarded");
        }
        let speed = editor.current().strike_speed();
        weapon.run_target(speed, 0, Completion::Wait);
        installed
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AngleCalibrator
// ────────────────────────────────────────────────────────────────────────────

/// Sets the default strike angle by posing the weapon by hand.
#[derive(Debug)]
pub struct AngleCalibrator;

impl AngleCalibrator {
    pub fn begin(weapon: &mut dyn WeaponMotor) -> Self {
        weapon.coast();
        AngleCalibrator
    }

    pub fn tick(&self, weapon: &dyn WeaponMotor, display: &mut dyn Display, style: DigitStyle) {
        display.digits(readout(weapon.angle()), style);
    }

    /// Store the current pose as the strike angle (clamped) and return the
    /// weapon to zero.  Returns the stored angle.
    pub fn finish(self, editor: &mut ConfigEditor<'_>, weapon: &mut dyn WeaponMotor) -> i32 {
        let posed = weapon.angle().saturating_abs();
        let stored = editor.set(Param::StrikeAngle, posed);
        info!(posed, stored, "strike angle calibrated");
        let speed = editor.current().strike_speed();
        weapon.run_target(speed, 0, Completion::Wait);
        stored
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sumo_hal::sim::{HwEvent, SimRig};

    fn weapon_targets(journal: &[HwEvent]) -> Vec<(i32, Completion)> {
        journal
            .iter()
            .filter_map(|e| match e {
                HwEvent::WeaponTarget {
                    angle, completion, ..
                } => Some((*angle, *completion)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn default_swing_waits_both_legs() {
        let rig = SimRig::new().with_weapon();
        let world = rig.world();
        let mut p = rig.build();
        let cfg = Configuration::default();

        strike(p.weapon.as_mut(), p.clock.as_mut(), &cfg);
        assert_eq!(
            weapon_targets(&world.journal()),
            vec![(180, Completion::Wait), (0, Completion::Wait)]
        );
    }

    #[test]
    fn recorded_swing_replays_samples() {
        let rig = SimRig::new().with_weapon();
        let world = rig.world();
        let mut p = rig.build();
        let mut cfg = Configuration::default();
        cfg.editor().install_recording(vec![10, 40, 90, 120, 60, 20]);

        let start = world.now_ms();
        strike(p.weapon.as_mut(), p.clock.as_mut(), &cfg);

        let targets = weapon_targets(&world.journal());
        assert_eq!(targets.len(), 7);
        assert!(targets[..6].iter().all(|(_, c)| *c == Completion::Detach));
        assert_eq!(targets[6], (0, Completion::Wait));
        assert!(world.now_ms() - start >= 6 * PLAYBACK_STEP_MS);
    }

    #[test]
    fn readout_is_tenths_of_magnitude() {
        assert_eq!(readout(-135), 13);
        assert_eq!(readout(9), 0);
        assert_eq!(readout(5000), 99);
        assert_eq!(readout(i32::MIN), 99);
    }

    #[test]
    fn recorder_samples_and_installs() {
        let rig = SimRig::new().with_weapon().with_hub();
        let world = rig.world();
        let mut p = rig.build();
        let mut cfg = Configuration::default();

        let mut rec = PuppetRecorder::begin(p.weapon.as_mut(), p.display.as_mut());
        for angle in [0, 30, 60, 90, 60, 30, 0] {
            world.set_weapon_angle(angle);
            rec.tick(p.weapon.as_ref(), p.display.as_mut(), DigitStyle::Plain, p.clock.as_ref());
            p.clock.wait(SAMPLE_PERIOD_MS);
        }
        assert_eq!(rec.samples().len(), 7);
        assert!(rec.finish(&mut cfg.editor(), p.weapon.as_mut()));
        assert_eq!(cfg.recording().samples(), &[0, 30, 60, 90, 60, 30, 0]);

        let journal = world.journal();
        assert_eq!(journal[0], HwEvent::WeaponCoast);
        assert_eq!(journal[1], HwEvent::Icon(Icon::Clock));
        assert!(journal.contains(&HwEvent::Digits {
            value: 9,
            style: DigitStyle::Plain
        }));
        assert_eq!(weapon_targets(&journal), vec![(0, Completion::Wait)]);
    }

    #[test]
    fn sampling_keeps_the_playback_rate_at_loop_tick() {
        let rig = SimRig::new().with_weapon().with_hub();
        let mut p = rig.build();

        let mut rec = PuppetRecorder::begin(p.weapon.as_mut(), p.display.as_mut());
        // One second of a 20 ms loop.
        for _ in 0..50 {
            rec.tick(p.weapon.as_ref(), p.display.as_mut(), DigitStyle::Plain, p.clock.as_ref());
            p.clock.wait(20);
        }
        assert_eq!(rec.samples().len() as u64, 1000 / PLAYBACK_STEP_MS);
    }

    #[test]
    fn stalled_caller_skips_missed_slots() {
        let rig = SimRig::new().with_weapon().with_hub();
        let mut p = rig.build();

        let mut rec = PuppetRecorder::begin(p.weapon.as_mut(), p.display.as_mut());
        rec.tick(p.weapon.as_ref(), p.display.as_mut(), DigitStyle::Plain, p.clock.as_ref());
        p.clock.wait(230);
        rec.tick(p.weapon.as_ref(), p.display.as_mut(), DigitStyle::Plain, p.clock.as_ref());
        rec.tick(p.weapon.as_ref(), p.display.as_mut(), DigitStyle::Plain, p.clock.as_ref());
        assert_eq!(rec.samples().len(), 2);
        p.clock.wait(20);
        rec.tick(p.weapon.as_ref(), p.display.as_mut(), DigitStyle::Plain, p.clock.as_ref());
        assert_eq!(rec.samples().len(), 3);
    }

    #[test]
    fn short_capture_still_returns_weapon() {
        let rig = SimRig::new().with_weapon().with_hub();
        let world = rig.world();
        let mut p = rig.build();
        let mut cfg = Configuration::default();

        let mut rec = PuppetRecorder::begin(p.weapon.as_mut(), p.display.as_mut());
        for _ in 0..5 {
            rec.tick(p.weapon.as_ref(), p.display.as_mut(), DigitStyle::Plain, p.clock.as_ref());
            p.clock.wait(SAMPLE_PERIOD_MS);
        }
        assert!(!rec.finish(&mut cfg.editor(), p.weapon.as_mut()));
        assert!(cfg.recording().is_empty());
        assert_eq!(weapon_targets(&world.journal()), vec![(0, Completion::Wait)]);
    }

    #[test]
    fn calibrator_clamps_posed_angle() {
        let rig = SimRig::new().with_weapon().with_hub();
        let world = rig.world();
        let mut p = rig.build();
        let mut cfg = Configuration::default();

        let cal = AngleCalibrator::begin(p.weapon.as_mut());
        world.set_weapon_angle(-20);
        cal.tick(p.weapon.as_ref(), p.display.as_mut(), DigitStyle::Plain);
        assert_eq!(cal.finish(&mut cfg.editor(), p.weapon.as_mut()), 45);
        assert_eq!(cfg.strike_angle(), 45);
        assert_eq!(world.weapon_angle(), 0);
    }
}
