//! [`EngineerConsole`] – on-device parameter editing driven by the hub
//! buttons.
//!
//! The console is a nested state machine ticked by the control loop while
//! it is active; nothing else runs during those ticks.
//!
//! ```text
//!            enter()                    short press
//!  Inactive ─────────▶ Menu (letter) ─────────────────▶ Editor
//!     ▲                  │   ▲                            │
//!     │   long press     │   └──── console-button edge ───┘
//!     └──────────────────┘
//! ```
//!
//! - **Menu**: the hub's left/right arrows step through the single-letter
//!   groups of the active [`MenuLayout`].  Releasing the console (bluetooth)
//!   button after a short press opens the selected editor; holding it for
//!   [`LONG_PRESS_MS`] leaves the console.
//! - **Editor**: the arrows adjust the group's value with a per-editor
//!   cooldown, the live value is shown on the display, and the next press
//!   of the console button closes the editor and returns to the menu.
//!
//! Every write goes through a [`ConfigEditor`][sumo_kernel::ConfigEditor],
//! so values never leave their bounds.

use serde::{Deserialize, Serialize};
use sumo_hal::{Display, Peripherals};
use sumo_kernel::{Configuration, Param};
use sumo_types::{Button, ButtonSet, DigitStyle};
use tracing::{debug, info};

use crate::input::{Cooldown, Gesture, HoldDetector, InputEdges, LONG_PRESS_MS};
use crate::weapon::{AngleCalibrator, PuppetRecorder};

/// Menu navigation auto-repeat period.
pub const NAV_COOLDOWN_MS: u64 = 250;
/// Auto-repeat period of numeric editors.
pub const EDIT_COOLDOWN_MS: u64 = 150;
/// Auto-repeat period of gear and single-glyph editors.
pub const CYCLE_COOLDOWN_MS: u64 = 250;

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// One entry of the console menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Capture a hand-guided weapon motion.
    WeaponRecord,
    /// Pick a gear from the gear table.
    SpeedGear,
    /// Floor reflectance threshold.
    LineCalibration,
    MaxSpeed,
    TurnSpeed,
    ReverseDistance,
    /// Pose the weapon by hand to set the strike angle.
    WeaponAngle,
    Volume,
    Personality,
    HackLimit,
}

impl Group {
    /// Letter shown on the display while the group is selected.
    pub fn letter(self) -> char {
        match self {
            Group::WeaponRecord | Group::WeaponAngle => 'M',
            Group::SpeedGear | Group::MaxSpeed => 'V',
            Group::LineCalibration => 'C',
            Group::TurnSpeed => 'G',
            Group::ReverseDistance => 'R',
            Group::Volume => 'A',
            Group::Personality => 'P',
            Group::HackLimit => 'H',
        }
    }
}

/// Which set of groups the console offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuLayout {
    /// `M` weapon record, `V` speed gear, `C` line calibration.
    #[default]
    Workshop,
    /// `V` `G` `R` `M` `A` `P` `H`: one numeric parameter per letter.
    Tuning,
}

impl MenuLayout {
    pub fn groups(self) -> &'static [Group] {
        match self {
            MenuLayout::Workshop => &[
                Group::WeaponRecord,
                Group::SpeedGear,
                Group::LineCalibration,
            ],
            MenuLayout::Tuning => &[
                Group::MaxSpeed,
                Group::TurnSpeed,
                Group::ReverseDistance,
                Group::WeaponAngle,
                Group::Volume,
                Group::Personality,
                Group::HackLimit,
            ],
        }
    }
}

/// Result of one [`EngineerConsole::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    /// The console is not running; the tick belongs to the loop.
    Inactive,
    /// The console consumed the tick.
    Active,
    /// The console closed on this tick.  The loop resumes next tick.
    Exited,
}

// ────────────────────────────────────────────────────────────────────────────
// Editors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Editor {
    /// Numeric value shown as `value / divisor`.
    Numeric {
        param: Param,
        divisor: i32,
        repeat: Cooldown,
    },
    /// Small value shown as a single glyph.
    Glyph { param: Param, repeat: Cooldown },
    Gear { repeat: Cooldown },
    Record(PuppetRecorder),
    Calibrate(AngleCalibrator),
}

impl Editor {
    /// `None` when the group has nothing to edit in this configuration.
    fn open(group: Group, io: &mut Peripherals, cfg: &Configuration) -> Option<Self> {
        let numeric = |param, divisor| Editor::Numeric {
            param,
            divisor,
            repeat: Cooldown::new(EDIT_COOLDOWN_MS),
        };
        let editor = match group {
            Group::WeaponRecord if !cfg.puppeteering() => return None,
            Group::WeaponRecord => Editor::Record(PuppetRecorder::begin(
                io.weapon.as_mut(),
                io.display.as_mut(),
            )),
            Group::WeaponAngle => Editor::Calibrate(AngleCalibrator::begin(io.weapon.as_mut())),
            Group::SpeedGear => Editor::Gear {
                repeat: Cooldown::new(CYCLE_COOLDOWN_MS),
            },
            Group::LineCalibration => numeric(Param::LineThreshold, 1),
            Group::MaxSpeed => numeric(Param::MaxSpeed, 10),
            Group::TurnSpeed => numeric(Param::TurnSpeed, 10),
            Group::ReverseDistance => numeric(Param::ReverseDistance, 10),
            Group::Volume => numeric(Param::Volume, 1),
            Group::Personality => Editor::Glyph {
                param: Param::Personality,
                repeat: Cooldown::new(CYCLE_COOLDOWN_MS),
            },
            Group::HackLimit => Editor::Glyph {
                param: Param::HackLimit,
                repeat: Cooldown::new(CYCLE_COOLDOWN_MS),
            },
        };
        editor.render(io, cfg);
        Some(editor)
    }

    fn render(&self, io: &mut Peripherals, cfg: &Configuration) {
        let style = cfg.digit_style();
        match self {
            Editor::Numeric { param, divisor, .. } => {
                show_reading(io.display.as_mut(), cfg.get(*param) / divisor, style);
            }
            Editor::Glyph { param, .. } => {
                let value = cfg.get(*param).clamp(0, 9) as u32;
                io.display.char(char::from_digit(value, 10).unwrap_or('?'));
            }
            Editor::Gear { .. } => {
                show_reading(io.display.as_mut(), cfg.max_speed() / 10, style);
            }
            Editor::Record(_) | Editor::Calibrate(_) => {}
        }
    }

    fn tick(&mut self, held: ButtonSet, io: &mut Peripherals, cfg: &mut Configuration) {
        let direction = match (held.contains(Button::Right), held.contains(Button::Left)) {
            (true, false) => 1,
            (false, true) => -1,
            _ => 0,
        };
        let clock = io.clock.as_ref();
        if direction == 0 {
            if let Editor::Numeric { repeat, .. }
            | Editor::Glyph { repeat, .. }
            | Editor::Gear { repeat } = self
            {
                repeat.reset();
            }
        }
        let changed = match self {
            Editor::Numeric { param, repeat, .. } | Editor::Glyph { param, repeat } => {
                if direction != 0 && repeat.ready(clock) {
                    let value = cfg.editor().step(*param, direction);
                    if *param == Param::Volume {
                        io.speaker.volume((value * 10) as u8);
                    }
                    true
                } else {
                    false
                }
            }
            Editor::Gear { repeat } => {
                if direction != 0 && repeat.ready(clock) {
                    cfg.editor().shift_gear(direction > 0);
                    true
                } else {
                    false
                }
            }
            Editor::Record(rec) => {
                rec.tick(
                    io.weapon.as_ref(),
                    io.display.as_mut(),
                    cfg.digit_style(),
                    io.clock.as_ref(),
                );
                false
            }
            Editor::Calibrate(cal) => {
                cal.tick(io.weapon.as_ref(), io.display.as_mut(), cfg.digit_style());
                false
            }
        };
        if changed {
            self.render(io, cfg);
        }
    }

    /// Commit whatever the editor was capturing.
    fn close(self, io: &mut Peripherals, cfg: &mut Configuration) {
        match self {
            Editor::Record(rec) => {
                rec.finish(&mut cfg.editor(), io.weapon.as_mut());
            }
            Editor::Calibrate(cal) => {
                cal.finish(&mut cfg.editor(), io.weapon.as_mut());
            }
            Editor::Numeric { .. } | Editor::Glyph { .. } | Editor::Gear { .. } => {}
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// EngineerConsole
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Session {
    selected: usize,
    confirm: HoldDetector,
    nav: Cooldown,
    hub: InputEdges,
    editor: Option<Editor>,
}

/// The engineering console.  Holds no state while inactive.
#[derive(Debug)]
pub struct EngineerConsole {
    layout: MenuLayout,
    session: Option<Session>,
}

impl EngineerConsole {
    pub fn new(layout: MenuLayout) -> Self {
        Self {
            layout,
            session: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Group under the cursor, while active.
    pub fn selected(&self) -> Option<Group> {
        self.session
            .as_ref()
            .map(|s| self.layout.groups()[s.selected])
    }

    /// Whether an editor is open.
    pub fn is_editing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.editor.is_some())
    }

    /// Open the console: halt the actuators and show the first group.
    /// Does nothing if the console is already open.
    pub fn enter(&mut self, io: &mut Peripherals) {
        if self.session.is_some() {
            return;
        }
        io.drive.stop();
        io.weapon.coast();
        io.speaker.beep(1000, 100);

        // The entry gesture is still being held; it must not count as a
        // confirm press.
        let mut confirm = HoldDetector::new(LONG_PRESS_MS);
        confirm.disarm();
        let mut hub = InputEdges::new();
        hub.update(io.buttons.pressed());

        let session = Session {
            selected: 0,
            confirm,
            nav: Cooldown::new(NAV_COOLDOWN_MS),
            hub,
            editor: None,
        };
        io.display.char(self.layout.groups()[0].letter());
        self.session = Some(session);
        info!(layout = ?self.layout, "engineering console opened");
    }

    /// Run one console tick.
    pub fn tick(&mut self, io: &mut Peripherals, cfg: &mut Configuration) -> ConsoleOutcome {
        let groups = self.layout.groups();
        let Some(session) = self.session.as_mut() else {
            return ConsoleOutcome::Inactive;
        };

        let held = io.buttons.pressed();
        let edges = session.hub.update(held);

        // ── Editor ──────────────────────────────────────────────────────────
        if let Some(editor) = session.editor.as_mut() {
            if edges.contains(Button::Bluetooth) {
                if let Some(editor) = session.editor.take() {
                    editor.close(io, cfg);
                }
                confirm_closed(io);
                session.confirm.disarm();
                io.display.char(groups[session.selected].letter());
            } else {
                editor.tick(held, io, cfg);
            }
            return ConsoleOutcome::Active;
        }

        // ── Menu ────────────────────────────────────────────────────────────
        match session
            .confirm
            .update(held.contains(Button::Bluetooth), io.clock.as_ref())
        {
            Some(Gesture::Long) => {
                io.display.text("OK");
                io.drive.stop();
                io.weapon.coast();
                self.session = None;
                info!("engineering console closed");
                return ConsoleOutcome::Exited;
            }
            Some(Gesture::Short) => {
                let group = groups[session.selected];
                io.speaker.beep(1500, 100);
                debug!(?group, "editor opened");
                match Editor::open(group, io, cfg) {
                    Some(editor) => session.editor = Some(editor),
                    None => {
                        confirm_closed(io);
                        io.display.char(group.letter());
                    }
                }
                return ConsoleOutcome::Active;
            }
            None => {}
        }

        if held.contains(Button::Bluetooth) {
            return ConsoleOutcome::Active;
        }
        let step = match (held.contains(Button::Right), held.contains(Button::Left)) {
            (true, false) => Some(1),
            (false, true) => Some(groups.len() - 1),
            _ => None,
        };
        match step {
            Some(step) => {
                if session.nav.ready(io.clock.as_ref()) {
                    session.selected = (session.selected + step) % groups.len();
                    io.speaker.beep(1200, 50);
                    io.display.char(groups[session.selected].letter());
                }
            }
            None => session.nav.reset(),
        }
        ConsoleOutcome::Active
    }
}

/// Two-digit readout for 0–99; anything wider scrolls as text.
fn show_reading(display: &mut dyn Display, value: i32, style: DigitStyle) {
    match u8::try_from(value) {
        Ok(v) if v <= 99 => display.digits(v, style),
        _ => display.text(&value.max(0).to_string()),
    }
}

/// Feedback for a closed editor.
fn confirm_closed(io: &mut Peripherals) {
    io.speaker.beep(2000, 200);
    io.display.text("OK");
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sumo_hal::sim::{HwEvent, SimRig, SimWorld};

    const TICK_MS: u64 = 20;

    struct Bench {
        world: SimWorld,
        io: Peripherals,
        cfg: Configuration,
        console: EngineerConsole,
    }

    impl Bench {
        fn new(layout: MenuLayout) -> Self {
            let rig = SimRig::full();
            let world = rig.world();
            let mut io = rig.build();
            let mut console = EngineerConsole::new(layout);
            world.hold_hub([Button::Bluetooth]);
            console.enter(&mut io);
            world.release_hub();
            let mut bench = Self {
                world,
                io,
                cfg: Configuration::default(),
                console,
            };
            bench.tick();
            bench
        }

        fn tick(&mut self) -> ConsoleOutcome {
            let out = self.console.tick(&mut self.io, &mut self.cfg);
            self.io.clock.wait(TICK_MS);
            out
        }

        fn ticks(&mut self, n: usize) -> Vec<ConsoleOutcome> {
            (0..n).map(|_| self.tick()).collect()
        }

        /// Press and release the console button quickly.
        fn tap_console(&mut self) {
            self.world.hold_hub([Button::Bluetooth]);
            self.tick();
            self.world.release_hub();
            self.tick();
        }

        fn hold(&mut self, button: Button, ms: u64) {
            self.world.hold_hub([button]);
            self.ticks((ms / TICK_MS) as usize);
            self.world.release_hub();
            self.tick();
        }
    }

    #[test]
    fn entry_halts_and_beeps() {
        let b = Bench::new(MenuLayout::Workshop);
        let journal = b.world.journal();
        assert_eq!(journal[0], HwEvent::DriveStop);
        assert_eq!(journal[1], HwEvent::WeaponCoast);
        assert!(journal.contains(&HwEvent::Beep {
            frequency_hz: 1000,
            duration_ms: 100
        }));
        assert!(journal.contains(&HwEvent::Char('M')));
        assert!(b.console.is_active());
    }

    #[test]
    fn enter_is_not_reentrant() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.world.take_journal();
        b.console.enter(&mut b.io);
        assert!(b.world.journal().is_empty());
    }

    #[test]
    fn entry_gesture_does_not_confirm() {
        let rig = SimRig::full();
        let world = rig.world();
        let mut io = rig.build();
        let mut cfg = Configuration::default();
        let mut console = EngineerConsole::new(MenuLayout::Workshop);
        world.hold_hub([Button::Bluetooth]);
        console.enter(&mut io);
        // Still holding well past the long-press threshold.
        for _ in 0..150 {
            assert_eq!(console.tick(&mut io, &mut cfg), ConsoleOutcome::Active);
            io.clock.wait(TICK_MS);
        }
        world.release_hub();
        console.tick(&mut io, &mut cfg);
        assert!(!console.is_editing());
        assert!(console.is_active());
    }

    #[test]
    fn navigation_wraps_with_cooldown() {
        let mut b = Bench::new(MenuLayout::Tuning);
        assert_eq!(b.console.selected(), Some(Group::MaxSpeed));
        // One tick of the right arrow steps once.
        b.hold(Button::Right, TICK_MS);
        assert_eq!(b.console.selected(), Some(Group::TurnSpeed));
        b.hold(Button::Left, TICK_MS);
        b.hold(Button::Left, TICK_MS);
        assert_eq!(b.console.selected(), Some(Group::HackLimit));
        // Held for 500 ms: the cooldown allows three steps.
        b.world.take_journal();
        b.hold(Button::Right, 500);
        assert_eq!(b.console.selected(), Some(Group::ReverseDistance));
        let beeps = b
            .world
            .journal()
            .iter()
            .filter(|e| {
                **e == HwEvent::Beep {
                    frequency_hz: 1200,
                    duration_ms: 50,
                }
            })
            .count();
        assert_eq!(beeps, 3);
    }

    #[test]
    fn short_press_opens_editor_and_edge_closes_it() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.hold(Button::Right, TICK_MS); // V
        b.tap_console();
        assert!(b.console.is_editing());
        assert!(b.world.journal().contains(&HwEvent::Beep {
            frequency_hz: 1500,
            duration_ms: 100
        }));

        b.world.take_journal();
        b.tap_console();
        assert!(!b.console.is_editing());
        assert!(b.console.is_active());
        let journal = b.world.journal();
        assert!(journal.contains(&HwEvent::Beep {
            frequency_hz: 2000,
            duration_ms: 200
        }));
        assert!(journal.contains(&HwEvent::Text("OK".into())));
    }

    #[test]
    fn closing_press_does_not_reopen_editor() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.hold(Button::Right, TICK_MS);
        b.tap_console();
        b.tap_console();
        b.ticks(5);
        assert!(!b.console.is_editing());
    }

    #[test]
    fn gear_editor_saturates_at_top_gear() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.hold(Button::Right, TICK_MS); // V
        b.tap_console();
        b.hold(Button::Right, 2000);
        assert_eq!(b.cfg.gear(), 2);
        assert_eq!(b.cfg.max_speed(), 1000);
        b.hold(Button::Left, 2000);
        assert_eq!(b.cfg.gear(), 0);
        assert_eq!(b.cfg.max_speed(), 350);
    }

    #[test]
    fn line_threshold_editor_clamps() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.hold(Button::Left, TICK_MS); // C
        assert_eq!(b.console.selected(), Some(Group::LineCalibration));
        b.tap_console();
        // 35 decrements need 35 * 150 ms; hold far longer.
        b.hold(Button::Left, 10_000);
        assert_eq!(b.cfg.line_threshold(), 0);
        b.tap_console();
        assert!(!b.console.is_editing());
    }

    #[test]
    fn line_threshold_readout_reaches_one_hundred() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.hold(Button::Left, TICK_MS); // C
        b.tap_console();
        b.world.take_journal();
        b.hold(Button::Right, 15_000);
        assert_eq!(b.cfg.line_threshold(), 100);
        let journal = b.world.journal();
        assert!(journal.contains(&HwEvent::Text("100".into())));
        assert!(journal.contains(&HwEvent::Digits {
            value: 99,
            style: b.cfg.digit_style()
        }));
    }

    #[test]
    fn top_gear_readout_is_not_truncated() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.hold(Button::Right, TICK_MS); // V
        b.tap_console();
        b.world.take_journal();
        b.hold(Button::Right, 2000);
        assert_eq!(b.cfg.max_speed(), 1000);
        assert!(b.world.journal().contains(&HwEvent::Text("100".into())));
    }

    #[test]
    fn volume_editor_updates_speaker() {
        let mut b = Bench::new(MenuLayout::Tuning);
        for _ in 0..4 {
            b.hold(Button::Right, TICK_MS);
        }
        assert_eq!(b.console.selected(), Some(Group::Volume));
        b.tap_console();
        b.hold(Button::Right, TICK_MS);
        assert_eq!(b.cfg.volume(), 5);
        assert!(b.world.journal().contains(&HwEvent::Volume(50)));
    }

    #[test]
    fn hack_limit_editor_shows_glyph_and_saturates() {
        let mut b = Bench::new(MenuLayout::Tuning);
        b.hold(Button::Left, TICK_MS);
        assert_eq!(b.console.selected(), Some(Group::HackLimit));
        b.tap_console();
        b.hold(Button::Right, 3000);
        assert_eq!(b.cfg.hack_limit(), 3);
        assert!(b.world.journal().contains(&HwEvent::Char('3')));
    }

    #[test]
    fn record_editor_installs_capture() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.tap_console(); // M
        assert!(b.console.is_editing());
        for angle in (0..=200).step_by(20) {
            b.world.set_weapon_angle(angle);
            b.ticks(3);
        }
        b.tap_console();
        assert!(!b.console.is_editing());
        assert!(b.cfg.recording().samples().len() > 5);
        assert_eq!(b.world.weapon_angle(), 0);
    }

    #[test]
    fn record_editor_samples_at_playback_rate() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.tap_console(); // M
        b.ticks(50);
        let samples = match b.console.session.as_ref().and_then(|s| s.editor.as_ref()) {
            Some(Editor::Record(rec)) => rec.samples().len() as u64,
            other => panic!("expected the record editor, got {other:?}"),
        };
        assert_eq!(samples, 50 * TICK_MS / crate::weapon::PLAYBACK_STEP_MS);
        b.tap_console();
        assert_eq!(b.cfg.recording().samples().len() as u64, samples);
    }

    #[test]
    fn record_disabled_closes_immediately() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.cfg.editor().set_flag(sumo_kernel::Flag::Puppeteering, false);
        b.tap_console();
        assert!(!b.console.is_editing());
        assert!(b.world.journal().contains(&HwEvent::Text("OK".into())));
        assert!(b.cfg.recording().is_empty());
    }

    #[test]
    fn weapon_angle_editor_calibrates() {
        let mut b = Bench::new(MenuLayout::Tuning);
        for _ in 0..3 {
            b.hold(Button::Right, TICK_MS);
        }
        assert_eq!(b.console.selected(), Some(Group::WeaponAngle));
        b.tap_console();
        b.world.set_weapon_angle(-120);
        b.ticks(2);
        b.tap_console();
        assert_eq!(b.cfg.strike_angle(), 120);
    }

    #[test]
    fn long_hold_exits_and_halts() {
        let mut b = Bench::new(MenuLayout::Workshop);
        b.world.take_journal();
        b.world.hold_hub([Button::Bluetooth]);
        let outcomes = b.ticks(100);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == ConsoleOutcome::Exited)
                .count(),
            1
        );
        assert!(!b.console.is_active());
        assert_eq!(b.tick(), ConsoleOutcome::Inactive);
        let journal = b.world.journal();
        assert!(journal.contains(&HwEvent::Text("OK".into())));
        assert!(journal.contains(&HwEvent::DriveStop));
    }
}
