//! [`Controller`] – the cooperative main loop.
//!
//! One [`Controller::tick`] is one pass of the loop:
//!
//! 1. **Console** – while the engineering console is open it owns the tick
//!    and nothing below runs.
//! 2. **Safety** – the [`FallMonitor`] reads the orientation sensor.  A fall
//!    halts the drive and suppresses every actuator command (policies,
//!    remote, keyboard) until the robot is upright again.
//! 3. **Keyboard** – one command byte from the host channel.  Any command
//!    gives the keyboard priority over the remote until `x` releases it.
//! 4. **Remote** – read the held buttons.  A failed read drops the handle;
//!    a non-blocking reconnect is then attempted on every tick.
//! 5. **Policy** – unless fallen or keyboard-driven: cycle the mode on a
//!    centre-button edge, sample the sensors once, [`decide`] and execute.
//! 6. **Console gesture** – a long press of the hub's bluetooth button
//!    opens the console.
//! 7. **Sleep** – the fixed tick period.
//!
//! # Example
//!
//! ```rust
//! use sumo_hal::sim::SimRig;
//! use sumo_kernel::Configuration;
//! use sumo_runtime::control_loop::{Controller, ControllerProfile};
//! use sumo_types::Mode;
//!
//! let rig = SimRig::full();
//! let world = rig.world();
//! let mut controller = Controller::new(rig.build(), Configuration::default(), ControllerProfile::default());
//!
//! controller.startup();
//! world.hold_remote([sumo_types::Button::Center]);
//! controller.tick();
//! assert_eq!(controller.mode(), Mode::CombatSemi);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use sumo_hal::{DriveSettings, Peripherals, Remote};
use sumo_kernel::{Configuration, DefeatPolicy, FallEvent, FallMonitor};
use sumo_types::{Button, ButtonSet, Completion, ConsoleCommand, Icon, Mode, ModeSet, Signal};
use tracing::{debug, info, warn};

use crate::console::{ConsoleOutcome, EngineerConsole, MenuLayout};
use crate::input::{Gesture, HoldDetector, InputEdges, LONG_PRESS_MS};
use crate::mode::ModeMachine;
use crate::policy::{Action, HACK_BEEP_HZ, HACK_BEEP_MS, PolicyInput, SensorReadings, decide};
use crate::weapon;

/// Nominal loop period.
pub const DEFAULT_TICK_MS: u64 = 20;

/// Timeout of the single blocking connect attempt at startup.
pub const STARTUP_CONNECT_TIMEOUT_MS: u64 = 500;

/// How long the check mark stays up after the remote pairs at startup.
pub const PAIRED_CUE_MS: u64 = 200;

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

/// Structural choices that differ between controller generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerProfile {
    pub modes: ModeSet,
    pub defeat: DefeatPolicy,
    pub console: MenuLayout,
    pub tick_ms: u64,
}

impl Default for ControllerProfile {
    /// Four modes, auto-recovery after defeat, workshop console.
    fn default() -> Self {
        Self {
            modes: ModeSet::Four,
            defeat: DefeatPolicy::AutoRecover,
            console: MenuLayout::Workshop,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl ControllerProfile {
    /// Three modes, defeat latches for the session, tuning console.
    pub fn classic() -> Self {
        Self {
            modes: ModeSet::Three,
            defeat: DefeatPolicy::Latch,
            console: MenuLayout::Tuning,
            ..Self::default()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

/// Owns the peripherals and all session state.
pub struct Controller {
    io: Peripherals,
    cfg: Configuration,
    profile: ControllerProfile,
    modes: ModeMachine,
    fall: FallMonitor,
    remote: Option<Box<dyn Remote>>,
    remote_input: InputEdges,
    console: EngineerConsole,
    console_gesture: HoldDetector,
    keyboard_active: bool,
}

impl Controller {
    pub fn new(io: Peripherals, cfg: Configuration, profile: ControllerProfile) -> Self {
        Self {
            io,
            cfg,
            modes: ModeMachine::new(profile.modes),
            fall: FallMonitor::new(profile.defeat),
            remote: None,
            remote_input: InputEdges::new(),
            console: EngineerConsole::new(profile.console),
            console_gesture: HoldDetector::new(LONG_PRESS_MS),
            keyboard_active: false,
            profile,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn config(&self) -> &Configuration {
        &self.cfg
    }

    pub fn hacks_used(&self) -> i32 {
        self.modes.hacks_used()
    }

    pub fn is_fallen(&self) -> bool {
        self.fall.is_fallen()
    }

    pub fn is_console_active(&self) -> bool {
        self.console.is_active()
    }

    pub fn is_keyboard_active(&self) -> bool {
        self.keyboard_active
    }

    pub fn is_remote_connected(&self) -> bool {
        self.remote.is_some()
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Apply the configuration to the hardware, try the remote once, show
    /// the personality face and sit out the startup delay.
    pub fn startup(&mut self) {
        let volume = (self.cfg.volume() * 10) as u8;
        self.io.speaker.volume(volume);
        self.apply_drive_settings();

        match self.io.link.connect(STARTUP_CONNECT_TIMEOUT_MS) {
            Ok(remote) => {
                info!("remote connected");
                self.remote = Some(remote);
                self.io.display.icon(Icon::Check);
                self.io.clock.wait(PAIRED_CUE_MS);
            }
            Err(e) => warn!(error = %e, "remote not connected at startup; retrying every tick"),
        }

        self.indicate_mode();
        self.io
            .display
            .icon(Icon::for_personality(self.cfg.personality()));
        let delay = self.cfg.startup_delay_ms() as u64;
        info!(
            mode = %self.modes.mode(),
            delay_ms = delay,
            absent = self.io.absent().len(),
            "controller ready"
        );
        self.io.clock.wait(delay);
    }

    /// Run [`startup`][Self::startup], then tick until `shutdown` is set.
    /// The actuators are halted on the way out.
    ///
    /// `after_tick` is called once after startup, after every tick and after
    /// the halt.
    pub fn run(&mut self, shutdown: &AtomicBool, mut after_tick: impl FnMut()) {
        self.startup();
        after_tick();
        while !shutdown.load(Ordering::Relaxed) {
            self.tick();
            after_tick();
        }
        self.halt();
        after_tick();
    }

    /// Stop the drive and release the weapon.
    pub fn halt(&mut self) {
        self.io.drive.stop();
        self.io.weapon.coast();
        info!("controller stopped");
    }

    /// One pass of the loop, including the trailing sleep.
    pub fn tick(&mut self) {
        if self.console.is_active() {
            if self.console.tick(&mut self.io, &mut self.cfg) == ConsoleOutcome::Exited {
                self.apply_drive_settings();
                self.indicate_mode();
            }
            self.io.clock.wait(self.profile.tick_ms);
            return;
        }

        // Safety first.
        let up = self.io.imu.up();
        let fall = self.fall.update(up, self.io.clock.as_ref());
        self.on_fall_event(fall);
        let fallen = fall.is_fallen();

        if let Some(key) = self.io.console.poll() {
            self.on_key(key, fallen);
        }

        let held = self.read_remote();
        let edges = self.remote_input.update(held);

        if !fallen && !self.keyboard_active {
            if edges.contains(Button::Center) {
                self.modes.cycle();
                self.indicate_mode();
            }
            let input = PolicyInput {
                mode: self.modes.mode(),
                held,
                edges,
                readings: self.read_sensors(),
                hacks_used: self.modes.hacks_used(),
            };
            let actions = decide(&input, &self.cfg);
            self.execute(&actions);
        }

        let console_held = self.io.buttons.pressed().contains(Button::Bluetooth);
        if self.console_gesture.update(console_held, self.io.clock.as_ref()) == Some(Gesture::Long) {
            self.console.enter(&mut self.io);
        }

        self.io.clock.wait(self.profile.tick_ms);
    }

    // ── Steps ───────────────────────────────────────────────────────────────

    fn on_fall_event(&mut self, event: FallEvent) {
        match event {
            FallEvent::Upright | FallEvent::Down => {}
            FallEvent::Fell { remaining_s } => {
                self.io.drive.stop();
                self.show_countdown(remaining_s);
            }
            FallEvent::Countdown { remaining_s } => self.show_countdown(remaining_s),
            FallEvent::Defeated => {
                warn!(policy = ?self.fall.policy(), "defeated");
                if !self.ghosted() {
                    self.io.display.icon(Icon::Ko);
                }
                self.io.speaker.play(Signal::Defeat);
            }
            FallEvent::Recovered => self.indicate_mode(),
        }
    }

    fn show_countdown(&mut self, remaining_s: u8) {
        if !self.ghosted() {
            self.io.display.digits(remaining_s, self.cfg.digit_style());
        }
    }

    fn on_key(&mut self, key: char, fallen: bool) {
        let Some(command) = ConsoleCommand::from_char(key) else {
            debug!(?key, "ignored keyboard byte");
            return;
        };
        let active = command != ConsoleCommand::Stop;
        if active != self.keyboard_active {
            info!(active, "keyboard control");
            self.keyboard_active = active;
        }
        if fallen {
            return;
        }

        let max = self.cfg.max_speed();
        let spin = self.cfg.turn_speed().saturating_mul(2);
        match command {
            ConsoleCommand::Forward => self.io.drive.drive(max, 0),
            ConsoleCommand::Backward => self.io.drive.drive(-max, 0),
            ConsoleCommand::TurnLeft => self.io.drive.drive(0, -spin),
            ConsoleCommand::TurnRight => self.io.drive.drive(0, spin),
            ConsoleCommand::Strike => {
                weapon::strike(self.io.weapon.as_mut(), self.io.clock.as_mut(), &self.cfg)
            }
            ConsoleCommand::Stop => self.io.drive.stop(),
        }
    }

    /// Held remote buttons, or none when disconnected.  Drops a failing
    /// handle and tries one non-blocking reconnect.
    fn read_remote(&mut self) -> ButtonSet {
        let mut held = ButtonSet::empty();
        if let Some(remote) = self.remote.as_mut() {
            match remote.pressed() {
                Ok(buttons) => held = buttons,
                Err(e) => {
                    info!(error = %e, "remote lost");
                    self.remote = None;
                }
            }
        }
        if self.remote.is_none() {
            match self.io.link.connect(0) {
                Ok(remote) => {
                    info!("remote reconnected");
                    self.remote = Some(remote);
                    self.indicate_mode();
                }
                Err(e) => debug!(error = %e, "reconnect attempt failed"),
            }
        }
        held
    }

    /// Sample only the sensors the active mode looks at.
    fn read_sensors(&mut self) -> SensorReadings {
        let mut readings = SensorReadings::default();
        match self.modes.mode() {
            Mode::CombatSemi => readings.distance_mm = self.io.distance.distance(),
            Mode::CombatAuto => {
                readings.distance_mm = self.io.distance.distance();
                readings.reflection = self.io.floor.reflection();
            }
            Mode::Drive | Mode::Hacker => {}
        }
        readings
    }

    fn execute(&mut self, actions: &[Action]) {
        for action in actions {
            debug!(?action, mode = %self.modes.mode(), "dispatch");
            match *action {
                Action::Drive { speed, turn_rate } => self.io.drive.drive(speed, turn_rate),
                Action::Straight { distance_mm } => self.io.drive.straight(distance_mm),
                Action::Turn { degrees } => self.io.drive.turn(degrees, Completion::Wait),
                Action::Strike => {
                    weapon::strike(self.io.weapon.as_mut(), self.io.clock.as_mut(), &self.cfg)
                }
                Action::PulseLight { color, period_ms } => self.io.light.pulse(color, period_ms),
                Action::ShowIcon { icon } => {
                    if !self.ghosted() {
                        self.io.display.icon(icon);
                    }
                }
                Action::Hack => {
                    if self.modes.hack(self.cfg.hack_limit()) {
                        self.io.speaker.beep(HACK_BEEP_HZ, HACK_BEEP_MS);
                        self.indicate_mode();
                    }
                }
                Action::Pause { ms } => self.io.clock.wait(ms),
            }
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    /// Autonomous combat with ghost mode on: the display stays dark.
    fn ghosted(&self) -> bool {
        self.cfg.ghost_mode() && self.modes.mode() == Mode::CombatAuto
    }

    fn indicate_mode(&mut self) {
        self.modes.indicate(self.io.light.as_mut(), &mut self.remote);
        if self.ghosted() {
            self.io.display.clear();
        }
    }

    fn apply_drive_settings(&mut self) {
        let settings = DriveSettings {
            straight_speed: self.cfg.max_speed(),
            straight_acceleration: self.cfg.acceleration(),
            turn_rate: self.cfg.turn_speed(),
            turn_acceleration: self.cfg.acceleration(),
        };
        self.io.drive.configure(settings);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
