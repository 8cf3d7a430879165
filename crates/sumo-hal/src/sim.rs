//! In-process simulation for headless testing without a robot.
//!
//! [`SimWorld`] is a shared, scriptable model of the arena: tests (or the
//! host binary) set sensor readings and held buttons on it, and every
//! command the controller issues is appended to a [`HwEvent`] journal that
//! can be asserted on afterwards.  Time is virtual: [`SimClock::wait`] and
//! blocking maneuvers advance the world clock instead of sleeping.
//!
//! [`SimRig`] builds a [`Peripherals`] bundle whose drivers all point at the
//! same world.
//!
//! # Example
//!
//! ```rust
//! use sumo_hal::sim::{HwEvent, SimRig};
//!
//! let rig = SimRig::new().with_drive_base();
//! let world = rig.world();
//! let mut p = rig.build();
//!
//! p.drive.drive(300, 0);
//! assert_eq!(world.journal(), vec![HwEvent::Drive { speed: 300, turn_rate: 0 }]);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use sumo_types::{
    ButtonSet, Color, Completion, DigitStyle, Face, Icon, Signal, SumoError,
};

use crate::absent::{NO_TARGET_MM, RING_FLOOR_PERCENT};
use crate::clock::Clock;
use crate::console::ConsoleInput;
use crate::drive::{DriveBase, DriveSettings};
use crate::hub::{Display, HubButtons, Speaker, StatusLight};
use crate::registry::{Peripherals, PeripheralsBuilder};
use crate::remote::{Remote, RemoteLink};
use crate::sensors::{DistanceSensor, OrientationSensor, ReflectanceSensor};
use crate::weapon::WeaponMotor;

// ────────────────────────────────────────────────────────────────────────────
// Journal
// ────────────────────────────────────────────────────────────────────────────

/// One command observed by a simulated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwEvent {
    Drive { speed: i32, turn_rate: i32 },
    DriveStop,
    Turn { degrees: i32, completion: Completion },
    Straight { distance_mm: i32 },
    DriveConfigured(DriveSettings),
    WeaponTarget { speed: i32, angle: i32, completion: Completion },
    WeaponCoast,
    Light(Color),
    LightPulse(Color),
    RemoteLight(Color),
    Digits { value: u8, style: DigitStyle },
    Icon(Icon),
    Char(char),
    Text(String),
    DisplayClear,
    Beep { frequency_hz: u32, duration_ms: u64 },
    Volume(u8),
    Signal(Signal),
    RemoteConnect { ok: bool },
}

// ────────────────────────────────────────────────────────────────────────────
// World state
// ────────────────────────────────────────────────────────────────────────────

struct SimState {
    now_ms: u64,
    journal: Vec<HwEvent>,
    distance_mm: u32,
    reflection: u8,
    face: Face,
    weapon_angle: i32,
    remote_buttons: ButtonSet,
    remote_online: bool,
    hub_buttons: ButtonSet,
    keys: VecDeque<char>,
    drive_settings: Option<DriveSettings>,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            now_ms: 0,
            journal: Vec::new(),
            distance_mm: NO_TARGET_MM,
            reflection: RING_FLOOR_PERCENT,
            face: Face::Front,
            weapon_angle: 0,
            remote_buttons: ButtonSet::empty(),
            remote_online: true,
            hub_buttons: ButtonSet::empty(),
            keys: VecDeque::new(),
            drive_settings: None,
        }
    }
}

impl SimState {
    fn record(&mut self, event: HwEvent) {
        self.journal.push(event);
    }
}

/// Shared handle to the simulated arena.  Cloning is cheap; every clone sees
/// the same state.
#[derive(Clone, Default)]
pub struct SimWorld(Rc<RefCell<SimState>>);

impl SimWorld {
    /// A world with the robot upright, nothing in range, a bright floor and
    /// an online remote with no buttons held.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_distance(&self, mm: u32) {
        self.0.borrow_mut().distance_mm = mm;
    }

    pub fn set_reflection(&self, percent: u8) {
        self.0.borrow_mut().reflection = percent;
    }

    pub fn set_face(&self, face: Face) {
        self.0.borrow_mut().face = face;
    }

    /// Move the weapon shaft as if by hand.
    pub fn set_weapon_angle(&self, angle: i32) {
        self.0.borrow_mut().weapon_angle = angle;
    }

    pub fn weapon_angle(&self) -> i32 {
        self.0.borrow().weapon_angle
    }

    pub fn hold_remote(&self, buttons: impl Into<ButtonSet>) {
        self.0.borrow_mut().remote_buttons = buttons.into();
    }

    pub fn release_remote(&self) {
        self.0.borrow_mut().remote_buttons = ButtonSet::empty();
    }

    pub fn hold_hub(&self, buttons: impl Into<ButtonSet>) {
        self.0.borrow_mut().hub_buttons = buttons.into();
    }

    pub fn release_hub(&self) {
        self.0.borrow_mut().hub_buttons = ButtonSet::empty();
    }

    /// Take the remote out of range (or bring it back).
    pub fn set_remote_online(&self, online: bool) {
        self.0.borrow_mut().remote_online = online;
    }

    /// Queue keyboard characters for the console channel.
    pub fn type_keys(&self, keys: &str) {
        self.0.borrow_mut().keys.extend(keys.chars());
    }

    pub fn now_ms(&self) -> u64 {
        self.0.borrow().now_ms
    }

    /// Advance virtual time without any device being involved.
    pub fn advance(&self, ms: u64) {
        self.0.borrow_mut().now_ms += ms;
    }

    /// Snapshot of every command recorded so far.
    pub fn journal(&self) -> Vec<HwEvent> {
        self.0.borrow().journal.clone()
    }

    /// Return the recorded commands and clear the journal.
    pub fn take_journal(&self) -> Vec<HwEvent> {
        std::mem::take(&mut self.0.borrow_mut().journal)
    }

    /// A [`SimClock`] bound to this world.
    pub fn clock(&self) -> SimClock {
        SimClock(self.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut SimState) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Devices
// ────────────────────────────────────────────────────────────────────────────

/// Virtual clock: `wait` advances world time.
pub struct SimClock(SimWorld);

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.0.now_ms()
    }

    fn wait(&mut self, ms: u64) {
        self.0.advance(ms);
    }
}

/// Travel time of a blocking motion at `speed` units/s, at least 1 ms.
fn travel_ms(distance: i32, speed: i32) -> u64 {
    let speed = speed.unsigned_abs().max(1) as u64;
    (distance.unsigned_abs() as u64 * 1000 / speed).max(1)
}

pub struct SimDrive(SimWorld);

impl DriveBase for SimDrive {
    fn drive(&mut self, speed: i32, turn_rate: i32) {
        self.0.with(|s| s.record(HwEvent::Drive { speed, turn_rate }));
    }

    fn stop(&mut self) {
        self.0.with(|s| s.record(HwEvent::DriveStop));
    }

    fn turn(&mut self, degrees: i32, completion: Completion) {
        self.0.with(|s| {
            s.record(HwEvent::Turn {
                degrees,
                completion,
            });
            if completion == Completion::Wait {
                let rate = s.drive_settings.map_or(150, |d| d.turn_rate);
                s.now_ms += travel_ms(degrees, rate);
            }
        });
    }

    fn straight(&mut self, distance_mm: i32) {
        self.0.with(|s| {
            s.record(HwEvent::Straight { distance_mm });
            let speed = s.drive_settings.map_or(500, |d| d.straight_speed);
            s.now_ms += travel_ms(distance_mm, speed);
        });
    }

    fn configure(&mut self, settings: DriveSettings) {
        self.0.with(|s| {
            s.drive_settings = Some(settings);
            s.record(HwEvent::DriveConfigured(settings));
        });
    }
}

pub struct SimWeapon(SimWorld);

impl WeaponMotor for SimWeapon {
    fn run_target(&mut self, speed: i32, angle: i32, completion: Completion) {
        self.0.with(|s| {
            s.record(HwEvent::WeaponTarget {
                speed,
                angle,
                completion,
            });
            if completion == Completion::Wait {
                s.now_ms += travel_ms(angle - s.weapon_angle, speed);
            }
            s.weapon_angle = angle;
        });
    }

    fn coast(&mut self) {
        self.0.with(|s| s.record(HwEvent::WeaponCoast));
    }

    fn angle(&self) -> i32 {
        self.0.weapon_angle()
    }
}

pub struct SimDistance(SimWorld);

impl DistanceSensor for SimDistance {
    fn distance(&mut self) -> u32 {
        self.0.with(|s| s.distance_mm)
    }
}

pub struct SimReflectance(SimWorld);

impl ReflectanceSensor for SimReflectance {
    fn reflection(&mut self) -> u8 {
        self.0.with(|s| s.reflection)
    }
}

pub struct SimOrientation(SimWorld);

impl OrientationSensor for SimOrientation {
    fn up(&mut self) -> Face {
        self.0.with(|s| s.face)
    }
}

pub struct SimDisplay(SimWorld);

impl Display for SimDisplay {
    fn digits(&mut self, value: u8, style: DigitStyle) {
        self.0.with(|s| s.record(HwEvent::Digits { value, style }));
    }

    fn icon(&mut self, icon: Icon) {
        self.0.with(|s| s.record(HwEvent::Icon(icon)));
    }

    fn char(&mut self, c: char) {
        self.0.with(|s| s.record(HwEvent::Char(c)));
    }

    fn text(&mut self, text: &str) {
        self.0.with(|s| s.record(HwEvent::Text(text.to_string())));
    }

    fn clear(&mut self) {
        self.0.with(|s| s.record(HwEvent::DisplayClear));
    }
}

pub struct SimSpeaker(SimWorld);

impl Speaker for SimSpeaker {
    fn beep(&mut self, frequency_hz: u32, duration_ms: u64) {
        self.0.with(|s| {
            s.record(HwEvent::Beep {
                frequency_hz,
                duration_ms,
            });
            s.now_ms += duration_ms;
        });
    }

    fn volume(&mut self, percent: u8) {
        self.0.with(|s| s.record(HwEvent::Volume(percent)));
    }

    fn play(&mut self, signal: Signal) {
        self.0.with(|s| s.record(HwEvent::Signal(signal)));
    }
}

pub struct SimLight(SimWorld);

impl StatusLight for SimLight {
    fn on(&mut self, color: Color) {
        self.0.with(|s| s.record(HwEvent::Light(color)));
    }

    fn pulse(&mut self, color: Color, _period_ms: u64) {
        self.0.with(|s| s.record(HwEvent::LightPulse(color)));
    }
}

pub struct SimHubButtons(SimWorld);

impl HubButtons for SimHubButtons {
    fn pressed(&mut self) -> ButtonSet {
        self.0.with(|s| s.hub_buttons)
    }
}

/// Simulated remote.  Fails every call once the world takes it offline; the
/// handle stays dead even if the remote comes back, like a dropped radio
/// link.
pub struct SimRemote {
    world: SimWorld,
    dead: bool,
}

impl SimRemote {
    fn check(&mut self) -> Result<(), SumoError> {
        if self.dead || !self.world.with(|s| s.remote_online) {
            self.dead = true;
            return Err(SumoError::RemoteDisconnected(
                "simulated remote out of range".to_string(),
            ));
        }
        Ok(())
    }
}

impl Remote for SimRemote {
    fn pressed(&mut self) -> Result<ButtonSet, SumoError> {
        self.check()?;
        Ok(self.world.with(|s| s.remote_buttons))
    }

    fn set_light(&mut self, color: Color) -> Result<(), SumoError> {
        self.check()?;
        self.world.with(|s| s.record(HwEvent::RemoteLight(color)));
        Ok(())
    }
}

pub struct SimRemoteLink(SimWorld);

impl RemoteLink for SimRemoteLink {
    fn connect(&mut self, timeout_ms: u64) -> Result<Box<dyn Remote>, SumoError> {
        let online = self.0.with(|s| {
            let online = s.remote_online;
            s.record(HwEvent::RemoteConnect { ok: online });
            if !online {
                s.now_ms += timeout_ms;
            }
            online
        });
        if online {
            Ok(Box::new(SimRemote {
                world: self.0.clone(),
                dead: false,
            }))
        } else {
            Err(SumoError::RemoteUnavailable(format!(
                "no simulated remote answered within {timeout_ms} ms"
            )))
        }
    }
}

pub struct SimConsole(SimWorld);

impl ConsoleInput for SimConsole {
    fn poll(&mut self) -> Option<char> {
        self.0.with(|s| s.keys.pop_front())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder that constructs a [`Peripherals`] bundle of simulated drivers
/// sharing one [`SimWorld`].
///
/// Call the `with_*` methods for the devices you need (or [`SimRig::full`]
/// for all of them), then [`build`][Self::build].  Devices left out are
/// substituted by the registry's inert drivers.  The clock is the world's
/// virtual clock unless [`with_clock`][Self::with_clock] replaces it.
pub struct SimRig {
    world: SimWorld,
    builder: PeripheralsBuilder,
}

impl Default for SimRig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRig {
    pub fn new() -> Self {
        let world = SimWorld::new();
        let builder = PeripheralsBuilder::new().clock(Box::new(world.clock()));
        Self { world, builder }
    }

    /// Every simulated device, including the keyboard channel.
    pub fn full() -> Self {
        Self::new()
            .with_drive_base()
            .with_weapon()
            .with_sensors()
            .with_hub()
            .with_remote()
            .with_console()
    }

    pub fn world(&self) -> SimWorld {
        self.world.clone()
    }

    pub fn with_drive_base(mut self) -> Self {
        self.builder = self.builder.drive(Box::new(SimDrive(self.world.clone())));
        self
    }

    pub fn with_weapon(mut self) -> Self {
        self.builder = self.builder.weapon(Box::new(SimWeapon(self.world.clone())));
        self
    }

    /// Distance, floor and orientation sensors.
    pub fn with_sensors(mut self) -> Self {
        self.builder = self
            .builder
            .distance(Box::new(SimDistance(self.world.clone())))
            .floor(Box::new(SimReflectance(self.world.clone())))
            .imu(Box::new(SimOrientation(self.world.clone())));
        self
    }

    /// Display, speaker, status light and hub buttons.
    pub fn with_hub(mut self) -> Self {
        self.builder = self
            .builder
            .display(Box::new(SimDisplay(self.world.clone())))
            .speaker(Box::new(SimSpeaker(self.world.clone())))
            .light(Box::new(SimLight(self.world.clone())))
            .buttons(Box::new(SimHubButtons(self.world.clone())));
        self
    }

    pub fn with_remote(mut self) -> Self {
        self.builder = self.builder.link(Box::new(SimRemoteLink(self.world.clone())));
        self
    }

    pub fn with_console(mut self) -> Self {
        self.builder = self.builder.console(Box::new(SimConsole(self.world.clone())));
        self
    }

    /// Replace the simulated keyboard with another source (the host binary
    /// feeds real stdin through here).
    pub fn with_console_input(mut self, console: Box<dyn ConsoleInput>) -> Self {
        self.builder = self.builder.console(console);
        self
    }

    /// Pace the loop with another clock.  Device motions still advance the
    /// world's virtual time.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.builder = self.builder.clock(clock);
        self
    }

    pub fn build(self) -> Peripherals {
        self.builder.build()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
