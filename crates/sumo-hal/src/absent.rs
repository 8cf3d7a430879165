//! Inert stand-ins for devices that failed to initialise.
//!
//! A missing peripheral is logged once at startup and replaced by one of
//! these.  They accept every command and report neutral readings: no target
//! in range, no ring edge, hub upright, no remote.

use sumo_types::{ButtonSet, Color, Completion, DigitStyle, Face, Icon, Signal, SumoError};

use crate::console::ConsoleInput;
use crate::drive::{DriveBase, DriveSettings};
use crate::hub::{Display, HubButtons, Speaker, StatusLight};
use crate::remote::{Remote, RemoteLink};
use crate::sensors::{DistanceSensor, OrientationSensor, ReflectanceSensor};
use crate::weapon::WeaponMotor;

/// Reading reported by an absent distance sensor.
pub const NO_TARGET_MM: u32 = 2000;

/// Reading reported by an absent floor sensor (bright, i.e. inside the ring).
pub const RING_FLOOR_PERCENT: u8 = 100;

pub struct AbsentDrive;

impl DriveBase for AbsentDrive {
    fn drive(&mut self, _speed: i32, _turn_rate: i32) {}
    fn stop(&mut self) {}
    fn turn(&mut self, _degrees: i32, _completion: Completion) {}
    fn straight(&mut self, _distance_mm: i32) {}
    fn configure(&mut self, _settings: DriveSettings) {}
}

pub struct AbsentWeapon;

impl WeaponMotor for AbsentWeapon {
    fn run_target(&mut self, _speed: i32, _angle: i32, _completion: Completion) {}
    fn coast(&mut self) {}
    fn angle(&self) -> i32 {
        0
    }
}

pub struct AbsentDistance;

impl DistanceSensor for AbsentDistance {
    fn distance(&mut self) -> u32 {
        NO_TARGET_MM
    }
}

pub struct AbsentReflectance;

impl ReflectanceSensor for AbsentReflectance {
    fn reflection(&mut self) -> u8 {
        RING_FLOOR_PERCENT
    }
}

pub struct AbsentOrientation;

impl OrientationSensor for AbsentOrientation {
    fn up(&mut self) -> Face {
        Face::Front
    }
}

pub struct AbsentDisplay;

impl Display for AbsentDisplay {
    fn digits(&mut self, _value: u8, _style: DigitStyle) {}
    fn icon(&mut self, _icon: Icon) {}
    fn char(&mut self, _c: char) {}
    fn text(&mut self, _text: &str) {}
    fn clear(&mut self) {}
}

pub struct AbsentSpeaker;

impl Speaker for AbsentSpeaker {
    fn beep(&mut self, _frequency_hz: u32, _duration_ms: u64) {}
    fn volume(&mut self, _percent: u8) {}
    fn play(&mut self, _signal: Signal) {}
}

pub struct AbsentLight;

impl StatusLight for AbsentLight {
    fn on(&mut self, _color: Color) {}
    fn pulse(&mut self, _color: Color, _period_ms: u64) {}
}

pub struct AbsentHubButtons;

impl HubButtons for AbsentHubButtons {
    fn pressed(&mut self) -> ButtonSet {
        ButtonSet::empty()
    }
}

pub struct AbsentRemoteLink;

impl RemoteLink for AbsentRemoteLink {
    fn connect(&mut self, _timeout_ms: u64) -> Result<Box<dyn Remote>, SumoError> {
        Err(SumoError::RemoteUnavailable(
            "no remote link configured".to_string(),
        ))
    }
}

pub struct AbsentConsole;

impl ConsoleInput for AbsentConsole {
    fn poll(&mut self) -> Option<char> {
        None
    }
}
