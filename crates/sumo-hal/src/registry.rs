//! [`Peripherals`] – the device bundle handed to the controller.
//!
//! Devices are registered one by one on a [`PeripheralsBuilder`].  Anything
//! left unregistered when [`PeripheralsBuilder::build`] runs is treated as a
//! wiring error: it is logged once as
//! [`SumoError::PeripheralAbsent`][sumo_types::SumoError::PeripheralAbsent]
//! and replaced with its inert stand-in from [`absent`][crate::absent].  No
//! retry is attempted; the controller runs with whatever initialised.

use sumo_types::SumoError;
use tracing::warn;

use crate::absent::{
    AbsentConsole, AbsentDisplay, AbsentDistance, AbsentDrive, AbsentHubButtons, AbsentLight,
    AbsentOrientation, AbsentReflectance, AbsentRemoteLink, AbsentSpeaker, AbsentWeapon,
};
use crate::clock::{Clock, SystemClock};
use crate::console::ConsoleInput;
use crate::drive::DriveBase;
use crate::hub::{Display, HubButtons, Speaker, StatusLight};
use crate::remote::RemoteLink;
use crate::sensors::{DistanceSensor, OrientationSensor, ReflectanceSensor};
use crate::weapon::WeaponMotor;

/// Every device the control core talks to.
///
/// Fields are public so callers can borrow two devices at once (e.g. the
/// weapon and the clock during a strike).
pub struct Peripherals {
    pub drive: Box<dyn DriveBase>,
    pub weapon: Box<dyn WeaponMotor>,
    pub distance: Box<dyn DistanceSensor>,
    pub floor: Box<dyn ReflectanceSensor>,
    pub imu: Box<dyn OrientationSensor>,
    pub display: Box<dyn Display>,
    pub speaker: Box<dyn Speaker>,
    pub light: Box<dyn StatusLight>,
    pub buttons: Box<dyn HubButtons>,
    pub link: Box<dyn RemoteLink>,
    pub console: Box<dyn ConsoleInput>,
    pub clock: Box<dyn Clock>,
    absent: Vec<SumoError>,
}

impl Peripherals {
    /// Devices that were missing at startup, in registration order.
    pub fn absent(&self) -> &[SumoError] {
        &self.absent
    }
}

/// Builder for [`Peripherals`].
#[derive(Default)]
pub struct PeripheralsBuilder {
    drive: Option<Box<dyn DriveBase>>,
    weapon: Option<Box<dyn WeaponMotor>>,
    distance: Option<Box<dyn DistanceSensor>>,
    floor: Option<Box<dyn ReflectanceSensor>>,
    imu: Option<Box<dyn OrientationSensor>>,
    display: Option<Box<dyn Display>>,
    speaker: Option<Box<dyn Speaker>>,
    light: Option<Box<dyn StatusLight>>,
    buttons: Option<Box<dyn HubButtons>>,
    link: Option<Box<dyn RemoteLink>>,
    console: Option<Box<dyn ConsoleInput>>,
    clock: Option<Box<dyn Clock>>,
}

impl PeripheralsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drive(mut self, drive: Box<dyn DriveBase>) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn weapon(mut self, weapon: Box<dyn WeaponMotor>) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn distance(mut self, sensor: Box<dyn DistanceSensor>) -> Self {
        self.distance = Some(sensor);
        self
    }

    pub fn floor(mut self, sensor: Box<dyn ReflectanceSensor>) -> Self {
        self.floor = Some(sensor);
        self
    }

    pub fn imu(mut self, sensor: Box<dyn OrientationSensor>) -> Self {
        self.imu = Some(sensor);
        self
    }

    pub fn display(mut self, display: Box<dyn Display>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn speaker(mut self, speaker: Box<dyn Speaker>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn light(mut self, light: Box<dyn StatusLight>) -> Self {
        self.light = Some(light);
        self
    }

    pub fn buttons(mut self, buttons: Box<dyn HubButtons>) -> Self {
        self.buttons = Some(buttons);
        self
    }

    pub fn link(mut self, link: Box<dyn RemoteLink>) -> Self {
        self.link = Some(link);
        self
    }

    pub fn console(mut self, console: Box<dyn ConsoleInput>) -> Self {
        self.console = Some(console);
        self
    }

    /// Override the time source.  Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Consume the builder, substituting inert drivers for anything that was
    /// not registered.
    pub fn build(self) -> Peripherals {
        let mut absent = Vec::new();
        let mut missing = |device: &str| {
            let err = SumoError::PeripheralAbsent {
                device: device.to_string(),
            };
            warn!(error = %err, "continuing without device");
            absent.push(err);
        };

        let drive = self.drive.unwrap_or_else(|| {
            missing("drive");
            Box::new(AbsentDrive)
        });
        let weapon = self.weapon.unwrap_or_else(|| {
            missing("weapon");
            Box::new(AbsentWeapon)
        });
        let distance = self.distance.unwrap_or_else(|| {
            missing("distance_sensor");
            Box::new(AbsentDistance)
        });
        let floor = self.floor.unwrap_or_else(|| {
            missing("floor_sensor");
            Box::new(AbsentReflectance)
        });
        let imu = self.imu.unwrap_or_else(|| {
            missing("imu");
            Box::new(AbsentOrientation)
        });
        let display = self.display.unwrap_or_else(|| {
            missing("display");
            Box::new(AbsentDisplay)
        });
        let speaker = self.speaker.unwrap_or_else(|| {
            missing("speaker");
            Box::new(AbsentSpeaker)
        });
        let light = self.light.unwrap_or_else(|| {
            missing("status_light");
            Box::new(AbsentLight)
        });
        let buttons = self.buttons.unwrap_or_else(|| {
            missing("hub_buttons");
            Box::new(AbsentHubButtons)
        });
        let link = self.link.unwrap_or_else(|| {
            missing("remote_link");
            Box::new(AbsentRemoteLink)
        });
        // The keyboard channel is optional on the robot; no warning.
        let console = self.console.unwrap_or_else(|| Box::new(AbsentConsole));
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock::new()));

        Peripherals {
            drive,
            weapon,
            distance,
            floor,
            imu,
            display,
            speaker,
            light,
            buttons,
            link,
            console,
            clock,
            absent,
        }
    }
}
