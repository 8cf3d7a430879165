//! `sumo-hal` – Peripheral Abstraction
//!
//! The control core never talks to a motor, sensor, or radio directly.  It
//! sees each device through a narrow capability trait defined here, so the
//! real drivers, the simulator, and the inert stand-ins for missing devices
//! are interchangeable.
//!
//! # Modules
//!
//! - [`drive`] – [`DriveBase`][drive::DriveBase]: differential drive with a
//!   continuous velocity API plus blocking straight/turn maneuvers.
//! - [`weapon`] – [`WeaponMotor`][weapon::WeaponMotor]: the single-axis
//!   weapon actuator.
//! - [`sensors`] – distance, floor reflectance and orientation sensors.
//! - [`remote`] – [`Remote`][remote::Remote] and the fallible
//!   [`RemoteLink`][remote::RemoteLink] used to (re)connect it.
//! - [`hub`] – display, speaker, status light and hub buttons.
//! - [`clock`] – [`Clock`][clock::Clock] and [`StopWatch`][clock::StopWatch].
//! - [`console`] – the non-blocking keyboard command channel.
//! - [`absent`] – inert drivers substituted for devices that failed to
//!   initialise.
//! - [`registry`] – [`Peripherals`][registry::Peripherals], the bundle handed
//!   to the controller, and its builder.
//! - [`sim`] – simulated drivers with a shared command journal and a virtual
//!   clock, for headless tests and the host binary.

pub mod absent;
pub mod clock;
pub mod console;
pub mod drive;
pub mod hub;
pub mod registry;
pub mod remote;
pub mod sensors;
pub mod sim;
pub mod weapon;

pub use clock::{Clock, StopWatch, SystemClock};
pub use console::ConsoleInput;
pub use drive::{DriveBase, DriveSettings};
pub use hub::{Display, HubButtons, Speaker, StatusLight};
pub use registry::{Peripherals, PeripheralsBuilder};
pub use remote::{Remote, RemoteLink};
pub use sensors::{DistanceSensor, OrientationSensor, ReflectanceSensor};
pub use weapon::WeaponMotor;
