//! `sumo-runtime` – Behaviour & Main Loop
//!
//! Everything the robot *does*: reading the remote, choosing a combat
//! action, swinging the weapon, running the engineering console, and the
//! fixed-period loop that ties them together.
//!
//! # Modules
//!
//! - [`control_loop`] – [`Controller`][control_loop::Controller]: owns the
//!   [`Peripherals`][sumo_hal::Peripherals] and the session state and runs
//!   one ordered pass per tick (console, safety, keyboard, remote, policy,
//!   console gesture, sleep).
//! - [`policy`] – [`decide`][policy::decide]: a pure function from mode,
//!   buttons, sensor readings and configuration to a list of
//!   [`Action`][policy::Action]s.
//! - [`mode`] – [`ModeMachine`][mode::ModeMachine]: the active mode, the
//!   centre-button cycle and the bounded hack override.
//! - [`weapon`] – strike playback, [`PuppetRecorder`][weapon::PuppetRecorder]
//!   capture and [`AngleCalibrator`][weapon::AngleCalibrator].
//! - [`console`] – [`EngineerConsole`][console::EngineerConsole]: on-device
//!   parameter editing as a nested state machine.
//! - [`input`] – button edges, long-press detection and auto-repeat
//!   cooldowns.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: the global
//!   `tracing` subscriber with optional OTLP export.
//!
//! # Safety ordering
//!
//! The fall monitor runs before any actuator command is issued.  While it
//! reports a fall no policy action, remote command or keyboard command
//! reaches the drive or the weapon.

pub mod console;
pub mod control_loop;
pub mod input;
pub mod mode;
pub mod policy;
pub mod telemetry;
pub mod weapon;

pub use console::{ConsoleOutcome, EngineerConsole, Group, MenuLayout};
pub use control_loop::{Controller, ControllerProfile, DEFAULT_TICK_MS};
pub use input::{Cooldown, Gesture, HoldDetector, InputEdges, pressed_edges};
pub use mode::ModeMachine;
pub use policy::{Action, PolicyInput, SensorReadings, decide};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
