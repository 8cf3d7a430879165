//! `sumo-kernel` – Safety & State
//!
//! The rules the robot lives by.  It does not decide what to do; it keeps
//! the tunable parameters inside their limits and tells the loop when the
//! robot is lying on its back.
//!
//! # Modules
//!
//! - [`config`] – [`Configuration`][config::Configuration]: the bounded
//!   session parameter store.  Readers get `&Configuration`; the engineering
//!   console mutates it through a [`ConfigEditor`][config::ConfigEditor] and
//!   every write saturates at the parameter's bounds.  Also holds the
//!   installed [`WeaponRecording`][config::WeaponRecording] and the
//!   host-side [`ConfigPreset`][config::ConfigPreset].
//! - [`fall_monitor`] – [`FallMonitor`][fall_monitor::FallMonitor]:
//!   overturn detection with a 9 s grace countdown, a single defeat event
//!   per episode, and either auto-recovering or latching behaviour.

pub mod config;
pub mod fall_monitor;

pub use config::{
    Bounds, ConfigEditor, ConfigPreset, Configuration, DEFAULT_GEARS, Flag,
    MIN_RECORDING_SAMPLES, Param, WeaponRecording,
};
pub use fall_monitor::{DefeatPolicy, FallEvent, FallMonitor, GRACE_PERIOD_MS, REFERENCE_FACE};
