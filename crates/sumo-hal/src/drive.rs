//! Differential drive base.
//!
//! Two kinds of command exist.  [`DriveBase::drive`] is fire-and-forget: the
//! robot keeps moving at the requested speed until another command replaces
//! it.  [`DriveBase::straight`] and [`DriveBase::turn`] are maneuvers that may
//! block the caller until the wheels have covered the requested distance.

use sumo_types::Completion;

/// Motion limits applied to every subsequent drive command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveSettings {
    /// Straight-line speed cap (mm/s).
    pub straight_speed: i32,
    /// Straight-line acceleration (mm/s²).
    pub straight_acceleration: i32,
    /// Turn rate cap (deg/s).
    pub turn_rate: i32,
    /// Turn acceleration (deg/s²).
    pub turn_acceleration: i32,
}

/// A two-wheeled drive base.
pub trait DriveBase {
    /// Start moving at `speed` mm/s while turning at `turn_rate` deg/s.
    /// Returns immediately.
    fn drive(&mut self, speed: i32, turn_rate: i32);

    /// Stop both wheels.
    fn stop(&mut self);

    /// Rotate in place by `degrees` (positive = clockwise).
    fn turn(&mut self, degrees: i32, completion: Completion);

    /// Drive `distance_mm` in a straight line (negative = backwards) and
    /// block until done.
    fn straight(&mut self, distance_mm: i32);

    /// Replace the motion limits.
    fn configure(&mut self, settings: DriveSettings);
}
