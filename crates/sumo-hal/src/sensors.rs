//! Read-only sensors polled once per tick.

use sumo_types::Face;

/// Forward-facing ultrasonic distance sensor.
pub trait DistanceSensor {
    /// Distance to the nearest object in millimetres.  Sensors report a
    /// large value when nothing is in range.
    fn distance(&mut self) -> u32;
}

/// Downward-facing colour sensor used to spot the ring boundary.
pub trait ReflectanceSensor {
    /// Reflected light intensity, 0–100 %.
    fn reflection(&mut self) -> u8;
}

/// Inertial unit of the hub.
pub trait OrientationSensor {
    /// Which hub face currently points up.
    fn up(&mut self) -> Face;
}
