//! Single-axis weapon actuator (hammer, flipper, …).

use sumo_types::Completion;

/// A position-controlled weapon motor.
///
/// Angles are signed degrees from the motor's zero position.
pub trait WeaponMotor {
    /// Run to `angle` at `speed` deg/s.  With [`Completion::Wait`] the call
    /// returns once the target is reached.
    fn run_target(&mut self, speed: i32, angle: i32, completion: Completion);

    /// Stop the motor without holding torque, so the shaft can be moved by
    /// hand.
    fn coast(&mut self);

    /// Current shaft angle in degrees.
    fn angle(&self) -> i32;
}
