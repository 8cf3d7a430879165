//! Wireless remote and the link used to (re)connect it.
//!
//! The remote is the only peripheral expected to come and go at runtime.  A
//! failed read means the link dropped; the caller discards its handle and
//! asks the [`RemoteLink`] for a new one on a later tick.

use sumo_types::{ButtonSet, Color, SumoError};

/// A connected remote.
pub trait Remote {
    /// Buttons currently held.
    ///
    /// # Errors
    ///
    /// Returns [`SumoError::RemoteDisconnected`] when the remote no longer
    /// answers.  The handle should be dropped.
    fn pressed(&mut self) -> Result<ButtonSet, SumoError>;

    /// Set the remote's status light.
    ///
    /// # Errors
    ///
    /// Returns [`SumoError::RemoteDisconnected`] when the remote no longer
    /// answers.
    fn set_light(&mut self, color: Color) -> Result<(), SumoError>;
}

/// Factory for [`Remote`] handles.
pub trait RemoteLink {
    /// Try to pair with a remote, waiting at most `timeout_ms`.  A timeout of
    /// zero makes the attempt non-blocking.
    ///
    /// # Errors
    ///
    /// Returns [`SumoError::RemoteUnavailable`] when no remote answered in
    /// time.
    fn connect(&mut self, timeout_ms: u64) -> Result<Box<dyn Remote>, SumoError>;
}
