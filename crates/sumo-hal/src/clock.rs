//! Millisecond time source and stopwatch.
//!
//! Every wait in the control core goes through [`Clock::wait`], so the
//! simulator can run a whole match on virtual time.

use std::time::{Duration, Instant};

/// A monotonic millisecond clock that can also suspend the caller.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Suspend the caller for `ms` milliseconds.
    fn wait(&mut self, ms: u64);
}

/// Wall-clock implementation backed by [`Instant`] and [`std::thread::sleep`].
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn wait(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Elapsed-time measurement against a [`Clock`].
///
/// # Example
///
/// ```
/// use sumo_hal::clock::{Clock, StopWatch};
/// use sumo_hal::sim::SimWorld;
///
/// let world = SimWorld::new();
/// let mut clock = world.clock();
/// let watch = StopWatch::started(&clock);
/// clock.wait(250);
/// assert_eq!(watch.elapsed_ms(&clock), 250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopWatch {
    started_at: u64,
}

impl StopWatch {
    /// A stopwatch that starts counting now.
    pub fn started(clock: &dyn Clock) -> Self {
        Self {
            started_at: clock.now_ms(),
        }
    }

    /// Restart counting from now.
    pub fn reset(&mut self, clock: &dyn Clock) {
        self.started_at = clock.now_ms();
    }

    pub fn elapsed_ms(&self, clock: &dyn Clock) -> u64 {
        clock.now_ms().saturating_sub(self.started_at)
    }
}
