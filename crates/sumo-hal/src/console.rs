//! Secondary control path: single-character commands from a host keyboard.

/// Non-blocking source of keyboard characters.
pub trait ConsoleInput {
    /// Return the next pending character, or `None` when nothing is queued.
    /// Never blocks.
    fn poll(&mut self) -> Option<char>;
}
