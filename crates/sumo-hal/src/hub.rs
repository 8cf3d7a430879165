//! Devices built into the hub: 5x5 matrix display, speaker, status light
//! and the hub's own buttons.
//!
//! Glyph rendering and melody tables live behind these traits; the control
//! core only says *what* to show or play.

use sumo_types::{ButtonSet, Color, DigitStyle, Icon, Signal};

/// The hub's light matrix.
pub trait Display {
    /// Show `value` (0–99) as a two-digit number.
    fn digits(&mut self, value: u8, style: DigitStyle);
    fn icon(&mut self, icon: Icon);
    fn char(&mut self, c: char);
    fn text(&mut self, text: &str);
    /// Turn every pixel off.
    fn clear(&mut self);
}

/// The hub's speaker.
pub trait Speaker {
    /// Play a tone and block for its duration.
    fn beep(&mut self, frequency_hz: u32, duration_ms: u64);
    /// Set the output volume, 0–100 %.
    fn volume(&mut self, percent: u8);
    /// Play a fixed-length sequence to completion.
    fn play(&mut self, signal: Signal);
}

/// The hub's status light.
pub trait StatusLight {
    fn on(&mut self, color: Color);
    /// Pulse `color` with the given period.
    fn pulse(&mut self, color: Color, period_ms: u64);
}

/// The hub's own buttons (left, right, centre, bluetooth).
pub trait HubButtons {
    fn pressed(&mut self) -> ButtonSet;
}
