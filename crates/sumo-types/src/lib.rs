use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operating mode of the robot.  Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Manual driving from the remote.
    Drive,
    /// Sensor-driven attack/search, no ring-edge guard.
    CombatSemi,
    /// Full autonomy: attack, ram strategy and ring-edge avoidance.
    CombatAuto,
    /// Bounded-use scripted override that forces [`Mode::CombatSemi`].
    Hacker,
}

impl Mode {
    /// Position of the mode in the cycle order.
    pub fn index(self) -> usize {
        match self {
            Mode::Drive => 0,
            Mode::CombatSemi => 1,
            Mode::CombatAuto => 2,
            Mode::Hacker => 3,
        }
    }

    /// Indicator colour shown on the hub and on the remote.
    pub fn color(self) -> Color {
        match self {
            Mode::Drive => Color::Green,
            Mode::CombatSemi => Color::Orange,
            Mode::CombatAuto => Color::Magenta,
            Mode::Hacker => Color::Blue,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Drive => "drive",
            Mode::CombatSemi => "combat_semi",
            Mode::CombatAuto => "combat_auto",
            Mode::Hacker => "hacker",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The set of modes the centre button cycles through.
///
/// The classic controller shipped without the hacker mode; it is modelled
/// here as a restriction of the four-mode set rather than a separate design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSet {
    Three,
    #[default]
    Four,
}

impl ModeSet {
    const ALL: [Mode; 4] = [Mode::Drive, Mode::CombatSemi, Mode::CombatAuto, Mode::Hacker];

    /// Number of modes in the cycle.
    pub fn count(self) -> usize {
        match self {
            ModeSet::Three => 3,
            ModeSet::Four => 4,
        }
    }

    pub fn modes(self) -> &'static [Mode] {
        &Self::ALL[..self.count()]
    }

    pub fn contains(self, mode: Mode) -> bool {
        mode.index() < self.count()
    }

    /// `(current + 1) mod N`.  A mode outside the set restarts the cycle.
    pub fn next(self, current: Mode) -> Mode {
        let n = self.count();
        let idx = if self.contains(current) {
            (current.index() + 1) % n
        } else {
            0
        };
        Self::ALL[idx]
    }
}

/// A physical button on the remote or on the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    LeftPlus,
    LeftMinus,
    /// Red button on the left side of the remote; also the hub's left arrow.
    Left,
    RightPlus,
    RightMinus,
    /// Red button on the right side of the remote; also the hub's right arrow.
    Right,
    Center,
    /// Hub-only button used for the engineering-console gesture.
    Bluetooth,
}

impl Button {
    const ALL: [Button; 8] = [
        Button::LeftPlus,
        Button::LeftMinus,
        Button::Left,
        Button::RightPlus,
        Button::RightMinus,
        Button::Right,
        Button::Center,
        Button::Bluetooth,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Compact set of pressed buttons sampled in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct ButtonSet(u16);

impl ButtonSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub fn remove(&mut self, button: Button) {
        self.0 &= !button.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Buttons present in `self` but not in `other`.
    pub fn difference(self, other: ButtonSet) -> ButtonSet {
        ButtonSet(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        let mut set = ButtonSet::empty();
        for b in iter {
            set.insert(b);
        }
        set
    }
}

impl<const N: usize> From<[Button; N]> for ButtonSet {
    fn from(buttons: [Button; N]) -> Self {
        buttons.into_iter().collect()
    }
}

/// Light colours available on the hub and on the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Green,
    Orange,
    Magenta,
    Blue,
    Red,
}

/// Icons the display layer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Happy,
    Angry,
    /// "Knocked out" face shown on defeat.
    Ko,
    Question,
    Kanji,
    Clock,
    Check,
}

impl Icon {
    /// Face icon for a personality level (1..=5).  Out-of-range levels get
    /// the happy face.
    pub fn for_personality(level: i32) -> Icon {
        match level {
            2 => Icon::Angry,
            3 => Icon::Ko,
            4 => Icon::Question,
            5 => Icon::Kanji,
            _ => Icon::Happy,
        }
    }
}

/// Hub face pointing up, as reported by the orientation sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Front,
    Back,
    Top,
    Bottom,
    Left,
    Right,
}

/// Fixed audio sequences owned by the audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Played once when a fall turns into a lost match.
    Defeat,
}

/// Whether a motion command waits for the motion to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Completion {
    Wait,
    Detach,
}

/// How two-digit numbers are rendered on the 5x5 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigitStyle {
    /// Tens and ones overlaid at two brightness levels.
    DoubleVision,
    /// Ones digit only, full brightness.
    Plain,
}

/// Single-character commands from the host keyboard channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsoleCommand {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Strike,
    Stop,
}

impl ConsoleCommand {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'w' => Some(ConsoleCommand::Forward),
            's' => Some(ConsoleCommand::Backward),
            'a' => Some(ConsoleCommand::TurnLeft),
            'd' => Some(ConsoleCommand::TurnRight),
            ' ' => Some(ConsoleCommand::Strike),
            'x' => Some(ConsoleCommand::Stop),
            _ => None,
        }
    }
}

/// Error taxonomy for peripheral access and host setup.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SumoError {
    #[error("Peripheral absent at startup: {device}")]
    PeripheralAbsent { device: String },

    #[error("Remote disconnected: {0}")]
    RemoteDisconnected(String),

    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Preset error: {0}")]
    Preset(String),
}
