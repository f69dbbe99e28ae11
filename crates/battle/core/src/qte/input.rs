//! Abstract input events.
//!
//! Raw device polling happens outside the engine; callers translate it into
//! these events, stamped with the battle clock.
use strum::{AsRefStr, Display, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Key {
    Space,
    Enter,
    Q,
    W,
    E,
    R,
    A,
    S,
    D,
    F,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit vector in screen coordinates (y grows downward).
    pub const fn unit(self) -> (f64, f64) {
        match self {
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputEvent {
    KeyDown { key: Key, at: f64 },
    KeyUp { key: Key, at: f64 },
    PointerDelta { dx: f64, dy: f64, at: f64 },
}

impl InputEvent {
    /// Battle-clock timestamp of the event.
    pub fn at(&self) -> f64 {
        match *self {
            Self::KeyDown { at, .. } | Self::KeyUp { at, .. } | Self::PointerDelta { at, .. } => {
                at
            }
        }
    }
}
