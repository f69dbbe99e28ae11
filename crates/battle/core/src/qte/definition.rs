use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::input::{Direction, Key};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum QteKind {
    Press,
    Sequence,
    Hold,
    Motion,
    MultiPress,
}

/// What the player must do to complete a challenge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QtePattern {
    /// Any one of `keys`.
    Press { keys: Vec<Key> },
    /// All of `keys`, in order.
    Sequence { keys: Vec<Key> },
    /// Keep `key` down for `duration` seconds.
    Hold { key: Key, duration: f64 },
    /// Drag at least `distance` along `direction`.
    Motion { direction: Direction, distance: f64 },
    /// `count` presses of `key`, each within `interval` of the previous one.
    MultiPress { key: Key, count: u32, interval: f64 },
}

impl QtePattern {
    pub fn kind(&self) -> QteKind {
        match self {
            Self::Press { .. } => QteKind::Press,
            Self::Sequence { .. } => QteKind::Sequence,
            Self::Hold { .. } => QteKind::Hold,
            Self::Motion { .. } => QteKind::Motion,
            Self::MultiPress { .. } => QteKind::MultiPress,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QteDefinition {
    pub pattern: QtePattern,
    /// Seconds allowed from session start.
    pub window: f64,
    /// Multiplier granted by a perfect rating.
    pub bonus: f64,
}

impl QteDefinition {
    pub fn kind(&self) -> QteKind {
        self.pattern.kind()
    }

    /// Built-in challenge table.
    pub fn standard() -> Vec<Self> {
        vec![
            Self {
                pattern: QtePattern::Press {
                    keys: vec![Key::Space],
                },
                window: 0.5,
                bonus: 1.5,
            },
            Self {
                pattern: QtePattern::Sequence {
                    keys: vec![Key::Q, Key::W, Key::E],
                },
                window: 1.0,
                bonus: 1.6,
            },
            Self {
                pattern: QtePattern::Hold {
                    key: Key::R,
                    duration: 1.5,
                },
                window: 2.5,
                bonus: 2.0,
            },
            Self {
                pattern: QtePattern::Motion {
                    direction: Direction::Right,
                    distance: 100.0,
                },
                window: 0.8,
                bonus: 1.5,
            },
            Self {
                pattern: QtePattern::MultiPress {
                    key: Key::Space,
                    count: 2,
                    interval: 0.2,
                },
                window: 0.6,
                bonus: 1.6,
            },
        ]
    }
}
