//! Weather snapshots.
//!
//! The controller holds one read-only [`WeatherSnapshot`] at a time and
//! swaps it when the caller reports a change. Modifiers are flat except for
//! the damage multipliers.
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::combatant::ArchetypeFamily;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WeatherKind {
    #[default]
    Clear,
    Rain,
    Storm,
    Fog,
    Snow,
}

/// Family-specific weather adjustments.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FamilyWeather {
    pub damage_multiplier: f64,
    pub defense: f64,
    pub speed: f64,
    pub evasion: f64,
    pub crit: f64,
    /// Accuracy change for attackers of this family.
    pub hit_rate: f64,
}

impl FamilyWeather {
    pub const NEUTRAL: Self = Self {
        damage_multiplier: 1.0,
        defense: 0.0,
        speed: 0.0,
        evasion: 0.0,
        crit: 0.0,
        hit_rate: 0.0,
    };
}

impl Default for FamilyWeather {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeatherSnapshot {
    pub kind: WeatherKind,
    /// Accuracy change for every attacker; negative values make hits rarer.
    pub hit_rate_mod: f64,
    pub speed_mod: f64,
    pub defense_mod: f64,
    pub evasion_mod: f64,
    pub damage_multiplier: f64,
    pub tank: FamilyWeather,
    pub warrior: FamilyWeather,
    pub ranger: FamilyWeather,
}

impl WeatherSnapshot {
    pub fn clear() -> Self {
        Self {
            kind: WeatherKind::Clear,
            hit_rate_mod: 0.0,
            speed_mod: 0.0,
            defense_mod: 0.0,
            evasion_mod: 0.0,
            damage_multiplier: 1.0,
            tank: FamilyWeather::NEUTRAL,
            warrior: FamilyWeather::NEUTRAL,
            ranger: FamilyWeather::NEUTRAL,
        }
    }

    /// Built-in table for each weather kind.
    pub fn preset(kind: WeatherKind) -> Self {
        let base = Self {
            kind,
            ..Self::clear()
        };
        match kind {
            WeatherKind::Clear => base,
            WeatherKind::Rain => Self {
                hit_rate_mod: -0.1,
                tank: FamilyWeather {
                    defense: -2.0,
                    ..FamilyWeather::NEUTRAL
                },
                warrior: FamilyWeather {
                    speed: -1.0,
                    ..FamilyWeather::NEUTRAL
                },
                ranger: FamilyWeather {
                    evasion: 0.05,
                    ..FamilyWeather::NEUTRAL
                },
                ..base
            },
            WeatherKind::Storm => Self {
                speed_mod: -2.0,
                damage_multiplier: 1.1,
                tank: FamilyWeather {
                    defense: 3.0,
                    ..FamilyWeather::NEUTRAL
                },
                warrior: FamilyWeather {
                    damage_multiplier: 1.04,
                    ..FamilyWeather::NEUTRAL
                },
                ranger: FamilyWeather {
                    damage_multiplier: 1.06,
                    ..FamilyWeather::NEUTRAL
                },
                ..base
            },
            WeatherKind::Fog => Self {
                hit_rate_mod: -0.15,
                tank: FamilyWeather {
                    hit_rate: -0.05,
                    ..FamilyWeather::NEUTRAL
                },
                warrior: FamilyWeather {
                    hit_rate: -0.05,
                    ..FamilyWeather::NEUTRAL
                },
                ranger: FamilyWeather {
                    crit: 0.05,
                    evasion: 0.1,
                    ..FamilyWeather::NEUTRAL
                },
                ..base
            },
            WeatherKind::Snow => Self {
                speed_mod: -1.0,
                evasion_mod: -0.05,
                tank: FamilyWeather {
                    defense: 4.0,
                    ..FamilyWeather::NEUTRAL
                },
                warrior: FamilyWeather {
                    defense: 2.0,
                    ..FamilyWeather::NEUTRAL
                },
                ranger: FamilyWeather {
                    hit_rate: -0.1,
                    ..FamilyWeather::NEUTRAL
                },
                ..base
            },
        }
    }

    pub fn for_family(&self, family: ArchetypeFamily) -> &FamilyWeather {
        match family {
            ArchetypeFamily::Tank => &self.tank,
            ArchetypeFamily::Warrior => &self.warrior,
            ArchetypeFamily::Ranger => &self.ranger,
        }
    }
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self::clear()
    }
}
