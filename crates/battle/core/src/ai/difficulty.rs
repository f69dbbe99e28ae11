use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr, EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Nightmare,
}

/// How the fallback basic attack picks its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetPolicy {
    Random,
    /// Lowest hp fraction.
    Weakest,
    /// Back-row targets first, then the weakest.
    BackLine,
    /// Highest strategic score; see [`super::targeting::strategic_score`].
    Strategic,
}

/// AI behavior knobs for one difficulty level.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyProfile {
    pub level: Difficulty,
    /// Chance of choosing a taunt when one is available.
    pub aggression: f64,
    /// Chance of choosing an optional skill over a plain attack.
    pub skill_usage: f64,
    pub target_policy: TargetPolicy,
    /// Applied to enemy stats when a team is assembled.
    pub enemy_stats_multiplier: f64,
}

impl DifficultyProfile {
    pub const fn for_level(level: Difficulty) -> Self {
        let (aggression, skill_usage, target_policy, enemy_stats_multiplier) = match level {
            Difficulty::Easy => (0.3, 0.4, TargetPolicy::Random, 0.8),
            Difficulty::Normal => (0.6, 0.6, TargetPolicy::Weakest, 1.0),
            Difficulty::Hard => (0.8, 0.8, TargetPolicy::Strategic, 1.2),
            Difficulty::Nightmare => (1.0, 1.0, TargetPolicy::Strategic, 1.5),
        };
        Self {
            level,
            aggression,
            skill_usage,
            target_policy,
            enemy_stats_multiplier,
        }
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::for_level(Difficulty::Normal)
    }
}
