//! Archetypes, families and capability flags.
//!
//! An archetype is a descriptor, not a subtype: it decides the combatant's
//! family (and with it the resource meter), default capabilities, formation
//! row and AI heuristic. Boss behavior comes from the `BOSS` capability.
use bitflags::bitflags;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::meter::MeterKind;

/// The three archetype families. Each owns one resource meter kind.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ArchetypeFamily {
    Tank,
    Warrior,
    Ranger,
}

impl ArchetypeFamily {
    pub const fn meter_kind(self) -> MeterKind {
        match self {
            Self::Tank => MeterKind::Threat,
            Self::Warrior => MeterKind::Rage,
            Self::Ranger => MeterKind::Focus,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ArchetypeTier {
    Base,
    Advanced,
    Hidden,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Archetype {
    Tanker,
    Warrior,
    Ranger,
    Knight,
    Samurai,
    LeafRanger,
    Witch,
}

impl Archetype {
    pub const fn family(self) -> ArchetypeFamily {
        match self {
            Self::Tanker | Self::Knight => ArchetypeFamily::Tank,
            Self::Warrior | Self::Samurai => ArchetypeFamily::Warrior,
            Self::Ranger | Self::LeafRanger | Self::Witch => ArchetypeFamily::Ranger,
        }
    }

    pub const fn tier(self) -> ArchetypeTier {
        match self {
            Self::Tanker | Self::Warrior | Self::Ranger => ArchetypeTier::Base,
            Self::Knight | Self::Samurai | Self::LeafRanger => ArchetypeTier::Advanced,
            Self::Witch => ArchetypeTier::Hidden,
        }
    }

    pub fn default_capabilities(self) -> Capabilities {
        match self.family() {
            ArchetypeFamily::Tank => Capabilities::TAUNT | Capabilities::BLOCK,
            ArchetypeFamily::Warrior => Capabilities::empty(),
            ArchetypeFamily::Ranger => Capabilities::RANGED,
        }
    }

    pub fn default_row(self) -> Row {
        if self.default_capabilities().contains(Capabilities::RANGED) {
            Row::Back
        } else {
            Row::Front
        }
    }

    pub const fn default_heuristic(self) -> AiHeuristic {
        match self.family() {
            ArchetypeFamily::Tank => AiHeuristic::Guardian,
            ArchetypeFamily::Warrior => AiHeuristic::Berserker,
            ArchetypeFamily::Ranger => AiHeuristic::Marksman,
        }
    }
}

bitflags! {
    /// Optional behaviors layered on top of an archetype.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Capabilities: u8 {
        const TAUNT = 1 << 0;
        const BLOCK = 1 << 1;
        const RANGED = 1 << 2;
        const BOSS = 1 << 3;
    }
}

/// Formation row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Row {
    #[default]
    Front,
    Back,
}

/// Per-archetype AI decision style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AiHeuristic {
    /// Protects allies, taunts, raises defenses.
    Guardian,
    /// Pushes damage, buffs itself when healthy.
    Berserker,
    /// Prefers the back line and evasive play.
    Marksman,
}

/// Unordered pair of archetype families, the key of the combo table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        from = "(ArchetypeFamily, ArchetypeFamily)",
        into = "(ArchetypeFamily, ArchetypeFamily)"
    )
)]
pub struct ArchetypePair {
    first: ArchetypeFamily,
    second: ArchetypeFamily,
}

impl ArchetypePair {
    /// Builds a pair; argument order does not matter.
    pub fn new(a: ArchetypeFamily, b: ArchetypeFamily) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn families(&self) -> [ArchetypeFamily; 2] {
        [self.first, self.second]
    }
}

impl From<(ArchetypeFamily, ArchetypeFamily)> for ArchetypePair {
    fn from((a, b): (ArchetypeFamily, ArchetypeFamily)) -> Self {
        Self::new(a, b)
    }
}

impl From<ArchetypePair> for (ArchetypeFamily, ArchetypeFamily) {
    fn from(pair: ArchetypePair) -> Self {
        (pair.first, pair.second)
    }
}

impl core::fmt::Display for ArchetypePair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advanced_and_hidden_archetypes_map_to_families() {
        assert_eq!(Archetype::Knight.family(), ArchetypeFamily::Tank);
        assert_eq!(Archetype::Samurai.family(), ArchetypeFamily::Warrior);
        assert_eq!(Archetype::LeafRanger.family(), ArchetypeFamily::Ranger);
        assert_eq!(Archetype::Witch.tier(), ArchetypeTier::Hidden);
        assert_eq!(Archetype::Witch.family().meter_kind(), MeterKind::Focus);
    }

    #[test]
    fn pair_is_order_independent() {
        let a = ArchetypePair::new(ArchetypeFamily::Warrior, ArchetypeFamily::Tank);
        let b = ArchetypePair::new(ArchetypeFamily::Tank, ArchetypeFamily::Warrior);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "tank+warrior");
    }

    #[test]
    fn archetype_names_parse_case_insensitively() {
        assert_eq!("LEAF_RANGER".parse::<Archetype>(), Ok(Archetype::LeafRanger));
        assert_eq!(Archetype::Tanker.as_ref(), "tanker");
    }

    #[test]
    fn rangers_default_to_back_row() {
        assert_eq!(Archetype::Ranger.default_row(), Row::Back);
        assert_eq!(Archetype::Tanker.default_row(), Row::Front);
        assert!(Archetype::Knight
            .default_capabilities()
            .contains(Capabilities::BLOCK));
    }
}
