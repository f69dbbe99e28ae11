//! Skill definitions and the skill book.
//!
//! Skill effects are a closed set of variants; the resolution pipeline
//! matches on them directly.
use std::collections::BTreeMap;

use crate::combatant::{Archetype, StatusKind};
use crate::qte::QteKind;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SkillId(pub String);

impl SkillId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SkillId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl core::fmt::Display for SkillId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status attached by a skill.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusApplication {
    pub kind: StatusKind,
    pub magnitude: f64,
    pub turns: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillEffect {
    /// Damage at `power` × attack, optionally attaching a status.
    Damage {
        power: f64,
        status: Option<StatusApplication>,
    },
    /// Restores `power` × attack hp.
    Heal { power: f64 },
    Buff { status: StatusApplication },
    /// Attaches a harmful status; deals damage too when `power` is nonzero.
    Debuff {
        power: f64,
        status: StatusApplication,
    },
    /// Forces targets to attack the user.
    Taunt { turns: u32 },
    /// Damage that heals the user by `ratio` of the damage dealt.
    Drain { power: f64, ratio: f64 },
}

impl SkillEffect {
    /// Offensive effects run the dodge step.
    pub fn is_offensive(&self) -> bool {
        matches!(
            self,
            Self::Damage { .. } | Self::Debuff { .. } | Self::Taunt { .. } | Self::Drain { .. }
        )
    }

    /// Damage coefficient, zero for effects that deal none.
    pub fn power(&self) -> f64 {
        match self {
            Self::Damage { power, .. } | Self::Drain { power, .. } => *power,
            Self::Debuff { power, .. } => *power,
            Self::Heal { .. } | Self::Buff { .. } | Self::Taunt { .. } => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetMode {
    SingleEnemy,
    AllEnemies,
    SelfOnly,
    SingleAlly,
    AllAllies,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDef {
    pub id: SkillId,
    pub name: String,
    pub effect: SkillEffect,
    pub target: TargetMode,
    /// Turns before the skill is usable again.
    pub cooldown: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub meter_cost: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub morale_cost: f64,
    /// Explicit meter gain for the user after resolution.
    #[cfg_attr(feature = "serde", serde(default))]
    pub meter_gain: f64,
    /// Timing challenge a player must pass to boost the skill.
    #[cfg_attr(feature = "serde", serde(default))]
    pub qte: Option<QteKind>,
}

impl SkillDef {
    pub fn new(id: &str, name: &str, effect: SkillEffect, target: TargetMode) -> Self {
        Self {
            id: SkillId::from(id),
            name: name.to_string(),
            effect,
            target,
            cooldown: 0,
            meter_cost: 0.0,
            morale_cost: 0.0,
            meter_gain: 0.0,
            qte: None,
        }
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_costs(mut self, meter_cost: f64, morale_cost: f64) -> Self {
        self.meter_cost = meter_cost;
        self.morale_cost = morale_cost;
        self
    }

    pub fn with_meter_gain(mut self, gain: f64) -> Self {
        self.meter_gain = gain;
        self
    }

    pub fn with_qte(mut self, kind: QteKind) -> Self {
        self.qte = Some(kind);
        self
    }
}

/// Lookup table of every skill in a battle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillBook {
    skills: BTreeMap<SkillId, SkillDef>,
}

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, skill: SkillDef) -> Option<SkillDef> {
        self.skills.insert(skill.id.clone(), skill)
    }

    pub fn get(&self, id: &SkillId) -> Option<&SkillDef> {
        self.skills.get(id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDef> {
        self.skills.values()
    }

    /// The built-in skill set used when no content overrides it.
    pub fn standard() -> Self {
        let status = |kind, magnitude, turns| StatusApplication {
            kind,
            magnitude,
            turns,
        };

        [
            // Tank family
            SkillDef::new(
                "defensive_stance",
                "Defensive Stance",
                SkillEffect::Buff {
                    status: status(StatusKind::DefenseUp, 0.3, 3),
                },
                TargetMode::SelfOnly,
            )
            .with_cooldown(6)
            .with_costs(0.0, 20.0),
            SkillDef::new(
                "brave_strike",
                "Brave Strike",
                SkillEffect::Damage {
                    power: 0.8,
                    status: None,
                },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(4)
            .with_costs(0.0, 30.0)
            .with_meter_gain(20.0)
            .with_qte(QteKind::Press),
            SkillDef::new(
                "provoke",
                "Provoke",
                SkillEffect::Taunt { turns: 2 },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(4),
            SkillDef::new(
                "shield_wall",
                "Shield Wall",
                SkillEffect::Buff {
                    status: status(StatusKind::DefenseUp, 0.5, 2),
                },
                TargetMode::SingleAlly,
            )
            .with_cooldown(5),
            SkillDef::new(
                "mend",
                "Mend",
                SkillEffect::Heal { power: 0.8 },
                TargetMode::SingleAlly,
            )
            .with_cooldown(3),
            // Warrior family
            SkillDef::new(
                "charge_slash",
                "Charge Slash",
                SkillEffect::Damage {
                    power: 1.3,
                    status: None,
                },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(5)
            .with_costs(0.0, 25.0)
            .with_meter_gain(20.0)
            .with_qte(QteKind::Sequence),
            SkillDef::new(
                "frenzy",
                "Frenzy",
                SkillEffect::Buff {
                    status: status(StatusKind::AttackUp, 0.25, 5),
                },
                TargetMode::SelfOnly,
            )
            .with_cooldown(8)
            .with_costs(50.0, 35.0),
            SkillDef::new(
                "whirlwind",
                "Whirlwind",
                SkillEffect::Damage {
                    power: 0.7,
                    status: None,
                },
                TargetMode::AllEnemies,
            )
            .with_cooldown(4)
            .with_costs(30.0, 0.0)
            .with_qte(QteKind::Hold),
            // Ranger family
            SkillDef::new(
                "piercing_shot",
                "Piercing Shot",
                SkillEffect::Damage {
                    power: 1.2,
                    status: None,
                },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(3)
            .with_qte(QteKind::Motion),
            SkillDef::new(
                "venom_arrow",
                "Venom Arrow",
                SkillEffect::Damage {
                    power: 0.6,
                    status: Some(status(StatusKind::Poisoned, 5.0, 3)),
                },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(4)
            .with_qte(QteKind::MultiPress),
            SkillDef::new(
                "evasive_roll",
                "Evasive Roll",
                SkillEffect::Buff {
                    status: status(StatusKind::EvasionUp, 0.3, 2),
                },
                TargetMode::SelfOnly,
            )
            .with_cooldown(4),
            SkillDef::new(
                "hex",
                "Hex",
                SkillEffect::Debuff {
                    power: 0.5,
                    status: status(StatusKind::Weakened, 0.2, 2),
                },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(3),
            SkillDef::new(
                "soul_siphon",
                "Soul Siphon",
                SkillEffect::Drain {
                    power: 1.0,
                    ratio: 0.5,
                },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(4)
            .with_costs(20.0, 0.0),
            // Boss
            SkillDef::new(
                "crushing_blow",
                "Crushing Blow",
                SkillEffect::Damage {
                    power: 1.6,
                    status: None,
                },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(3),
            SkillDef::new(
                "tremor",
                "Tremor",
                SkillEffect::Damage {
                    power: 0.7,
                    status: None,
                },
                TargetMode::AllEnemies,
            )
            .with_cooldown(4),
            SkillDef::new(
                "war_cry",
                "War Cry",
                SkillEffect::Buff {
                    status: status(StatusKind::AttackUp, 0.3, 3),
                },
                TargetMode::SelfOnly,
            )
            .with_cooldown(5),
            SkillDef::new(
                "stun_slam",
                "Stun Slam",
                SkillEffect::Debuff {
                    power: 0.9,
                    status: status(StatusKind::Stunned, 0.0, 1),
                },
                TargetMode::SingleEnemy,
            )
            .with_cooldown(5),
        ]
        .into_iter()
        .collect()
    }

    /// Default skill list for an archetype in the standard book.
    pub fn standard_loadout(archetype: Archetype) -> Vec<SkillId> {
        let ids: &[&str] = match archetype {
            Archetype::Tanker => &["defensive_stance", "brave_strike", "provoke"],
            Archetype::Knight => &["defensive_stance", "provoke", "shield_wall", "mend"],
            Archetype::Warrior => &["charge_slash", "frenzy"],
            Archetype::Samurai => &["charge_slash", "frenzy", "whirlwind"],
            Archetype::Ranger => &["piercing_shot", "evasive_roll"],
            Archetype::LeafRanger => &["piercing_shot", "venom_arrow", "evasive_roll"],
            Archetype::Witch => &["hex", "soul_siphon", "venom_arrow"],
        };
        ids.iter().copied().map(SkillId::from).collect()
    }

    /// Skill list for bosses in the standard book.
    pub fn boss_loadout() -> Vec<SkillId> {
        ["crushing_blow", "tremor", "war_cry", "stun_slam"]
            .into_iter()
            .map(SkillId::from)
            .collect()
    }
}

impl FromIterator<SkillDef> for SkillBook {
    fn from_iter<I: IntoIterator<Item = SkillDef>>(iter: I) -> Self {
        let mut book = Self::new();
        for skill in iter {
            book.insert(skill);
        }
        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn standard_loadouts_resolve_in_standard_book() {
        let book = SkillBook::standard();
        for archetype in Archetype::iter() {
            for id in SkillBook::standard_loadout(archetype) {
                assert!(book.get(&id).is_some(), "{archetype} references {id}");
            }
        }
        for id in SkillBook::boss_loadout() {
            assert!(book.get(&id).is_some());
        }
    }

    #[test]
    fn supportive_effects_skip_dodge() {
        assert!(!SkillEffect::Heal { power: 1.0 }.is_offensive());
        assert!(SkillEffect::Taunt { turns: 2 }.is_offensive());
        assert_eq!(
            SkillEffect::Drain {
                power: 1.1,
                ratio: 0.5
            }
            .power(),
            1.1
        );
    }
}
