//! Archetype templates: stat ranges a combatant is rolled from.

use battle_core::{Archetype, BattleRng, Capabilities, CombatStats, Row, SkillId};
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` range, written as a `(min, max)` tuple in data files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct StatRange {
    pub min: f64,
    pub max: f64,
}

impl StatRange {
    pub const fn fixed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Draws one value uniformly; always consumes exactly one draw.
    pub fn roll(self, rng: &mut BattleRng) -> f64 {
        rng.range_f64(self.min, self.max)
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl From<(f64, f64)> for StatRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

impl From<StatRange> for (f64, f64) {
    fn from(range: StatRange) -> Self {
        (range.min, range.max)
    }
}

/// Stat ranges and defaults for one archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeTemplate {
    pub archetype: Archetype,
    pub hp: StatRange,
    pub attack: StatRange,
    pub defense: StatRange,
    pub speed: StatRange,
    pub crit_chance: StatRange,
    pub crit_damage: f64,
    pub dodge_chance: f64,
    #[serde(default)]
    pub capabilities: Option<Capabilities>,
    #[serde(default)]
    pub row: Option<Row>,
    /// Skill ids; empty means the archetype's standard loadout.
    #[serde(default)]
    pub skills: Vec<SkillId>,
}

impl ArchetypeTemplate {
    /// Rolls concrete stats. Draw order: hp, attack, defense, speed, crit.
    pub fn roll_stats(&self, rng: &mut BattleRng) -> CombatStats {
        CombatStats {
            max_hp: self.hp.roll(rng),
            attack: self.attack.roll(rng),
            defense: self.defense.roll(rng),
            speed: self.speed.roll(rng),
            crit_chance: self.crit_chance.roll(rng),
            crit_damage: self.crit_damage,
            dodge_chance: self.dodge_chance,
        }
    }
}

/// The boss spawned on boss waves: an archetype roll scaled up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossTemplate {
    pub name: String,
    pub archetype: Archetype,
    /// Applied to hp, attack and defense on top of the difficulty multiplier.
    pub stat_scale: f64,
    pub capabilities: Capabilities,
    pub skills: Vec<SkillId>,
}

/// Archetype catalog structure for RON files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeCatalog {
    pub archetypes: Vec<ArchetypeTemplate>,
    pub boss: BossTemplate,
}

impl ArchetypeCatalog {
    pub fn template(&self, archetype: Archetype) -> Option<&ArchetypeTemplate> {
        self.archetypes.iter().find(|t| t.archetype == archetype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_inside_ranges() {
        let template = ArchetypeTemplate {
            archetype: Archetype::Ranger,
            hp: (80.0, 95.0).into(),
            attack: (45.0, 55.0).into(),
            defense: (5.0, 10.0).into(),
            speed: (15.0, 20.0).into(),
            crit_chance: (0.1, 0.15).into(),
            crit_damage: 1.75,
            dodge_chance: 0.07,
            capabilities: None,
            row: None,
            skills: Vec::new(),
        };
        let mut rng = BattleRng::new(99);
        for _ in 0..50 {
            let stats = template.roll_stats(&mut rng);
            assert!(template.hp.contains(stats.max_hp));
            assert!(template.speed.contains(stats.speed));
            assert!(template.crit_chance.contains(stats.crit_chance));
            assert_eq!(stats.crit_damage, 1.75);
        }
        assert_eq!(rng.draws(), 250);
    }

    #[test]
    fn fixed_range_still_draws() {
        let mut rng = BattleRng::new(1);
        assert_eq!(StatRange::fixed(7.0).roll(&mut rng), 7.0);
        assert_eq!(rng.draws(), 1);
    }
}
