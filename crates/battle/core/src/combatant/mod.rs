//! Combatants and the roster that holds them.
//!
//! There is one [`Combatant`] type for every side and archetype. Archetype
//! descriptors and [`Capabilities`] flags carry the differences; hp and
//! morale are private so their bounds hold after every mutation.
mod archetype;
mod morale;
mod roster;
mod status;

use std::collections::BTreeMap;

pub use archetype::{
    AiHeuristic, Archetype, ArchetypeFamily, ArchetypePair, ArchetypeTier, Capabilities, Row,
};
pub use morale::MoraleTier;
pub use roster::Roster;
pub use status::{StatusEffect, StatusEffects, StatusKind};

use crate::config::BattleConfig;
use crate::meter::{MeterBonuses, ResourceMeter};
use crate::skill::{SkillDef, SkillId};
use crate::weather::{FamilyWeather, WeatherSnapshot};

/// Dense index of a combatant in its battle's roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CombatantId(pub u32);

impl CombatantId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Who decides a combatant's actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Control {
    Player,
    Ai,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub max_hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub dodge_chance: f64,
}

impl CombatStats {
    /// Multiplies the offensive and defensive totals; chances are unchanged.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            max_hp: self.max_hp * factor,
            attack: self.attack * factor,
            defense: self.defense * factor,
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    pub archetype: Archetype,
    pub capabilities: Capabilities,
    pub heuristic: AiHeuristic,
    pub row: Row,
    pub control: Control,
    pub stats: CombatStats,
    hp: f64,
    morale: f64,
    pub meter: ResourceMeter,
    pub status: StatusEffects,
    pub skills: Vec<SkillId>,
    cooldowns: BTreeMap<SkillId, u32>,
    pub combo_cooldown: u32,
    /// Turns before this combatant may take control of an enemy again.
    pub control_cooldown: u32,
    /// Target of this combatant's previous damaging hit.
    pub last_target: Option<CombatantId>,
}

impl Combatant {
    /// Creates a combatant at full hp and morale with archetype defaults.
    ///
    /// The id is reassigned when the combatant joins a [`Roster`].
    pub fn new(name: impl Into<String>, side: Side, archetype: Archetype, stats: CombatStats) -> Self {
        let tuning = BattleConfig::default();
        Self {
            id: CombatantId::default(),
            name: name.into(),
            side,
            archetype,
            capabilities: archetype.default_capabilities(),
            heuristic: archetype.default_heuristic(),
            row: archetype.default_row(),
            control: match side {
                Side::Player => Control::Player,
                Side::Enemy => Control::Ai,
            },
            stats,
            hp: stats.max_hp.max(0.0),
            morale: tuning.morale.max,
            meter: ResourceMeter::for_kind(archetype.family().meter_kind(), &tuning.meters),
            status: StatusEffects::empty(),
            skills: Vec::new(),
            cooldowns: BTreeMap::new(),
            combo_cooldown: 0,
            control_cooldown: 0,
            last_target: None,
        }
    }

    pub fn with_skills(mut self, skills: Vec<SkillId>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_control(mut self, control: Control) -> Self {
        // Enemy-side combatants are always AI.
        if self.side == Side::Player {
            self.control = control;
        }
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.row = row;
        self
    }

    pub fn with_meter(mut self, meter: ResourceMeter) -> Self {
        self.meter = meter;
        self
    }

    pub fn with_morale(mut self, morale: f64, max: f64) -> Self {
        self.morale = morale.clamp(0.0, max);
        self
    }

    pub fn family(&self) -> ArchetypeFamily {
        self.archetype.family()
    }

    pub fn is_boss(&self) -> bool {
        self.capabilities.contains(Capabilities::BOSS)
    }

    // ===== hp =====

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.stats.max_hp <= 0.0 {
            0.0
        } else {
            self.hp / self.stats.max_hp
        }
    }

    /// Removes hp and returns the amount actually lost.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0.0)).clamp(0.0, self.stats.max_hp);
        before - self.hp
    }

    /// Restores hp and returns the amount actually gained.
    pub fn heal(&mut self, amount: f64) -> f64 {
        if !self.is_alive() {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount.max(0.0)).clamp(0.0, self.stats.max_hp);
        self.hp - before
    }

    // ===== morale =====

    pub fn morale(&self) -> f64 {
        self.morale
    }

    pub fn adjust_morale(&mut self, delta: f64, max: f64) -> f64 {
        self.morale = (self.morale + delta).clamp(0.0, max);
        self.morale
    }

    pub fn morale_tier(&self, config: &BattleConfig) -> MoraleTier {
        MoraleTier::of(self.morale, &config.morale)
    }

    // ===== cooldowns =====

    pub fn cooldown(&self, skill: &SkillId) -> u32 {
        self.cooldowns.get(skill).copied().unwrap_or(0)
    }

    pub fn set_cooldown(&mut self, skill: SkillId, turns: u32) {
        if turns == 0 {
            self.cooldowns.remove(&skill);
        } else {
            self.cooldowns.insert(skill, turns);
        }
    }

    /// Counts one turn off every skill, combo and control cooldown.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
        self.combo_cooldown = self.combo_cooldown.saturating_sub(1);
        self.control_cooldown = self.control_cooldown.saturating_sub(1);
    }

    pub fn knows(&self, skill: &SkillId) -> bool {
        self.skills.contains(skill)
    }

    /// True when the skill is learned, off cooldown and its costs are met.
    pub fn can_afford(&self, skill: &SkillDef) -> bool {
        self.knows(&skill.id)
            && self.cooldown(&skill.id) == 0
            && self.meter.value() >= skill.meter_cost
            && self.morale >= skill.morale_cost
    }

    /// Stunned combatants cannot act.
    pub fn is_incapacitated(&self) -> bool {
        self.status.has(StatusKind::Stunned)
    }

    /// Whoever holds this combatant under mind control.
    pub fn controlled_by(&self) -> Option<CombatantId> {
        self.status
            .get(StatusKind::Controlled)
            .and_then(|effect| effect.source)
    }

    /// Side this combatant fights for; a controlled combatant turns on its own.
    pub fn allegiance(&self) -> Side {
        if self.status.has(StatusKind::Controlled) {
            self.side.opposite()
        } else {
            self.side
        }
    }

    /// True when `other` is a legal target for this combatant's offense.
    pub fn is_hostile_to(&self, other: &Combatant) -> bool {
        other.id != self.id && other.side != self.allegiance()
    }

    /// True when `other` is a legal target for this combatant's support.
    pub fn is_friendly_to(&self, other: &Combatant) -> bool {
        other.side == self.allegiance()
    }

    /// Source of an active taunt on this combatant.
    pub fn taunted_by(&self) -> Option<CombatantId> {
        self.status
            .get(StatusKind::Taunted)
            .and_then(|effect| effect.source)
    }

    // ===== effective stats =====

    fn weather<'w>(&self, weather: &'w WeatherSnapshot) -> &'w FamilyWeather {
        weather.for_family(self.family())
    }

    pub fn meter_bonuses(&self, config: &BattleConfig) -> MeterBonuses {
        self.meter.threshold_effects(&config.meters)
    }

    pub fn effective_speed(&self, weather: &WeatherSnapshot) -> f64 {
        let speed = self.stats.speed
            + weather.speed_mod
            + self.weather(weather).speed
            + self.status.magnitude(StatusKind::Hasted)
            - self.status.magnitude(StatusKind::Slowed);
        speed.max(0.0)
    }

    pub fn effective_attack(&self) -> f64 {
        self.stats.attack.max(0.0)
    }

    pub fn effective_defense(&self, weather: &WeatherSnapshot, config: &BattleConfig) -> f64 {
        let flat = (self.stats.defense + weather.defense_mod + self.weather(weather).defense).max(0.0);
        flat * (1.0 + self.status.magnitude(StatusKind::DefenseUp))
            * self.meter_bonuses(config).defense_multiplier
    }

    /// Dodge chance before the attacker's accuracy is applied.
    pub fn evasion(&self, weather: &WeatherSnapshot, config: &BattleConfig) -> f64 {
        self.stats.dodge_chance
            + self.meter_bonuses(config).evasion_bonus
            + self.weather(weather).evasion
            + weather.evasion_mod
            + self.status.magnitude(StatusKind::EvasionUp)
    }

    /// Accuracy adjustment this combatant imposes on its targets' dodge.
    pub fn accuracy(&self, weather: &WeatherSnapshot) -> f64 {
        weather.hit_rate_mod + self.weather(weather).hit_rate
    }

    pub fn crit_chance(&self, weather: &WeatherSnapshot, config: &BattleConfig) -> f64 {
        let morale_bonus = match self.morale_tier(config) {
            MoraleTier::High => config.morale.high_crit_bonus,
            MoraleTier::Normal | MoraleTier::Low => 0.0,
        };
        let chance = self.stats.crit_chance
            + self.meter_bonuses(config).crit_bonus
            + self.weather(weather).crit
            + self.status.magnitude(StatusKind::CritUp)
            + morale_bonus;
        chance.clamp(0.0, 1.0)
    }

    /// Outgoing damage multiplier from buffs and debuffs.
    pub fn status_damage_multiplier(&self) -> f64 {
        let combo = self
            .status
            .get(StatusKind::ComboBuff)
            .map_or(1.0, |effect| effect.magnitude);
        (1.0 + self.status.magnitude(StatusKind::AttackUp))
            * (1.0 + self.status.magnitude(StatusKind::Rallied))
            * (1.0 + self.status.magnitude(StatusKind::Inspired))
            * combo
            * (1.0 - self.status.magnitude(StatusKind::Weakened)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::SkillBook;

    fn create_test_combatant() -> Combatant {
        Combatant::new(
            "Test",
            Side::Player,
            Archetype::Warrior,
            CombatStats {
                max_hp: 100.0,
                attack: 50.0,
                defense: 10.0,
                speed: 12.0,
                crit_chance: 0.1,
                crit_damage: 1.5,
                dodge_chance: 0.05,
            },
        )
    }

    #[test]
    fn hp_stays_within_bounds() {
        let mut combatant = create_test_combatant();
        assert_eq!(combatant.take_damage(30.0), 30.0);
        assert_eq!(combatant.heal(500.0), 30.0);
        assert_eq!(combatant.take_damage(500.0), 100.0);
        assert_eq!(combatant.hp(), 0.0);
        assert!(!combatant.is_alive());
        assert_eq!(combatant.heal(10.0), 0.0);
    }

    #[test]
    fn morale_clamps_to_ceiling() {
        let mut combatant = create_test_combatant();
        assert_eq!(combatant.adjust_morale(20.0, 100.0), 100.0);
        assert_eq!(combatant.adjust_morale(-250.0, 100.0), 0.0);
    }

    #[test]
    fn cooldowns_count_down_to_usable() {
        let book = SkillBook::standard();
        let mut combatant =
            create_test_combatant().with_skills(SkillBook::standard_loadout(Archetype::Warrior));
        let slash = book.get(&SkillId::from("charge_slash")).unwrap();
        assert!(combatant.can_afford(slash));

        combatant.set_cooldown(slash.id.clone(), 2);
        assert!(!combatant.can_afford(slash));
        combatant.tick_cooldowns();
        assert_eq!(combatant.cooldown(&slash.id), 1);
        combatant.tick_cooldowns();
        assert!(combatant.can_afford(slash));
    }

    #[test]
    fn meter_cost_gates_skills() {
        let book = SkillBook::standard();
        let combatant =
            create_test_combatant().with_skills(SkillBook::standard_loadout(Archetype::Warrior));
        let frenzy = book.get(&SkillId::from("frenzy")).unwrap();
        assert!(!combatant.can_afford(frenzy));
    }

    #[test]
    fn buffs_shape_effective_stats() {
        let weather = WeatherSnapshot::clear();
        let config = BattleConfig::default();
        let mut combatant = create_test_combatant();
        combatant.status.add(StatusEffect {
            kind: StatusKind::DefenseUp,
            remaining: 1,
            magnitude: 0.5,
            source: None,
        });
        combatant.status.add(StatusEffect {
            kind: StatusKind::Slowed,
            remaining: 1,
            magnitude: 20.0,
            source: None,
        });
        assert_eq!(combatant.effective_defense(&weather, &config), 15.0);
        assert_eq!(combatant.effective_speed(&weather), 0.0);
    }

    #[test]
    fn enemy_side_stays_ai_controlled() {
        let enemy = Combatant::new(
            "Orc",
            Side::Enemy,
            Archetype::Warrior,
            create_test_combatant().stats,
        )
        .with_control(Control::Player);
        assert_eq!(enemy.control, Control::Ai);
    }
}
