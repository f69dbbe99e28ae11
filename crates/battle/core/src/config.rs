//! Battle rules and tunable parameters.
//!
//! Every balance constant the engine reads lives here. Values are fixed for
//! the lifetime of a battle; the content crate loads overrides from
//! `battle.toml`.
use crate::combatant::ArchetypeFamily;
use crate::qte::QteKind;

/// Top-level battle configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Seconds a player-controlled combatant may deliberate before the turn
    /// ends with no action.
    pub turn_time_limit: f64,
    /// Safety cap on rounds; exceeding it ends the battle as a defeat.
    pub max_rounds: u32,
    /// Timing challenge triggered by a player's basic attack, if any.
    pub attack_qte: Option<QteKind>,
    pub morale: MoraleTuning,
    pub meters: MeterTuning,
    pub mitigation: MitigationTuning,
    pub timing: TimingTuning,
    pub combo: ComboTuning,
    pub mind_control: MindControlTuning,
    pub rewards: RewardTuning,
    /// Optional type-advantage table; pairs not listed use 1.0.
    pub advantages: Vec<TypeAdvantage>,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STATUS_EFFECTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TURN_TIME_LIMIT: f64 = 30.0;
    pub const DEFAULT_MAX_ROUNDS: u32 = 50;

    pub fn new() -> Self {
        Self {
            turn_time_limit: Self::DEFAULT_TURN_TIME_LIMIT,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            attack_qte: Some(QteKind::Press),
            morale: MoraleTuning::default(),
            meters: MeterTuning::default(),
            mitigation: MitigationTuning::default(),
            timing: TimingTuning::default(),
            combo: ComboTuning::default(),
            mind_control: MindControlTuning::default(),
            rewards: RewardTuning::default(),
            advantages: Vec::new(),
        }
    }

    /// Returns the type-advantage multiplier for an attacker/defender pair.
    pub fn advantage(&self, attacker: ArchetypeFamily, defender: ArchetypeFamily) -> f64 {
        self.advantages
            .iter()
            .find(|entry| entry.attacker == attacker && entry.defender == defender)
            .map_or(1.0, |entry| entry.multiplier)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of the type-advantage table.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeAdvantage {
    pub attacker: ArchetypeFamily,
    pub defender: ArchetypeFamily,
    pub multiplier: f64,
}

/// Morale ceiling, tier boundaries and per-hit swings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MoraleTuning {
    pub max: f64,
    /// Morale strictly below this is the low tier.
    pub low_threshold: f64,
    /// Morale at or above this is the high tier.
    pub high_threshold: f64,
    pub low_multiplier: f64,
    pub high_multiplier: f64,
    pub high_crit_bonus: f64,
    /// Morale gained by an attacker for each damaging hit.
    pub on_deal: f64,
    /// Morale lost by a defender for each damaging hit taken.
    pub on_hit: f64,
    /// Self buff bought with the actor's morale.
    pub boost: RallyTuning,
    /// Team buff bought with the actor's morale.
    pub inspire: RallyTuning,
}

impl Default for MoraleTuning {
    fn default() -> Self {
        Self {
            max: 100.0,
            low_threshold: 30.0,
            high_threshold: 70.0,
            low_multiplier: 0.9,
            high_multiplier: 1.1,
            high_crit_bonus: 0.05,
            on_deal: 2.0,
            on_hit: 3.0,
            boost: RallyTuning {
                cost: 20.0,
                bonus: 0.3,
                turns: 3,
            },
            inspire: RallyTuning {
                cost: 30.0,
                bonus: 0.2,
                turns: 3,
            },
        }
    }
}

/// Price and effect of a morale rally.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RallyTuning {
    pub cost: f64,
    /// Outgoing damage × (1 + bonus) while the buff lasts.
    pub bonus: f64,
    pub turns: u32,
}

/// Taking control of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MindControlTuning {
    /// Target turns spent fighting for the caster's side.
    pub turns: u32,
    /// Caster turns before it may take control again.
    pub cooldown: u32,
    pub caster_morale: f64,
    /// Morale the target loses when taken.
    pub target_morale: f64,
}

impl Default for MindControlTuning {
    fn default() -> Self {
        Self {
            turns: 2,
            cooldown: 5,
            caster_morale: 5.0,
            target_morale: 10.0,
        }
    }
}

/// Tuning for the three archetype-family meters.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeterTuning {
    pub threat: ThreatTuning,
    pub rage: RageTuning,
    pub focus: FocusTuning,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThreatTuning {
    pub max: f64,
    pub hit_gain: f64,
    pub ally_hit_gain: f64,
    pub taunt_threshold: f64,
    pub taunt_turns: u32,
    /// Defense bonus per 10 threat.
    pub def_bonus_ratio: f64,
}

impl Default for ThreatTuning {
    fn default() -> Self {
        Self {
            max: 100.0,
            hit_gain: 10.0,
            ally_hit_gain: 15.0,
            taunt_threshold: 80.0,
            taunt_turns: 2,
            def_bonus_ratio: 0.02,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RageTuning {
    pub max: f64,
    pub attack_gain: f64,
    pub hit_gain: f64,
    /// Damage bonus per 10 rage.
    pub dmg_bonus_ratio: f64,
    /// Crit bonus per 10 rage, applied at half rate.
    pub crit_bonus_ratio: f64,
}

impl Default for RageTuning {
    fn default() -> Self {
        Self {
            max: 100.0,
            attack_gain: 10.0,
            hit_gain: 15.0,
            dmg_bonus_ratio: 0.3,
            crit_bonus_ratio: 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FocusTuning {
    pub max: f64,
    pub continuous_hit_gain: f64,
    pub kill_gain: f64,
    pub crit_gain: f64,
    pub dodge_gain: f64,
    pub hit_loss: f64,
    /// Evasion bonus per 10 focus.
    pub evd_bonus_ratio: f64,
    /// Crit bonus per 10 focus.
    pub crit_bonus_ratio: f64,
    /// Damage bonus per 10 focus.
    pub dmg_bonus_ratio: f64,
}

impl Default for FocusTuning {
    fn default() -> Self {
        Self {
            max: 100.0,
            continuous_hit_gain: 15.0,
            kill_gain: 30.0,
            crit_gain: 10.0,
            dodge_gain: 20.0,
            hit_loss: 5.0,
            evd_bonus_ratio: 0.02,
            crit_bonus_ratio: 0.015,
            dmg_bonus_ratio: 0.1,
        }
    }
}

/// Block, counter and defend parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MitigationTuning {
    pub block_chance: f64,
    /// Fraction of magnitude removed by a successful block.
    pub block_reduction: f64,
    pub counter_chance: f64,
    /// Floor applied after defense.
    pub minimum_damage: f64,
    /// `DefenseUp` magnitude granted by the Defend action.
    pub defend_bonus: f64,
    /// Minimum damage dealt by one poison tick.
    pub poison_tick_floor: f64,
}

impl Default for MitigationTuning {
    fn default() -> Self {
        Self {
            block_chance: 0.2,
            block_reduction: 0.5,
            counter_chance: 0.3,
            minimum_damage: 1.0,
            defend_bonus: 0.5,
            poison_tick_floor: 1.0,
        }
    }
}

/// Timing-challenge rating thresholds, rewards and adaptive windows.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingTuning {
    /// Fraction of the window under which a completion is perfect.
    pub perfect_threshold: f64,
    /// Fraction of the window under which a completion is good.
    pub good_threshold: f64,
    /// Share of the definition bonus granted by a good rating.
    pub good_scale: f64,
    pub miss_multiplier: f64,
    pub morale_perfect: f64,
    pub morale_good: f64,
    pub morale_miss: f64,
    /// Completed sessions between window adjustments.
    pub adjust_every: u32,
    pub raise_above: f64,
    pub ease_below: f64,
    pub shrink_factor: f64,
    pub grow_factor: f64,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            perfect_threshold: 0.3,
            good_threshold: 0.7,
            good_scale: 0.8,
            miss_multiplier: 0.8,
            morale_perfect: 10.0,
            morale_good: 5.0,
            morale_miss: -5.0,
            adjust_every: 10,
            raise_above: 0.8,
            ease_below: 0.4,
            shrink_factor: 0.95,
            grow_factor: 1.05,
        }
    }
}

/// Per-rating multipliers for combo effects.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingScale {
    pub perfect: f64,
    pub good: f64,
    pub normal: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComboTuning {
    pub fail_morale_penalty: f64,
    pub cooldown_turns: u32,
    pub buff_scale: RatingScale,
    pub burst_scale: RatingScale,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            fail_morale_penalty: 5.0,
            cooldown_turns: 3,
            buff_scale: RatingScale {
                perfect: 1.2,
                good: 1.0,
                normal: 0.8,
            },
            burst_scale: RatingScale {
                perfect: 1.5,
                good: 1.0,
                normal: 0.8,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardTuning {
    pub exp_base: f64,
    pub gold_base: f64,
    /// Reward growth per wave.
    pub wave_scale: f64,
    /// Item granted when a boss is defeated.
    pub boss_drop: String,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            exp_base: 100.0,
            gold_base: 50.0,
            wave_scale: 0.1,
            boss_drop: "boss_token".to_string(),
        }
    }
}
