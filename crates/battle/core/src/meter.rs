//! Per-family resource meters: threat (tank), rage (warrior), focus (ranger).
//!
//! A meter is one clamped scalar. Gains come either from preset reasons or
//! from explicit amounts; the meter's current value converts into combat
//! bonuses through [`ResourceMeter::threshold_effects`].
use strum::{AsRefStr, Display};

use crate::config::MeterTuning;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MeterKind {
    Threat,
    Rage,
    Focus,
}

/// Preset gain reasons. A meter with no preset for a reason ignores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MeterReason {
    /// Holder took a damaging hit.
    Hit,
    /// Holder landed an attack.
    Attack,
    /// An ally of the holder took a damaging hit.
    AllyHit,
    /// Holder defeated a target.
    Kill,
    /// Holder landed a critical hit.
    Crit,
    /// Holder dodged.
    Dodge,
    /// Holder hit the same target as its previous hit.
    ContinuousHit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GainSource {
    Reason(MeterReason),
    /// Explicit amount that bypasses presets; may be negative.
    Amount(f64),
}

impl From<MeterReason> for GainSource {
    fn from(reason: MeterReason) -> Self {
        Self::Reason(reason)
    }
}

impl From<f64> for GainSource {
    fn from(amount: f64) -> Self {
        Self::Amount(amount)
    }
}

/// One-shot effects raised when a meter crosses a threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeterTrigger {
    Taunt { turns: u32 },
}

/// Combat bonuses derived from the meter's current value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeterBonuses {
    pub damage_multiplier: f64,
    pub defense_multiplier: f64,
    pub crit_bonus: f64,
    pub evasion_bonus: f64,
}

impl MeterBonuses {
    pub const NEUTRAL: Self = Self {
        damage_multiplier: 1.0,
        defense_multiplier: 1.0,
        crit_bonus: 0.0,
        evasion_bonus: 0.0,
    };
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    kind: MeterKind,
    value: f64,
    max: f64,
    /// Set while a taunt raised by this meter is in force.
    taunt_active: bool,
    armed: Option<MeterTrigger>,
}

impl ResourceMeter {
    pub fn new(kind: MeterKind, max: f64) -> Self {
        Self {
            kind,
            value: 0.0,
            max: max.max(0.0),
            taunt_active: false,
            armed: None,
        }
    }

    /// Meter sized from the tuning defaults for its kind.
    pub fn for_kind(kind: MeterKind, tuning: &MeterTuning) -> Self {
        let max = match kind {
            MeterKind::Threat => tuning.threat.max,
            MeterKind::Rage => tuning.rage.max,
            MeterKind::Focus => tuning.focus.max,
        };
        Self::new(kind, max)
    }

    pub fn kind(&self) -> MeterKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_taunt_active(&self) -> bool {
        self.taunt_active
    }

    /// Adds to the meter and returns the new value.
    pub fn gain(&mut self, source: impl Into<GainSource>, tuning: &MeterTuning) -> f64 {
        let amount = match source.into() {
            GainSource::Amount(amount) => amount,
            GainSource::Reason(reason) => {
                if self.loss_preset(reason, tuning).is_some() {
                    return self.decay_on_loss(reason, tuning);
                }
                match self.gain_preset(reason, tuning) {
                    Some(amount) => amount,
                    None => return self.value,
                }
            }
        };
        self.apply(amount, tuning)
    }

    /// Applies the loss preset for `reason`, if the meter has one.
    pub fn decay_on_loss(&mut self, reason: MeterReason, tuning: &MeterTuning) -> f64 {
        match self.loss_preset(reason, tuning) {
            Some(loss) => self.apply(-loss, tuning),
            None => self.value,
        }
    }

    /// Removes `cost` from the meter; callers check affordability first.
    pub fn spend(&mut self, cost: f64, tuning: &MeterTuning) -> f64 {
        self.apply(-cost.max(0.0), tuning)
    }

    /// Converts the current value into combat bonuses.
    pub fn threshold_effects(&self, tuning: &MeterTuning) -> MeterBonuses {
        let tens = self.value / 10.0;
        match self.kind {
            MeterKind::Threat => MeterBonuses {
                defense_multiplier: 1.0 + tens * tuning.threat.def_bonus_ratio,
                ..MeterBonuses::NEUTRAL
            },
            MeterKind::Rage => MeterBonuses {
                damage_multiplier: 1.0 + tens * tuning.rage.dmg_bonus_ratio,
                crit_bonus: tens / 2.0 * tuning.rage.crit_bonus_ratio,
                ..MeterBonuses::NEUTRAL
            },
            MeterKind::Focus => MeterBonuses {
                damage_multiplier: 1.0 + tens * tuning.focus.dmg_bonus_ratio,
                crit_bonus: tens * tuning.focus.crit_bonus_ratio,
                evasion_bonus: tens * tuning.focus.evd_bonus_ratio,
                ..MeterBonuses::NEUTRAL
            },
        }
    }

    /// Takes the trigger armed by the last change, if any.
    pub fn take_trigger(&mut self) -> Option<MeterTrigger> {
        self.armed.take()
    }

    /// Marks the meter's taunt as finished so it can fire again.
    pub fn release_taunt(&mut self) {
        self.taunt_active = false;
    }

    fn apply(&mut self, amount: f64, tuning: &MeterTuning) -> f64 {
        self.value = (self.value + amount).clamp(0.0, self.max);
        self.check_thresholds(tuning);
        self.value
    }

    fn check_thresholds(&mut self, tuning: &MeterTuning) {
        if self.kind == MeterKind::Threat
            && !self.taunt_active
            && self.armed.is_none()
            && self.value >= tuning.threat.taunt_threshold
        {
            self.taunt_active = true;
            self.armed = Some(MeterTrigger::Taunt {
                turns: tuning.threat.taunt_turns,
            });
        }
    }

    fn gain_preset(&self, reason: MeterReason, tuning: &MeterTuning) -> Option<f64> {
        match (self.kind, reason) {
            (MeterKind::Threat, MeterReason::Hit) => Some(tuning.threat.hit_gain),
            (MeterKind::Threat, MeterReason::AllyHit) => Some(tuning.threat.ally_hit_gain),
            (MeterKind::Rage, MeterReason::Attack) => Some(tuning.rage.attack_gain),
            (MeterKind::Rage, MeterReason::Hit) => Some(tuning.rage.hit_gain),
            (MeterKind::Focus, MeterReason::ContinuousHit) => {
                Some(tuning.focus.continuous_hit_gain)
            }
            (MeterKind::Focus, MeterReason::Kill) => Some(tuning.focus.kill_gain),
            (MeterKind::Focus, MeterReason::Crit) => Some(tuning.focus.crit_gain),
            (MeterKind::Focus, MeterReason::Dodge) => Some(tuning.focus.dodge_gain),
            _ => None,
        }
    }

    fn loss_preset(&self, reason: MeterReason, tuning: &MeterTuning) -> Option<f64> {
        match (self.kind, reason) {
            (MeterKind::Focus, MeterReason::Hit) => Some(tuning.focus.hit_loss),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> MeterTuning {
        MeterTuning::default()
    }

    #[test]
    fn presets_only_apply_to_matching_kind() {
        let tuning = tuning();
        let mut threat = ResourceMeter::new(MeterKind::Threat, 100.0);
        assert_eq!(threat.gain(MeterReason::Hit, &tuning), 10.0);
        assert_eq!(threat.gain(MeterReason::AllyHit, &tuning), 25.0);
        assert_eq!(threat.gain(MeterReason::Kill, &tuning), 25.0);

        let mut rage = ResourceMeter::new(MeterKind::Rage, 100.0);
        assert_eq!(rage.gain(MeterReason::Attack, &tuning), 10.0);
        assert_eq!(rage.gain(MeterReason::Hit, &tuning), 25.0);
    }

    #[test]
    fn focus_decays_when_hit() {
        let tuning = tuning();
        let mut focus = ResourceMeter::new(MeterKind::Focus, 100.0);
        focus.gain(MeterReason::Dodge, &tuning);
        assert_eq!(focus.gain(MeterReason::Hit, &tuning), 15.0);
        assert_eq!(focus.decay_on_loss(MeterReason::Hit, &tuning), 10.0);
    }

    #[test]
    fn values_clamp_to_bounds() {
        let tuning = tuning();
        let mut rage = ResourceMeter::new(MeterKind::Rage, 80.0);
        assert_eq!(rage.gain(500.0, &tuning), 80.0);
        assert_eq!(rage.gain(-500.0, &tuning), 0.0);

        let mut focus = ResourceMeter::new(MeterKind::Focus, 100.0);
        assert_eq!(focus.decay_on_loss(MeterReason::Hit, &tuning), 0.0);
    }

    #[test]
    fn full_rage_converts_to_four_times_damage() {
        let tuning = tuning();
        let mut rage = ResourceMeter::new(MeterKind::Rage, 100.0);
        rage.gain(100.0, &tuning);
        let bonuses = rage.threshold_effects(&tuning);
        assert!((bonuses.damage_multiplier - 4.0).abs() < 1e-9);
        assert!((bonuses.crit_bonus - 0.25).abs() < 1e-9);
    }

    #[test]
    fn threat_taunt_fires_once_until_released() {
        let tuning = tuning();
        let mut threat = ResourceMeter::new(MeterKind::Threat, 100.0);
        threat.gain(79.0, &tuning);
        assert_eq!(threat.take_trigger(), None);

        threat.gain(MeterReason::Hit, &tuning);
        assert_eq!(threat.take_trigger(), Some(MeterTrigger::Taunt { turns: 2 }));

        threat.gain(MeterReason::Hit, &tuning);
        assert_eq!(threat.take_trigger(), None);

        threat.release_taunt();
        threat.gain(MeterReason::Hit, &tuning);
        assert!(threat.take_trigger().is_some());
    }

    #[test]
    fn focus_grants_evasion_and_crit() {
        let tuning = tuning();
        let mut focus = ResourceMeter::new(MeterKind::Focus, 100.0);
        focus.gain(50.0, &tuning);
        let bonuses = focus.threshold_effects(&tuning);
        assert!((bonuses.evasion_bonus - 0.1).abs() < 1e-9);
        assert!((bonuses.crit_bonus - 0.075).abs() < 1e-9);
        assert!((bonuses.damage_multiplier - 1.5).abs() < 1e-9);
    }
}
