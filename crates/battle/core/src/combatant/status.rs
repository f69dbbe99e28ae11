//! Status effects on combatants.
//!
//! Durations count the holder's turns. An effect is in force while it is in
//! the collection; [`StatusEffects::decrement`] runs at the end of the
//! holder's turn and [`StatusEffects::expire`] removes spent effects at the
//! start of the next one.
use arrayvec::ArrayVec;
use strum::{AsRefStr, Display, EnumString};

use crate::config::BattleConfig;

use super::CombatantId;

/// Bounded, ordered collection of active effects.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Holder turns left; zero means the effect is spent.
    pub remaining: u32,
    pub magnitude: f64,
    pub source: Option<CombatantId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusKind {
    // ========================================================================
    // Buffs
    // ========================================================================
    /// Outgoing damage × (1 + magnitude).
    AttackUp,
    /// Defense × (1 + magnitude).
    DefenseUp,
    /// Crit chance + magnitude.
    CritUp,
    /// Dodge chance + magnitude.
    EvasionUp,
    /// Speed + magnitude.
    Hasted,
    /// Outgoing damage × magnitude; granted by team combos.
    ComboBuff,
    /// Outgoing damage × (1 + magnitude); bought with the holder's morale.
    Rallied,
    /// Outgoing damage × (1 + magnitude); bought with an ally's morale.
    Inspired,

    // ========================================================================
    // Debuffs
    // ========================================================================
    /// Must direct offensive single-target actions at the source.
    Taunted,
    /// Cannot act.
    Stunned,
    /// Loses magnitude hp at the start of each turn. Stacks.
    Poisoned,
    /// Outgoing damage × (1 - magnitude).
    Weakened,
    /// Speed - magnitude.
    Slowed,
    /// Fights for the source's side. Never stacks.
    Controlled,
}

impl StatusKind {
    /// Stacking kinds add magnitudes; every other kind refreshes.
    pub const fn stacks(self) -> bool {
        matches!(self, Self::Poisoned)
    }

    pub const fn is_buff(self) -> bool {
        matches!(
            self,
            Self::AttackUp
                | Self::DefenseUp
                | Self::CritUp
                | Self::EvasionUp
                | Self::Hasted
                | Self::ComboBuff
                | Self::Rallied
                | Self::Inspired
        )
    }
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Magnitude of an effect, or zero when absent.
    pub fn magnitude(&self, kind: StatusKind) -> f64 {
        self.get(kind).map_or(0.0, |e| e.magnitude)
    }

    /// Adds an effect, applying the kind's stacking policy.
    ///
    /// Returns false when the collection is full and the kind is not already
    /// present.
    pub fn add(&mut self, effect: StatusEffect) -> bool {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            if effect.kind.stacks() {
                existing.magnitude += effect.magnitude;
            } else {
                existing.magnitude = effect.magnitude;
                existing.source = effect.source;
            }
            existing.remaining = existing.remaining.max(effect.remaining);
            return true;
        }

        self.effects.try_push(effect).is_ok()
    }

    pub fn remove(&mut self, kind: StatusKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    /// Removes spent effects and returns them in collection order.
    pub fn expire(&mut self) -> Vec<StatusEffect> {
        let spent: Vec<StatusEffect> = self
            .effects
            .iter()
            .filter(|e| e.remaining == 0)
            .copied()
            .collect();
        self.effects.retain(|e| e.remaining > 0);
        spent
    }

    /// Counts one holder turn off every effect.
    pub fn decrement(&mut self) {
        for effect in &mut self.effects {
            effect.remaining = effect.remaining.saturating_sub(1);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn has_buffs(&self) -> bool {
        self.effects.iter().any(|e| e.kind.is_buff())
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
