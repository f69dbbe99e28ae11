//! Pure damage arithmetic.
//!
//! # Formula
//!
//! ```text
//! magnitude = attack × power × advantage
//!           × timing × weather × morale × meter × status
//! if critical: magnitude ×= crit_damage
//! if blocked:  magnitude ×= 1 - block_reduction
//! final = max(magnitude - defense, minimum)
//! ```

/// Multipliers applied to a strike before crit, block and defense.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrikeModifiers {
    pub advantage: f64,
    pub timing: f64,
    pub weather: f64,
    pub morale: f64,
    pub meter: f64,
    pub status: f64,
}

impl Default for StrikeModifiers {
    fn default() -> Self {
        Self {
            advantage: 1.0,
            timing: 1.0,
            weather: 1.0,
            morale: 1.0,
            meter: 1.0,
            status: 1.0,
        }
    }
}

impl StrikeModifiers {
    pub fn product(&self) -> f64 {
        self.advantage * self.timing * self.weather * self.morale * self.meter * self.status
    }
}

/// Magnitude before crit, block and defense.
pub fn base_magnitude(attack: f64, power: f64, modifiers: &StrikeModifiers) -> f64 {
    (attack * power * modifiers.product()).max(0.0)
}

/// Chance the target avoids the strike, after attacker accuracy.
pub fn dodge_chance(evasion: f64, accuracy: f64) -> f64 {
    (evasion - accuracy).clamp(0.0, 1.0)
}

pub fn apply_crit(magnitude: f64, crit_damage: f64) -> f64 {
    magnitude * crit_damage.max(1.0)
}

pub fn apply_block(magnitude: f64, reduction: f64) -> f64 {
    magnitude * (1.0 - reduction.clamp(0.0, 1.0))
}

/// Subtracts defense and applies the damage floor.
pub fn mitigate(magnitude: f64, defense: f64, minimum: f64) -> f64 {
    (magnitude - defense.max(0.0)).max(minimum)
}
