//! Free actions taken on the actor's own turn: morale rallies and mind
//! control.
//!
//! Neither uses up the turn. A rally spends the actor's morale on a damage
//! buff; mind control turns one enemy against its own side for a few of its
//! turns. At most one combatant is controlled battle-wide.
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::combatant::{CombatantId, Roster, StatusEffect, StatusKind};
use crate::config::{BattleConfig, RallyTuning};
use crate::error::{BattleError, ErrorSeverity};
use crate::event::{BattleLog, EffectCue, EventKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Rally {
    /// Buffs the actor alone.
    Boost,
    /// Buffs every ally, the actor included.
    Inspire,
}

impl Rally {
    pub fn tuning(self, config: &BattleConfig) -> RallyTuning {
        match self {
            Self::Boost => config.morale.boost,
            Self::Inspire => config.morale.inspire,
        }
    }

    pub const fn status(self) -> StatusKind {
        match self {
            Self::Boost => StatusKind::Rallied,
            Self::Inspire => StatusKind::Inspired,
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TacticError {
    #[error("combatant {0} cannot act")]
    ActorUnavailable(CombatantId),

    #[error("combatant {actor} needs {needed} morale, {available} available")]
    InsufficientMorale {
        actor: CombatantId,
        needed: f64,
        available: f64,
    },

    #[error("combatant {0} cannot be taken under control")]
    InvalidTarget(CombatantId),

    #[error("combatant {0} is already under control")]
    ControlActive(CombatantId),

    #[error("combatant {actor} can take control again in {remaining} turns")]
    ControlCooldown { actor: CombatantId, remaining: u32 },
}

impl BattleError for TacticError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InsufficientMorale { .. }
            | Self::ControlActive(_)
            | Self::ControlCooldown { .. } => ErrorSeverity::Recoverable,
            Self::ActorUnavailable(_) | Self::InvalidTarget(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorUnavailable(_) => "TACTIC_ACTOR_UNAVAILABLE",
            Self::InsufficientMorale { .. } => "TACTIC_INSUFFICIENT_MORALE",
            Self::InvalidTarget(_) => "TACTIC_INVALID_TARGET",
            Self::ControlActive(_) => "TACTIC_CONTROL_ACTIVE",
            Self::ControlCooldown { .. } => "TACTIC_CONTROL_COOLDOWN",
        }
    }
}

/// Spends `actor`'s morale on `rally`. Returns the combatants that gained
/// the buff; members with a full status list are skipped.
pub fn rally(
    rally: Rally,
    actor: CombatantId,
    roster: &mut Roster,
    config: &BattleConfig,
    log: &mut BattleLog,
) -> Result<Vec<CombatantId>, TacticError> {
    let tuning = rally.tuning(config);
    let Some(user) = roster.get(actor).filter(|c| c.is_alive()) else {
        return Err(TacticError::ActorUnavailable(actor));
    };
    if user.morale() < tuning.cost {
        return Err(TacticError::InsufficientMorale {
            actor,
            needed: tuning.cost,
            available: user.morale(),
        });
    }
    let targets: Vec<CombatantId> = match rally {
        Rally::Boost => vec![actor],
        Rally::Inspire => roster.friendly_to(user).map(|c| c.id).collect(),
    };

    if let Some(user) = roster.get_mut(actor) {
        user.adjust_morale(-tuning.cost, config.morale.max);
    }
    info!(%actor, %rally, cost = tuning.cost, "rally");
    log.record(EventKind::Rallied {
        actor,
        rally,
        cost: tuning.cost,
    });
    log.sfx(match rally {
        Rally::Boost => "morale_boost",
        Rally::Inspire => "team_inspire",
    });

    let mut buffed = Vec::with_capacity(targets.len());
    for id in targets {
        let added = roster.get_mut(id).is_some_and(|member| {
            member.status.add(StatusEffect {
                kind: rally.status(),
                remaining: tuning.turns,
                magnitude: tuning.bonus,
                source: Some(actor),
            })
        });
        if !added {
            debug!(target = %id, %rally, "status list full");
            continue;
        }
        log.record(EventKind::StatusApplied {
            target: id,
            status: rally.status(),
            magnitude: tuning.bonus,
            turns: tuning.turns,
        });
        log.effect(EffectCue::Buff, id, tuning.bonus);
        buffed.push(id);
    }
    Ok(buffed)
}

/// Turns `target` against its own side for the configured number of its
/// turns and starts the caster's cooldown.
pub fn take_control(
    caster: CombatantId,
    target: CombatantId,
    roster: &mut Roster,
    config: &BattleConfig,
    log: &mut BattleLog,
) -> Result<(), TacticError> {
    let tuning = config.mind_control;
    let Some(holder) = roster.get(caster).filter(|c| c.is_alive()) else {
        return Err(TacticError::ActorUnavailable(caster));
    };
    if holder.control_cooldown > 0 {
        return Err(TacticError::ControlCooldown {
            actor: caster,
            remaining: holder.control_cooldown,
        });
    }
    if let Some(taken) = roster.living().find(|c| c.status.has(StatusKind::Controlled)) {
        return Err(TacticError::ControlActive(taken.id));
    }
    let caster_side = holder.side;
    let valid = roster
        .get(target)
        .is_some_and(|c| c.is_alive() && c.side != caster_side);
    if !valid {
        return Err(TacticError::InvalidTarget(target));
    }

    let Some(taken) = roster.get_mut(target) else {
        return Err(TacticError::InvalidTarget(target));
    };
    // Control replaces any taunt; the taunter is now an ally.
    let was_taunted = taken.status.has(StatusKind::Taunted);
    taken.status.remove(StatusKind::Taunted);
    let added = taken.status.add(StatusEffect {
        kind: StatusKind::Controlled,
        remaining: tuning.turns,
        magnitude: 0.0,
        source: Some(caster),
    });
    if !added {
        debug!(%target, "status list full, control refused");
        return Err(TacticError::InvalidTarget(target));
    }
    taken.adjust_morale(-tuning.target_morale, config.morale.max);
    if was_taunted {
        log.record(EventKind::StatusExpired {
            target,
            status: StatusKind::Taunted,
        });
    }

    if let Some(holder) = roster.get_mut(caster) {
        holder.control_cooldown = tuning.cooldown;
        holder.adjust_morale(tuning.caster_morale, config.morale.max);
    }
    info!(%caster, %target, turns = tuning.turns, "mind control");
    log.record(EventKind::ControlStarted {
        caster,
        target,
        turns: tuning.turns,
    });
    log.effect(EffectCue::Debuff, target, 0.0);
    log.sfx("mind_control_start");
    Ok(())
}

/// Frees `target` when whoever controls it has fallen. Returns true when it
/// was released.
pub fn release_orphaned(target: CombatantId, roster: &mut Roster, log: &mut BattleLog) -> bool {
    let orphaned = roster
        .get(target)
        .and_then(|c| c.controlled_by())
        .is_some_and(|caster| !roster.is_alive(caster));
    if !orphaned {
        return false;
    }
    if let Some(taken) = roster.get_mut(target) {
        taken.status.remove(StatusKind::Controlled);
    }
    debug!(%target, "controller fell, control released");
    log.record(EventKind::ControlReleased { target });
    true
}
