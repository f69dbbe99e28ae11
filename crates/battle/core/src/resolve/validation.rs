//! Availability checks and target resolution.
//!
//! Validation reads the roster but never mutates it, so a rejected request
//! leaves the battle exactly as it was.
use crate::combatant::{Combatant, CombatantId, Roster};
use crate::skill::{SkillBook, SkillEffect, SkillId, TargetMode};

use super::{ActionError, ActionKind, ActionRequest};

/// What a validated request will do.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PlannedEffect {
    Effect(SkillEffect),
    Defend,
    Wait,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Plan {
    pub effect: PlannedEffect,
    pub targets: Vec<CombatantId>,
    pub skill: Option<SkillId>,
}

/// Effect of a basic attack.
pub(crate) const BASIC_ATTACK: SkillEffect = SkillEffect::Damage {
    power: 1.0,
    status: None,
};

/// Checks that `request` can run now and resolves its targets.
pub(crate) fn validate(
    roster: &Roster,
    skills: &SkillBook,
    request: &ActionRequest,
) -> Result<Plan, ActionError> {
    let actor = roster
        .get(request.actor)
        .ok_or(ActionError::ActorNotFound(request.actor))?;
    if !actor.is_alive() {
        return Err(ActionError::ActorDefeated(actor.id));
    }
    if actor.is_incapacitated() {
        return Err(ActionError::ActorIncapacitated(actor.id));
    }

    let (effect, mode, skill) = match &request.kind {
        ActionKind::Wait => {
            return Ok(Plan {
                effect: PlannedEffect::Wait,
                targets: Vec::new(),
                skill: None,
            });
        }
        ActionKind::Defend => {
            return Ok(Plan {
                effect: PlannedEffect::Defend,
                targets: vec![actor.id],
                skill: None,
            });
        }
        ActionKind::Attack => (BASIC_ATTACK, TargetMode::SingleEnemy, None),
        ActionKind::Skill(id) => {
            let def = skills
                .get(id)
                .ok_or_else(|| ActionError::UnknownSkill(id.clone()))?;
            if !actor.knows(id) {
                return Err(ActionError::SkillNotLearned {
                    actor: actor.id,
                    skill: id.clone(),
                });
            }
            let remaining = actor.cooldown(id);
            if remaining > 0 {
                return Err(ActionError::OnCooldown {
                    skill: id.clone(),
                    remaining,
                });
            }
            if actor.meter.value() < def.meter_cost {
                return Err(ActionError::InsufficientMeter {
                    skill: id.clone(),
                    needed: def.meter_cost,
                    available: actor.meter.value(),
                });
            }
            if actor.morale() < def.morale_cost {
                return Err(ActionError::InsufficientMorale {
                    skill: id.clone(),
                    needed: def.morale_cost,
                    available: actor.morale(),
                });
            }
            (def.effect.clone(), def.target, Some(id.clone()))
        }
    };

    let targets = resolve_targets(roster, request, mode)?;
    Ok(Plan {
        effect: PlannedEffect::Effect(effect),
        targets,
        skill,
    })
}

fn resolve_targets(
    roster: &Roster,
    request: &ActionRequest,
    mode: TargetMode,
) -> Result<Vec<CombatantId>, ActionError> {
    let Some(actor) = roster.get(request.actor) else {
        return Err(ActionError::ActorNotFound(request.actor));
    };

    // Sides follow allegiance, so a controlled combatant turns on its own.
    let single = |accept: &dyn Fn(&Combatant) -> bool| -> Result<Vec<CombatantId>, ActionError> {
        let id = *request.targets.first().ok_or(ActionError::MissingTarget)?;
        let target = roster.get(id).ok_or(ActionError::InvalidTarget(id))?;
        if !accept(target) {
            return Err(ActionError::InvalidTarget(id));
        }
        if !target.is_alive() {
            return Err(ActionError::TargetDefeated(id));
        }
        Ok(vec![id])
    };
    let everyone = |ids: Vec<CombatantId>| -> Result<Vec<CombatantId>, ActionError> {
        if ids.is_empty() {
            Err(ActionError::MissingTarget)
        } else {
            Ok(ids)
        }
    };

    match mode {
        TargetMode::SingleEnemy => single(&|c: &Combatant| actor.is_hostile_to(c)),
        TargetMode::AllEnemies => everyone(roster.hostile_to(actor).map(|c| c.id).collect()),
        TargetMode::SelfOnly => Ok(vec![actor.id]),
        TargetMode::SingleAlly => single(&|c: &Combatant| actor.is_friendly_to(c)),
        TargetMode::AllAllies => everyone(roster.friendly_to(actor).map(|c| c.id).collect()),
    }
}
