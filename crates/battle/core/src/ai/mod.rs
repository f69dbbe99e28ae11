//! Action selection for AI-controlled combatants.
//!
//! Selection works in two layers:
//!
//! 1. **Plan**: the combatant's heuristic (or a boss's hp phase) produces a
//!    prioritized list of intents, each with an optional preferred target.
//!    Optional intents are gated by difficulty rolls.
//! 2. **Realize**: the list is walked for the first intent the combatant has
//!    a usable skill for. The strongest matching skill wins.
//!
//! When nothing in the plan is usable the combatant falls back to a basic
//! attack on a target chosen by the difficulty's [`TargetPolicy`]. A taunted
//! combatant directs every single-enemy action at its taunter.
mod difficulty;
pub mod targeting;

pub use difficulty::{Difficulty, DifficultyProfile, TargetPolicy};

use strum::Display;
use tracing::debug;

use crate::combatant::{AiHeuristic, Combatant, CombatantId, Roster, StatusKind};
use crate::resolve::ActionRequest;
use crate::rng::BattleRng;
use crate::skill::{SkillBook, SkillDef, SkillEffect, TargetMode};

/// Boss behavior stage, chosen by remaining hp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BossPhase {
    /// Above 75% hp.
    Opening,
    /// 75% down to 50%.
    Pressure,
    /// Below 50% down to 25%.
    Desperate,
    /// Below 25%.
    Rage,
}

impl BossPhase {
    pub fn of(hp_fraction: f64) -> Self {
        if hp_fraction > 0.75 {
            Self::Opening
        } else if hp_fraction >= 0.5 {
            Self::Pressure
        } else if hp_fraction >= 0.25 {
            Self::Desperate
        } else {
            Self::Rage
        }
    }
}

/// What a plan entry wants to achieve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Intent {
    /// Heal or shield an ally.
    Protect,
    Taunt,
    /// Raise own offense.
    Empower,
    /// Raise own evasion or defense.
    Evade,
    /// Debuff one enemy.
    Hinder,
    Strike,
    /// Hit every enemy.
    Sweep,
}

impl Intent {
    fn matches(self, skill: &SkillDef) -> bool {
        match (self, &skill.effect) {
            (Self::Protect, SkillEffect::Heal { .. } | SkillEffect::Buff { .. }) => {
                matches!(skill.target, TargetMode::SingleAlly | TargetMode::AllAllies)
            }
            (Self::Taunt, SkillEffect::Taunt { .. }) => true,
            (Self::Empower, SkillEffect::Buff { status }) => {
                skill.target == TargetMode::SelfOnly
                    && matches!(
                        status.kind,
                        StatusKind::AttackUp | StatusKind::CritUp | StatusKind::Hasted
                    )
            }
            (Self::Evade, SkillEffect::Buff { status }) => {
                skill.target == TargetMode::SelfOnly
                    && matches!(status.kind, StatusKind::EvasionUp | StatusKind::DefenseUp)
            }
            (Self::Hinder, SkillEffect::Debuff { .. }) => skill.target == TargetMode::SingleEnemy,
            (Self::Strike, SkillEffect::Damage { .. } | SkillEffect::Drain { .. }) => {
                skill.target == TargetMode::SingleEnemy
            }
            (
                Self::Sweep,
                SkillEffect::Damage { .. } | SkillEffect::Drain { .. } | SkillEffect::Debuff { .. },
            ) => skill.target == TargetMode::AllEnemies,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    intent: Intent,
    target: Option<CombatantId>,
}

impl Candidate {
    fn new(intent: Intent, target: Option<CombatantId>) -> Self {
        Self { intent, target }
    }
}

/// Chooses actions for AI-controlled combatants.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AiSelector {
    profile: DifficultyProfile,
}

impl AiSelector {
    pub fn new(profile: DifficultyProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Picks an action for `actor`. Always returns a request; a combatant
    /// with no enemy left to hit waits.
    pub fn choose(
        &self,
        actor: CombatantId,
        roster: &Roster,
        skills: &SkillBook,
        rng: &mut BattleRng,
    ) -> ActionRequest {
        let Some(combatant) = roster.get(actor) else {
            return ActionRequest::wait(actor);
        };
        let taunter = combatant.taunted_by().filter(|id| roster.is_alive(*id));

        let plan = if combatant.is_boss() {
            let phase = BossPhase::of(combatant.hp_fraction());
            debug!(%actor, %phase, "boss phase");
            self.boss_plan(phase, combatant, roster, rng)
        } else {
            match combatant.heuristic {
                AiHeuristic::Guardian => self.guardian_plan(combatant, roster, rng),
                AiHeuristic::Berserker => self.berserker_plan(combatant, roster, rng),
                AiHeuristic::Marksman => self.marksman_plan(combatant, roster, rng),
            }
        };

        for candidate in plan {
            if let Some(request) = realize(combatant, candidate, skills, taunter) {
                debug!(%actor, intent = ?candidate.intent, action = ?request.kind, "ai chose skill");
                return request;
            }
        }

        let policy = match (combatant.heuristic, self.profile.target_policy) {
            (AiHeuristic::Marksman, TargetPolicy::Weakest) => TargetPolicy::BackLine,
            (_, policy) => policy,
        };
        let target =
            taunter.or_else(|| targeting::pick(policy, roster, combatant, rng));
        match target {
            Some(target) => {
                debug!(%actor, %target, %policy, "ai falls back to attack");
                ActionRequest::attack(actor, target)
            }
            None => ActionRequest::wait(actor),
        }
    }

    // ===== heuristics =====

    fn guardian_plan(&self, actor: &Combatant, roster: &Roster, rng: &mut BattleRng) -> Vec<Candidate> {
        let mut plan = Vec::new();
        let endangered = targeting::weakest_ally(actor, roster)
            .filter(|id| roster.get(*id).is_some_and(|ally| ally.hp_fraction() < 0.3));
        if endangered.is_some() && rng.roll(self.profile.skill_usage) {
            plan.push(Candidate::new(Intent::Protect, endangered));
        }
        if rng.roll(self.profile.aggression) {
            let strongest = roster.strongest_hostile(actor).map(|c| c.id);
            plan.push(Candidate::new(Intent::Taunt, strongest));
        }
        plan
    }

    fn berserker_plan(&self, actor: &Combatant, roster: &Roster, rng: &mut BattleRng) -> Vec<Candidate> {
        let mut plan = Vec::new();
        if rng.roll(self.profile.skill_usage) {
            plan.push(Candidate::new(Intent::Empower, None));
        }
        let weakest = targeting::pick(TargetPolicy::Weakest, roster, actor, rng);
        plan.push(Candidate::new(Intent::Strike, weakest));
        plan
    }

    fn marksman_plan(&self, actor: &Combatant, roster: &Roster, rng: &mut BattleRng) -> Vec<Candidate> {
        let mut plan = Vec::new();
        if actor.hp_fraction() < 0.5 {
            plan.push(Candidate::new(Intent::Evade, None));
        }
        let back = targeting::pick(TargetPolicy::BackLine, roster, actor, rng);
        plan.push(Candidate::new(Intent::Strike, back));
        plan
    }

    fn boss_plan(
        &self,
        phase: BossPhase,
        actor: &Combatant,
        roster: &Roster,
        rng: &mut BattleRng,
    ) -> Vec<Candidate> {
        let weakest = targeting::pick(TargetPolicy::Weakest, roster, actor, rng);
        match phase {
            BossPhase::Opening => {
                if rng.roll(self.profile.skill_usage) {
                    let target = targeting::pick(self.profile.target_policy, roster, actor, rng);
                    vec![Candidate::new(Intent::Strike, target)]
                } else {
                    Vec::new()
                }
            }
            BossPhase::Pressure => {
                let target = targeting::pick(TargetPolicy::Strategic, roster, actor, rng);
                vec![
                    Candidate::new(Intent::Sweep, None),
                    Candidate::new(Intent::Strike, target),
                ]
            }
            BossPhase::Desperate => {
                let strongest = roster.strongest_hostile(actor).map(|c| c.id);
                vec![
                    Candidate::new(Intent::Empower, None),
                    Candidate::new(Intent::Hinder, strongest),
                    Candidate::new(Intent::Strike, weakest),
                ]
            }
            BossPhase::Rage => vec![
                Candidate::new(Intent::Strike, weakest),
                Candidate::new(Intent::Sweep, None),
            ],
        }
    }
}

/// Turns a plan entry into a request, if the actor has a usable skill for it.
fn realize(
    actor: &Combatant,
    candidate: Candidate,
    skills: &SkillBook,
    taunter: Option<CombatantId>,
) -> Option<ActionRequest> {
    let mut best: Option<&SkillDef> = None;
    for id in &actor.skills {
        let Some(def) = skills.get(id) else {
            continue;
        };
        if !candidate.intent.matches(def) || !actor.can_afford(def) {
            continue;
        }
        best = match best {
            Some(current) if weight(current) >= weight(def) => Some(current),
            _ => Some(def),
        };
    }
    let def = best?;

    let targets = match def.target {
        TargetMode::SingleEnemy => vec![taunter.or(candidate.target)?],
        TargetMode::SingleAlly => vec![candidate.target?],
        TargetMode::AllEnemies | TargetMode::SelfOnly | TargetMode::AllAllies => Vec::new(),
    };
    Some(ActionRequest::skill(actor.id, def.id.clone(), targets))
}

/// Ranks skills serving the same intent; heals count by their power.
fn weight(skill: &SkillDef) -> f64 {
    match skill.effect {
        SkillEffect::Heal { power } => power,
        ref effect => effect.power(),
    }
}
