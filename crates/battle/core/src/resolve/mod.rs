//! Action resolution pipeline.
//!
//! A request runs through a fixed order of steps: availability, dodge, base
//! magnitude, timing, weather, morale, meter, critical, defense/block/counter,
//! apply, death check. Validation happens before anything is mutated, and a
//! request either resolves completely (including any counter it provokes) or
//! is rejected with an [`ActionError`].
mod error;
pub mod formula;
mod pipeline;
mod validation;

pub use error::ActionError;
pub use pipeline::resolve;

use crate::combatant::{CombatantId, Roster};
use crate::config::BattleConfig;
use crate::event::BattleLog;
use crate::rng::BattleRng;
use crate::skill::{SkillBook, SkillId};
use crate::weather::WeatherSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Attack,
    Skill(SkillId),
    /// Raises the actor's defense until its next turn.
    Defend,
    Wait,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub actor: CombatantId,
    pub kind: ActionKind,
    /// Chosen target for single-target modes; ignored otherwise.
    pub targets: Vec<CombatantId>,
}

impl ActionRequest {
    pub fn attack(actor: CombatantId, target: CombatantId) -> Self {
        Self {
            actor,
            kind: ActionKind::Attack,
            targets: vec![target],
        }
    }

    pub fn skill(actor: CombatantId, skill: impl Into<SkillId>, targets: Vec<CombatantId>) -> Self {
        Self {
            actor,
            kind: ActionKind::Skill(skill.into()),
            targets,
        }
    }

    pub fn defend(actor: CombatantId) -> Self {
        Self {
            actor,
            kind: ActionKind::Defend,
            targets: Vec::new(),
        }
    }

    pub fn wait(actor: CombatantId) -> Self {
        Self {
            actor,
            kind: ActionKind::Wait,
            targets: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitKind {
    Dodged,
    Damage {
        amount: f64,
        critical: bool,
        blocked: bool,
    },
    Heal {
        amount: f64,
    },
    Status {
        kind: crate::combatant::StatusKind,
    },
    /// The target answered a blocked strike with its own attack.
    Counter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitRecord {
    pub source: CombatantId,
    pub target: CombatantId,
    pub kind: HitKind,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub actor: CombatantId,
    pub action: ActionKind,
    pub hits: Vec<HitRecord>,
    /// Combatants that fell during this action, in the order they fell.
    pub defeated: Vec<CombatantId>,
}

impl ActionOutcome {
    fn new(actor: CombatantId, action: ActionKind) -> Self {
        Self {
            actor,
            action,
            hits: Vec::new(),
            defeated: Vec::new(),
        }
    }

    /// Total damage dealt to `target` by this action.
    pub fn damage_to(&self, target: CombatantId) -> f64 {
        self.hits
            .iter()
            .filter(|hit| hit.target == target)
            .map(|hit| match hit.kind {
                HitKind::Damage { amount, .. } => amount,
                _ => 0.0,
            })
            .sum()
    }
}

/// Borrowed view of everything the pipeline reads or mutates.
pub struct ResolveContext<'a> {
    pub roster: &'a mut Roster,
    pub skills: &'a SkillBook,
    pub config: &'a BattleConfig,
    pub weather: &'a WeatherSnapshot,
    pub rng: &'a mut BattleRng,
    pub log: &'a mut BattleLog,
}

/// Checks a request without resolving it.
pub fn check(roster: &Roster, skills: &SkillBook, request: &ActionRequest) -> Result<(), ActionError> {
    validation::validate(roster, skills, request).map(|_| ())
}
