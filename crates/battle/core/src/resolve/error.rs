use crate::combatant::CombatantId;
use crate::error::{BattleError, ErrorSeverity};
use crate::skill::SkillId;

/// Reasons an action request is rejected before any state changes.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("combatant {0} does not exist")]
    ActorNotFound(CombatantId),

    #[error("combatant {0} is defeated")]
    ActorDefeated(CombatantId),

    #[error("combatant {0} is stunned")]
    ActorIncapacitated(CombatantId),

    #[error("skill {0} is not defined")]
    UnknownSkill(SkillId),

    #[error("combatant {actor} has not learned {skill}")]
    SkillNotLearned { actor: CombatantId, skill: SkillId },

    #[error("skill {skill} is cooling down for {remaining} turns")]
    OnCooldown { skill: SkillId, remaining: u32 },

    #[error("skill {skill} needs {needed} meter, {available} available")]
    InsufficientMeter {
        skill: SkillId,
        needed: f64,
        available: f64,
    },

    #[error("skill {skill} needs {needed} morale, {available} available")]
    InsufficientMorale {
        skill: SkillId,
        needed: f64,
        available: f64,
    },

    #[error("action needs a target")]
    MissingTarget,

    #[error("combatant {0} is not a valid target")]
    InvalidTarget(CombatantId),

    #[error("target {0} is defeated")]
    TargetDefeated(CombatantId),
}

impl BattleError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OnCooldown { .. }
            | Self::InsufficientMeter { .. }
            | Self::InsufficientMorale { .. }
            | Self::ActorIncapacitated(_) => ErrorSeverity::Recoverable,
            Self::ActorNotFound(_) => ErrorSeverity::Internal,
            Self::ActorDefeated(_)
            | Self::UnknownSkill(_)
            | Self::SkillNotLearned { .. }
            | Self::MissingTarget
            | Self::InvalidTarget(_)
            | Self::TargetDefeated(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            Self::ActorDefeated(_) => "ACTION_ACTOR_DEFEATED",
            Self::ActorIncapacitated(_) => "ACTION_ACTOR_INCAPACITATED",
            Self::UnknownSkill(_) => "ACTION_UNKNOWN_SKILL",
            Self::SkillNotLearned { .. } => "ACTION_SKILL_NOT_LEARNED",
            Self::OnCooldown { .. } => "ACTION_ON_COOLDOWN",
            Self::InsufficientMeter { .. } => "ACTION_INSUFFICIENT_METER",
            Self::InsufficientMorale { .. } => "ACTION_INSUFFICIENT_MORALE",
            Self::MissingTarget => "ACTION_MISSING_TARGET",
            Self::InvalidTarget(_) => "ACTION_INVALID_TARGET",
            Self::TargetDefeated(_) => "ACTION_TARGET_DEFEATED",
        }
    }
}
