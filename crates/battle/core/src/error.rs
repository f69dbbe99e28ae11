//! Common error infrastructure for battle-core.
//!
//! Domain errors live next to the operations that raise them
//! (`ActionError` in [`crate::resolve`], `ControllerError` in
//! [`crate::controller`]). Timing challenges and combos share
//! [`SessionError`], defined here. No error is fatal: a rejected request
//! leaves the battle untouched and is recorded in the event log.
use crate::combatant::{ArchetypeFamily, ArchetypePair, CombatantId};
use crate::qte::QteKind;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later (session busy, cooldown)
/// - **Validation**: the request itself is invalid and should not be retried
/// - **Internal**: state inconsistency that indicates a bug
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all battle-core errors.
///
/// Implementors derive `thiserror::Error` for Display and classify each
/// variant by recoverability, not impact.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for the variant, used in logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised when starting a timing challenge or combo session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a timing or combo session is already active")]
    AlreadyActive,

    #[error("combatant {0} is defeated")]
    ActorDefeated(CombatantId),

    #[error("no timing challenge is configured for {0}")]
    UnconfiguredQte(QteKind),

    #[error("no combo is configured for {0}")]
    UnconfiguredCombo(ArchetypePair),

    #[error("team has no living {0} to join the combo")]
    MissingMember(ArchetypeFamily),

    #[error("combatant {actor} cannot join a combo for {remaining} more turns")]
    ComboCooldown { actor: CombatantId, remaining: u32 },
}

impl BattleError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AlreadyActive | Self::ComboCooldown { .. } => ErrorSeverity::Recoverable,
            Self::ActorDefeated(_) | Self::MissingMember(_) => ErrorSeverity::Validation,
            Self::UnconfiguredQte(_) | Self::UnconfiguredCombo(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyActive => "SESSION_ALREADY_ACTIVE",
            Self::ActorDefeated(_) => "SESSION_ACTOR_DEFEATED",
            Self::UnconfiguredQte(_) => "SESSION_UNCONFIGURED_QTE",
            Self::UnconfiguredCombo(_) => "SESSION_UNCONFIGURED_COMBO",
            Self::MissingMember(_) => "SESSION_MISSING_MEMBER",
            Self::ComboCooldown { .. } => "SESSION_COMBO_COOLDOWN",
        }
    }
}
