//! Deterministic turn-based battle resolution.
//!
//! `battle-core` owns the rules of a single encounter between two rosters:
//! combatants and their resource meters, timing challenges (QTE), team
//! combos, the action resolution pipeline, turn scheduling and the AI that
//! drives automated combatants. It performs no I/O. Callers feed abstract
//! input events and a fixed-timestep clock into [`BattleController`] and
//! drain the resulting [`Command`]s and [`BattleEvent`]s.
//!
//! All randomness flows through one seeded [`BattleRng`], so the same setup,
//! seed and input schedule always produce the same event log.
pub mod ai;
pub mod combatant;
pub mod combo;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod meter;
pub mod qte;
pub mod resolve;
pub mod rng;
pub mod scheduler;
pub mod skill;
pub mod state;
pub mod tactics;
pub mod weather;

pub use ai::{AiSelector, BossPhase, Difficulty, DifficultyProfile, TargetPolicy};
pub use combatant::{
    AiHeuristic, Archetype, ArchetypeFamily, ArchetypePair, ArchetypeTier, Capabilities,
    CombatStats, Combatant, CombatantId, Control, MoraleTier, Roster, Row, Side, StatusEffect,
    StatusEffects, StatusKind,
};
pub use combo::{
    ComboDefinition, ComboEffect, ComboFailure, ComboManager, ComboOutcome, ComboPattern,
    ComboRating,
};
pub use config::{
    BattleConfig, ComboTuning, FocusTuning, MeterTuning, MindControlTuning, MitigationTuning,
    MoraleTuning, RageTuning, RallyTuning, RatingScale, RewardTuning, ThreatTuning, TimingTuning,
    TypeAdvantage,
};
pub use controller::{BattleController, BattleSetup, ControllerError, TickStatus};
pub use error::{BattleError, ErrorSeverity, SessionError};
pub use event::{BattleEvent, BattleLog, Command, EffectCue, EventKind, SkipReason};
pub use meter::{MeterBonuses, MeterKind, MeterReason, MeterTrigger, GainSource, ResourceMeter};
pub use qte::{
    Direction, InputEvent, Key, QteDefinition, QteKind, QteManager, QteOutcome, QtePattern,
    QteRating,
};
pub use resolve::{ActionError, ActionKind, ActionOutcome, ActionRequest, HitKind, HitRecord};
pub use rng::{BattleRng, PcgRng, RngOracle};
pub use scheduler::TurnScheduler;
pub use skill::{SkillBook, SkillDef, SkillEffect, SkillId, StatusApplication, TargetMode};
pub use state::{BattleOutcome, BattleState, PendingAction, Phase, Rewards};
pub use tactics::{Rally, TacticError};
pub use weather::{FamilyWeather, WeatherKind, WeatherSnapshot};
