//! Data-driven battle content.
//!
//! This crate turns data files into the tables `battle-core` consumes:
//! - Battle rules (`battle.toml`, TOML)
//! - Skill book, timing challenges and combos (RON)
//! - Weather table and AI difficulty profiles (RON)
//! - Archetype stat ranges and the boss template (RON)
//!
//! [`TeamBuilder`] rolls concrete combatants from the archetype ranges with
//! the battle's seeded random source, so assembly is as reproducible as the
//! battle itself.

pub mod templates;
pub mod team;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use team::TeamBuilder;
pub use templates::{ArchetypeCatalog, ArchetypeTemplate, BossTemplate, StatRange};

#[cfg(feature = "loaders")]
pub use loaders::{
    ArchetypeLoader, ComboLoader, ConfigLoader, Content, ContentFactory, DifficultyLoader,
    LoadResult, QteLoader, SkillLoader, WeatherLoader,
};
