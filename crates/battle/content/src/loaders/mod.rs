//! Content loaders for reading battle data from files.
//!
//! Each loader reads one file and returns `battle-core` types directly;
//! [`ContentFactory`] ties them to a data directory.

pub mod archetypes;
pub mod combos;
pub mod config;
pub mod difficulty;
pub mod factory;
pub mod qte;
pub mod skills;
pub mod weather;

pub use archetypes::ArchetypeLoader;
pub use combos::ComboLoader;
pub use config::ConfigLoader;
pub use difficulty::DifficultyLoader;
pub use factory::{Content, ContentFactory};
pub use qte::QteLoader;
pub use skills::SkillLoader;
pub use weather::WeatherLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
