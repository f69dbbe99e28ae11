//! Difficulty profile loader.

use std::path::Path;

use battle_core::{Difficulty, DifficultyProfile};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Difficulty table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub profiles: Vec<DifficultyProfile>,
}

impl DifficultyTable {
    /// Profile for `level`, falling back to the built-in one.
    pub fn profile(&self, level: Difficulty) -> DifficultyProfile {
        self.profiles
            .iter()
            .find(|profile| profile.level == level)
            .copied()
            .unwrap_or_else(|| DifficultyProfile::for_level(level))
    }
}

/// Loader for AI difficulty profiles from RON files.
pub struct DifficultyLoader;

impl DifficultyLoader {
    pub fn load(path: &Path) -> LoadResult<DifficultyTable> {
        let content = read_file(path)?;
        let table: DifficultyTable = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse difficulty table RON: {}", e))?;

        Ok(table)
    }
}
