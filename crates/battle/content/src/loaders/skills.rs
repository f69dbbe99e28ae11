//! Skill book loader.

use std::path::Path;

use battle_core::{SkillBook, SkillDef};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Skill catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<SkillDef>,
}

/// Loader for the skill book from RON files.
pub struct SkillLoader;

impl SkillLoader {
    /// Load a skill book from a RON file. Later entries replace earlier ones
    /// with the same id.
    pub fn load(path: &Path) -> LoadResult<SkillBook> {
        let content = read_file(path)?;
        let catalog: SkillCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill catalog RON: {}", e))?;

        Ok(catalog.skills.into_iter().collect())
    }
}
