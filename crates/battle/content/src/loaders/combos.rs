//! Combo table loader.

use std::path::Path;

use battle_core::ComboDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Combo table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboTable {
    pub combos: Vec<ComboDefinition>,
}

/// Loader for team combo definitions from RON files.
pub struct ComboLoader;

impl ComboLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ComboDefinition>> {
        let content = read_file(path)?;
        let table: ComboTable = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse combo table RON: {}", e))?;

        for (index, combo) in table.combos.iter().enumerate() {
            if table.combos[..index].iter().any(|other| other.pair == combo.pair) {
                anyhow::bail!("Duplicate combo for pair {} ({})", combo.pair, combo.name);
            }
        }
        Ok(table.combos)
    }
}
