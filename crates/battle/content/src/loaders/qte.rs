//! Timing challenge table loader.

use std::path::Path;

use battle_core::QteDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Timing challenge table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QteTable {
    pub definitions: Vec<QteDefinition>,
}

/// Loader for timing challenge definitions from RON files.
pub struct QteLoader;

impl QteLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<QteDefinition>> {
        let content = read_file(path)?;
        let table: QteTable = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse QTE table RON: {}", e))?;

        for definition in &table.definitions {
            if definition.window <= 0.0 {
                anyhow::bail!(
                    "QTE {} has a non-positive window ({})",
                    definition.kind(),
                    definition.window
                );
            }
        }
        Ok(table.definitions)
    }
}
