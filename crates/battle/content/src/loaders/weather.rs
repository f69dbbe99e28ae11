//! Weather table loader.

use std::path::Path;

use battle_core::{WeatherKind, WeatherSnapshot};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Weather table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherTable {
    pub weather: Vec<WeatherSnapshot>,
}

impl WeatherTable {
    /// Snapshot for `kind`, falling back to the built-in preset.
    pub fn snapshot(&self, kind: WeatherKind) -> WeatherSnapshot {
        self.weather
            .iter()
            .find(|snapshot| snapshot.kind == kind)
            .cloned()
            .unwrap_or_else(|| WeatherSnapshot::preset(kind))
    }
}

/// Loader for the weather table from RON files.
pub struct WeatherLoader;

impl WeatherLoader {
    pub fn load(path: &Path) -> LoadResult<WeatherTable> {
        let content = read_file(path)?;
        let table: WeatherTable = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse weather table RON: {}", e))?;

        Ok(table)
    }
}
