//! Content factory for building battle tables from data files.

use std::path::{Path, PathBuf};

use battle_core::{
    BattleConfig, BattleSetup, Combatant, ComboDefinition, DifficultyProfile, QteDefinition,
    SkillBook, WeatherSnapshot,
};
use tracing::info;

use crate::loaders::difficulty::DifficultyTable;
use crate::loaders::weather::WeatherTable;
use crate::loaders::{
    ArchetypeLoader, ComboLoader, ConfigLoader, DifficultyLoader, LoadResult, QteLoader,
    SkillLoader, WeatherLoader,
};
use crate::templates::ArchetypeCatalog;

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// ├── archetypes.ron
/// ├── skills.ron
/// ├── qte.ron
/// ├── combos.ron
/// ├── weather.ron
/// └── difficulty.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle rules from `battle.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load(&self.data_dir.join("battle.toml"))
    }

    /// Load archetype stat ranges from `archetypes.ron`.
    pub fn load_archetypes(&self) -> LoadResult<ArchetypeCatalog> {
        ArchetypeLoader::load(&self.data_dir.join("archetypes.ron"))
    }

    /// Load the skill book from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<SkillBook> {
        SkillLoader::load(&self.data_dir.join("skills.ron"))
    }

    /// Load timing challenges from `qte.ron`.
    pub fn load_qte(&self) -> LoadResult<Vec<QteDefinition>> {
        QteLoader::load(&self.data_dir.join("qte.ron"))
    }

    /// Load team combos from `combos.ron`.
    pub fn load_combos(&self) -> LoadResult<Vec<ComboDefinition>> {
        ComboLoader::load(&self.data_dir.join("combos.ron"))
    }

    /// Load the weather table from `weather.ron`.
    pub fn load_weather(&self) -> LoadResult<WeatherTable> {
        WeatherLoader::load(&self.data_dir.join("weather.ron"))
    }

    /// Load AI difficulty profiles from `difficulty.ron`.
    pub fn load_difficulty(&self) -> LoadResult<DifficultyTable> {
        DifficultyLoader::load(&self.data_dir.join("difficulty.ron"))
    }

    /// Load every table and check that loadouts name known skills.
    pub fn load_all(&self) -> LoadResult<Content> {
        let content = Content {
            config: self.load_config()?,
            archetypes: self.load_archetypes()?,
            skills: self.load_skills()?,
            qte: self.load_qte()?,
            combos: self.load_combos()?,
            weather: self.load_weather()?,
            difficulty: self.load_difficulty()?,
        };

        let loadouts = content
            .archetypes
            .archetypes
            .iter()
            .flat_map(|template| template.skills.iter())
            .chain(content.archetypes.boss.skills.iter());
        for skill in loadouts {
            if content.skills.get(skill).is_none() {
                anyhow::bail!("Loadout names unknown skill '{}'", skill);
            }
        }

        info!(
            data_dir = %self.data_dir.display(),
            skills = content.skills.len(),
            archetypes = content.archetypes.archetypes.len(),
            combos = content.combos.len(),
            "content loaded"
        );
        Ok(content)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Every table a battle needs, as loaded from one data directory.
#[derive(Debug, Clone)]
pub struct Content {
    pub config: BattleConfig,
    pub archetypes: ArchetypeCatalog,
    pub skills: SkillBook,
    pub qte: Vec<QteDefinition>,
    pub combos: Vec<ComboDefinition>,
    pub weather: WeatherTable,
    pub difficulty: DifficultyTable,
}

impl Content {
    /// Battle setup using the loaded tables, at wave 1 in clear weather.
    pub fn battle_setup(&self, combatants: Vec<Combatant>, seed: u64) -> BattleSetup {
        BattleSetup {
            combatants,
            config: self.config.clone(),
            skills: self.skills.clone(),
            qte_definitions: self.qte.clone(),
            combos: self.combos.clone(),
            difficulty: DifficultyProfile::default(),
            weather: WeatherSnapshot::clear(),
            wave: 1,
            boss_appeared: false,
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let factory = ContentFactory::new("/nonexistent/battle-data");
        let error = factory.load_config().unwrap_err();
        assert!(error.to_string().contains("battle.toml"));
    }
}
