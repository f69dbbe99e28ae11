//! Archetype catalog loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::templates::ArchetypeCatalog;

/// Loader for archetype stat ranges and the boss template from RON files.
pub struct ArchetypeLoader;

impl ArchetypeLoader {
    pub fn load(path: &Path) -> LoadResult<ArchetypeCatalog> {
        let content = read_file(path)?;
        let catalog: ArchetypeCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse archetype catalog RON: {}", e))?;

        for template in &catalog.archetypes {
            let ranges = [
                ("hp", template.hp),
                ("attack", template.attack),
                ("defense", template.defense),
                ("speed", template.speed),
                ("crit_chance", template.crit_chance),
            ];
            for (stat, range) in ranges {
                if range.min > range.max || range.min < 0.0 {
                    anyhow::bail!(
                        "Invalid {} range ({}, {}) for {}",
                        stat,
                        range.min,
                        range.max,
                        template.archetype
                    );
                }
            }
        }
        if catalog.template(catalog.boss.archetype).is_none() {
            anyhow::bail!(
                "Boss {} uses {} which has no template",
                catalog.boss.name,
                catalog.boss.archetype
            );
        }
        Ok(catalog)
    }
}
