//! Team assembly from archetype templates.

use battle_core::{
    Archetype, BattleConfig, BattleRng, Combatant, Control, DifficultyProfile, ResourceMeter, Side,
    SkillBook, SkillId,
};
use tracing::{debug, warn};

use crate::templates::{ArchetypeCatalog, ArchetypeTemplate};

/// Rolls combatants from an [`ArchetypeCatalog`].
///
/// Meters and morale start from the battle's configuration, so tuning loaded
/// from `battle.toml` (such as a lower focus cap) applies to every combatant.
pub struct TeamBuilder<'a> {
    catalog: &'a ArchetypeCatalog,
    config: &'a BattleConfig,
}

impl<'a> TeamBuilder<'a> {
    pub fn new(catalog: &'a ArchetypeCatalog, config: &'a BattleConfig) -> Self {
        Self { catalog, config }
    }

    /// Rolls one combatant at full hp and morale.
    ///
    /// Returns `None` when the catalog has no template for `archetype`.
    pub fn combatant(
        &self,
        name: impl Into<String>,
        side: Side,
        archetype: Archetype,
        rng: &mut BattleRng,
    ) -> Option<Combatant> {
        let template = self.catalog.template(archetype)?;
        let stats = template.roll_stats(rng);
        Some(self.finish(Combatant::new(name, side, archetype, stats), template))
    }

    /// Player-side team in the given order. Archetypes without a template are skipped.
    pub fn party(&self, archetypes: &[Archetype], control: Control, rng: &mut BattleRng) -> Vec<Combatant> {
        archetypes
            .iter()
            .enumerate()
            .filter_map(|(index, &archetype)| {
                let name = format!("{archetype} {}", index + 1);
                let member = self.combatant(name, Side::Player, archetype, rng);
                if member.is_none() {
                    warn!(%archetype, "no template, party slot left empty");
                }
                member.map(|c| c.with_control(control))
            })
            .collect()
    }

    /// Enemy team with the difficulty's stat multiplier applied.
    pub fn enemies(
        &self,
        archetypes: &[Archetype],
        profile: &DifficultyProfile,
        rng: &mut BattleRng,
    ) -> Vec<Combatant> {
        archetypes
            .iter()
            .enumerate()
            .filter_map(|(index, &archetype)| {
                let Some(template) = self.catalog.template(archetype) else {
                    warn!(%archetype, "no template, enemy slot left empty");
                    return None;
                };
                let stats = template
                    .roll_stats(rng)
                    .scaled(profile.enemy_stats_multiplier);
                let name = format!("Enemy {archetype} {}", index + 1);
                Some(self.finish(Combatant::new(name, Side::Enemy, archetype, stats), template))
            })
            .collect()
    }

    /// The wave boss, scaled by the boss template and the difficulty.
    pub fn boss(&self, profile: &DifficultyProfile, rng: &mut BattleRng) -> Option<Combatant> {
        let boss = &self.catalog.boss;
        let template = self.catalog.template(boss.archetype)?;
        let factor = boss.stat_scale * profile.enemy_stats_multiplier;
        let stats = template.roll_stats(rng).scaled(factor);
        debug!(name = %boss.name, factor, "boss assembled");

        let skills = if boss.skills.is_empty() {
            SkillBook::boss_loadout()
        } else {
            boss.skills.clone()
        };
        let combatant = self
            .finish(
                Combatant::new(boss.name.clone(), Side::Enemy, boss.archetype, stats),
                template,
            )
            .with_capabilities(boss.capabilities)
            .with_skills(skills);
        Some(combatant)
    }

    fn finish(&self, combatant: Combatant, template: &ArchetypeTemplate) -> Combatant {
        let archetype = combatant.archetype;
        let skills: Vec<SkillId> = if template.skills.is_empty() {
            SkillBook::standard_loadout(archetype)
        } else {
            template.skills.clone()
        };
        let meter = ResourceMeter::for_kind(archetype.family().meter_kind(), &self.config.meters);
        let morale = self.config.morale.max;

        let mut combatant = combatant
            .with_skills(skills)
            .with_meter(meter)
            .with_morale(morale, morale);
        if let Some(capabilities) = template.capabilities {
            combatant = combatant.with_capabilities(capabilities);
        }
        if let Some(row) = template.row {
            combatant = combatant.with_row(row);
        }
        combatant
    }
}
