//! Step-by-step resolution of a validated request.
//!
//! Random draws happen in a fixed order per target: dodge, block, counter,
//! critical. A counter resolves to completion, through this same pipeline,
//! before the strike that provoked it is applied; counters never chain.
use tracing::{debug, warn};

use crate::combatant::{Capabilities, CombatantId, Side, StatusEffect, StatusKind};
use crate::event::{EffectCue, EventKind};
use crate::meter::{MeterKind, MeterReason, MeterTrigger};
use crate::skill::{SkillEffect, SkillId, StatusApplication};

use super::formula::{self, StrikeModifiers};
use super::validation::{PlannedEffect, validate};
use super::{ActionError, ActionOutcome, ActionRequest, HitKind, HitRecord, ResolveContext};

enum Strike {
    Dodged,
    Landed { amount: f64 },
    /// A participant vanished or the attacker fell to a counter; the
    /// strike did not land.
    Void,
}

/// Resolves `request`, scaling offensive and healing magnitudes by `timing`.
///
/// Rejections are logged and returned without touching any combatant.
pub fn resolve(
    ctx: &mut ResolveContext<'_>,
    request: &ActionRequest,
    timing: Option<f64>,
) -> Result<ActionOutcome, ActionError> {
    let plan = match validate(ctx.roster, ctx.skills, request) {
        Ok(plan) => plan,
        Err(error) => {
            warn!(actor = %request.actor, %error, "action rejected");
            ctx.log.record(EventKind::ActionRejected {
                actor: request.actor,
                reason: error.to_string(),
            });
            return Err(error);
        }
    };

    let actor = request.actor;
    debug!(%actor, action = ?request.kind, ?timing, targets = ?plan.targets, "resolving action");
    ctx.log.record(EventKind::ActionUsed {
        actor,
        action: request.kind.clone(),
        timing,
    });
    let mut outcome = ActionOutcome::new(actor, request.kind.clone());

    match &plan.effect {
        PlannedEffect::Wait => {}
        PlannedEffect::Defend => {
            let guard = StatusApplication {
                kind: StatusKind::DefenseUp,
                magnitude: ctx.config.mitigation.defend_bonus,
                turns: 1,
            };
            apply_status(ctx, actor, actor, guard, &mut outcome);
        }
        PlannedEffect::Effect(effect) => {
            for &target in &plan.targets {
                if !ctx.roster.is_alive(actor) {
                    break;
                }
                if !ctx.roster.is_alive(target) {
                    continue;
                }
                apply_effect(ctx, actor, target, effect, timing, &mut outcome);
            }
        }
    }

    if let Some(skill) = &plan.skill {
        pay_costs(ctx, actor, skill, &mut outcome);
    }
    Ok(outcome)
}

fn apply_effect(
    ctx: &mut ResolveContext<'_>,
    actor: CombatantId,
    target: CombatantId,
    effect: &SkillEffect,
    timing: Option<f64>,
    outcome: &mut ActionOutcome,
) {
    match *effect {
        SkillEffect::Damage { power, status } => {
            let strike = strike(ctx, actor, target, power, timing, true, outcome);
            if let (Strike::Landed { .. }, Some(status)) = (strike, status) {
                apply_status(ctx, actor, target, status, outcome);
            }
        }
        SkillEffect::Drain { power, ratio } => {
            if let Strike::Landed { amount } = strike(ctx, actor, target, power, timing, true, outcome) {
                heal(ctx, actor, actor, amount * ratio, outcome);
            }
        }
        SkillEffect::Debuff { power, status } => {
            let landed = if power > 0.0 {
                matches!(
                    strike(ctx, actor, target, power, timing, true, outcome),
                    Strike::Landed { .. }
                )
            } else {
                !dodged(ctx, actor, target, outcome)
            };
            if landed {
                apply_status(ctx, actor, target, status, outcome);
            }
        }
        SkillEffect::Taunt { turns } => {
            if !dodged(ctx, actor, target, outcome) {
                let taunt = StatusApplication {
                    kind: StatusKind::Taunted,
                    magnitude: 0.0,
                    turns,
                };
                apply_status(ctx, actor, target, taunt, outcome);
            }
        }
        SkillEffect::Heal { power } => {
            let attack = ctx
                .roster
                .get(actor)
                .map_or(0.0, |healer| healer.effective_attack());
            heal(ctx, actor, target, attack * power * timing.unwrap_or(1.0), outcome);
        }
        SkillEffect::Buff { status } => apply_status(ctx, actor, target, status, outcome),
    }
}

/// Step 2: rolls the target's dodge. Logs and records a dodge.
fn dodged(
    ctx: &mut ResolveContext<'_>,
    actor: CombatantId,
    target: CombatantId,
    outcome: &mut ActionOutcome,
) -> bool {
    let chance = match (ctx.roster.get(actor), ctx.roster.get(target)) {
        (Some(attacker), Some(defender)) => formula::dodge_chance(
            defender.evasion(ctx.weather, ctx.config),
            attacker.accuracy(ctx.weather),
        ),
        _ => return false,
    };
    if !ctx.rng.roll(chance) {
        return false;
    }

    if let Some(defender) = ctx.roster.get_mut(target) {
        defender.meter.gain(MeterReason::Dodge, &ctx.config.meters);
    }
    ctx.log.record(EventKind::Dodged {
        source: actor,
        target,
    });
    ctx.log.effect(EffectCue::Dodge, target, 0.0);
    outcome.hits.push(HitRecord {
        source: actor,
        target,
        kind: HitKind::Dodged,
    });
    true
}

/// Steps 2 through 11 for one damaging strike.
fn strike(
    ctx: &mut ResolveContext<'_>,
    actor: CombatantId,
    target: CombatantId,
    power: f64,
    timing: Option<f64>,
    allow_counter: bool,
    outcome: &mut ActionOutcome,
) -> Strike {
    if dodged(ctx, actor, target, outcome) {
        return Strike::Dodged;
    }

    // Steps 3-7 read a snapshot of both combatants.
    let (magnitude, crit_chance, crit_damage, can_block, defense) =
        match (ctx.roster.get(actor), ctx.roster.get(target)) {
            (Some(attacker), Some(defender)) => {
                let family = attacker.family();
                let modifiers = StrikeModifiers {
                    advantage: ctx.config.advantage(family, defender.family()),
                    timing: timing.unwrap_or(1.0),
                    weather: ctx.weather.damage_multiplier
                        * ctx.weather.for_family(family).damage_multiplier,
                    morale: attacker
                        .morale_tier(ctx.config)
                        .damage_multiplier(&ctx.config.morale),
                    meter: attacker.meter_bonuses(ctx.config).damage_multiplier,
                    status: attacker.status_damage_multiplier(),
                };
                (
                    formula::base_magnitude(attacker.effective_attack(), power, &modifiers),
                    attacker.crit_chance(ctx.weather, ctx.config),
                    attacker.stats.crit_damage,
                    defender.capabilities.contains(Capabilities::BLOCK),
                    defender.effective_defense(ctx.weather, ctx.config),
                )
            }
            _ => return Strike::Void,
        };

    // Step 9 rolls come before the crit roll.
    let mitigation = ctx.config.mitigation;
    let mut magnitude = magnitude;
    let blocked = can_block && ctx.rng.roll(mitigation.block_chance);
    if blocked {
        magnitude = formula::apply_block(magnitude, mitigation.block_reduction);
        ctx.log.effect(EffectCue::Block, target, magnitude);
        if allow_counter && ctx.rng.roll(mitigation.counter_chance) {
            ctx.log.record(EventKind::Countered {
                source: target,
                target: actor,
            });
            outcome.hits.push(HitRecord {
                source: target,
                target: actor,
                kind: HitKind::Counter,
            });
            strike(ctx, target, actor, 1.0, None, false, outcome);
            if !ctx.roster.is_alive(actor) {
                debug!(%actor, "attacker fell to the counter");
                return Strike::Void;
            }
        }
    }

    // Step 8
    let critical = ctx.rng.roll(crit_chance);
    if critical {
        magnitude = formula::apply_crit(magnitude, crit_damage);
    }
    let damage = formula::mitigate(magnitude, defense, mitigation.minimum_damage);

    // Step 10
    let tuning = &ctx.config.meters;
    let Some(defender) = ctx.roster.get_mut(target) else {
        return Strike::Void;
    };
    let amount = defender.take_damage(damage);
    let hp_after = defender.hp();
    let fell = !defender.is_alive();
    let defender_side = defender.side;
    let taunter = defender.taunted_by();
    defender.meter.gain(MeterReason::Hit, tuning);
    defender.adjust_morale(-ctx.config.morale.on_hit, ctx.config.morale.max);

    ctx.log.record(EventKind::Damaged {
        source: actor,
        target,
        amount,
        critical,
        blocked,
        hp_after,
    });
    ctx.log.effect(
        if critical {
            EffectCue::Critical
        } else {
            EffectCue::Hit
        },
        target,
        amount,
    );
    outcome.hits.push(HitRecord {
        source: actor,
        target,
        kind: HitKind::Damage {
            amount,
            critical,
            blocked,
        },
    });

    if let Some(attacker) = ctx.roster.get_mut(actor) {
        attacker.meter.gain(MeterReason::Attack, tuning);
        if attacker.last_target == Some(target) {
            attacker.meter.gain(MeterReason::ContinuousHit, tuning);
        }
        if critical {
            attacker.meter.gain(MeterReason::Crit, tuning);
        }
        if fell {
            attacker.meter.gain(MeterReason::Kill, tuning);
        }
        attacker.last_target = Some(target);
        attacker.adjust_morale(ctx.config.morale.on_deal, ctx.config.morale.max);
    }

    let guardians: Vec<CombatantId> = ctx
        .roster
        .living_on(defender_side)
        .filter(|c| c.id != target && c.meter.kind() == MeterKind::Threat)
        .map(|c| c.id)
        .collect();
    for id in guardians {
        if let Some(guardian) = ctx.roster.get_mut(id) {
            guardian.meter.gain(MeterReason::AllyHit, tuning);
        }
    }

    // Step 11
    if fell {
        ctx.log.record(EventKind::Defeated {
            target,
            by: Some(actor),
        });
        ctx.log.effect(EffectCue::Defeat, target, 0.0);
        outcome.defeated.push(target);
        if let Some(holder) = taunter.and_then(|id| ctx.roster.get_mut(id)) {
            holder.meter.release_taunt();
        }
    }
    fire_taunts(ctx, defender_side, outcome);

    Strike::Landed { amount }
}

/// Applies armed threat triggers on `side` to the strongest living enemy.
pub(crate) fn fire_taunts(ctx: &mut ResolveContext<'_>, side: Side, outcome: &mut ActionOutcome) {
    let holders: Vec<CombatantId> = ctx.roster.living_on(side).map(|c| c.id).collect();
    for holder in holders {
        let trigger = ctx
            .roster
            .get_mut(holder)
            .and_then(|c| c.meter.take_trigger());
        let Some(MeterTrigger::Taunt { turns }) = trigger else {
            continue;
        };

        let Some(target) = ctx.roster.strongest_on(side.opposite()).map(|c| c.id) else {
            if let Some(c) = ctx.roster.get_mut(holder) {
                c.meter.release_taunt();
            }
            continue;
        };
        debug!(%holder, %target, "threat taunt triggered");
        ctx.log.record(EventKind::TauntActivated { holder, target });
        let taunt = StatusApplication {
            kind: StatusKind::Taunted,
            magnitude: 0.0,
            turns,
        };
        apply_status(ctx, holder, target, taunt, outcome);
    }
}

fn apply_status(
    ctx: &mut ResolveContext<'_>,
    source: CombatantId,
    target: CombatantId,
    application: StatusApplication,
    outcome: &mut ActionOutcome,
) {
    let Some(holder) = ctx.roster.get_mut(target) else {
        return;
    };
    if !holder.is_alive() {
        return;
    }
    let added = holder.status.add(StatusEffect {
        kind: application.kind,
        remaining: application.turns,
        magnitude: application.magnitude,
        source: Some(source),
    });
    if !added {
        debug!(%target, status = %application.kind, "status list full");
        return;
    }

    ctx.log.record(EventKind::StatusApplied {
        target,
        status: application.kind,
        magnitude: application.magnitude,
        turns: application.turns,
    });
    let cue = match application.kind {
        StatusKind::Taunted => EffectCue::Taunt,
        kind if kind.is_buff() => EffectCue::Buff,
        _ => EffectCue::Debuff,
    };
    ctx.log.effect(cue, target, application.magnitude);
    outcome.hits.push(HitRecord {
        source,
        target,
        kind: HitKind::Status {
            kind: application.kind,
        },
    });
}

fn heal(
    ctx: &mut ResolveContext<'_>,
    source: CombatantId,
    target: CombatantId,
    amount: f64,
    outcome: &mut ActionOutcome,
) {
    let Some(patient) = ctx.roster.get_mut(target) else {
        return;
    };
    let healed = patient.heal(amount);
    let hp_after = patient.hp();
    ctx.log.record(EventKind::Healed {
        source,
        target,
        amount: healed,
        hp_after,
    });
    ctx.log.effect(EffectCue::Heal, target, healed);
    outcome.hits.push(HitRecord {
        source,
        target,
        kind: HitKind::Heal { amount: healed },
    });
}

/// Cooldown, meter cost, morale cost and the skill's own meter gain.
fn pay_costs(
    ctx: &mut ResolveContext<'_>,
    actor: CombatantId,
    skill: &SkillId,
    outcome: &mut ActionOutcome,
) {
    let Some(def) = ctx.skills.get(skill) else {
        return;
    };
    let Some(user) = ctx.roster.get_mut(actor) else {
        return;
    };
    user.set_cooldown(skill.clone(), def.cooldown);
    user.meter.spend(def.meter_cost, &ctx.config.meters);
    user.adjust_morale(-def.morale_cost, ctx.config.morale.max);
    if def.meter_gain != 0.0 {
        user.meter.gain(def.meter_gain, &ctx.config.meters);
    }
    let side = user.side;
    fire_taunts(ctx, side, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Archetype, CombatStats, Combatant, Roster};
    use crate::config::BattleConfig;
    use crate::event::BattleLog;
    use crate::rng::BattleRng;
    use crate::skill::{SkillBook, SkillDef, TargetMode};
    use crate::weather::WeatherSnapshot;

    fn stats(attack: f64, defense: f64) -> CombatStats {
        CombatStats {
            max_hp: 200.0,
            attack,
            defense,
            speed: 10.0,
            crit_chance: 0.0,
            crit_damage: 1.5,
            dodge_chance: 0.0,
        }
    }

    /// Config with every random mitigation disabled.
    fn calm_config() -> BattleConfig {
        let mut config = BattleConfig::default();
        config.mitigation.block_chance = 0.0;
        config.mitigation.counter_chance = 0.0;
        config.morale.high_crit_bonus = 0.0;
        config
    }

    struct Fixture {
        roster: Roster,
        skills: SkillBook,
        config: BattleConfig,
        weather: WeatherSnapshot,
        rng: BattleRng,
        log: BattleLog,
    }

    impl Fixture {
        fn new(roster: Vec<Combatant>) -> Self {
            Self {
                roster: Roster::new(roster),
                skills: SkillBook::standard(),
                config: calm_config(),
                weather: WeatherSnapshot::clear(),
                rng: BattleRng::new(7),
                log: BattleLog::new(),
            }
        }

        fn run(&mut self, request: &ActionRequest, timing: Option<f64>) -> Result<ActionOutcome, ActionError> {
            let mut ctx = ResolveContext {
                roster: &mut self.roster,
                skills: &self.skills,
                config: &self.config,
                weather: &self.weather,
                rng: &mut self.rng,
                log: &mut self.log,
            };
            resolve(&mut ctx, request, timing)
        }

        fn get(&self, id: u32) -> &Combatant {
            self.roster.get(CombatantId(id)).unwrap()
        }
    }

    fn warrior(attack: f64) -> Combatant {
        Combatant::new("Blade", Side::Player, Archetype::Warrior, stats(attack, 5.0))
            .with_morale(50.0, 100.0)
            .with_skills(SkillBook::standard_loadout(Archetype::Warrior))
    }

    fn tanker(defense: f64) -> Combatant {
        Combatant::new("Wall", Side::Enemy, Archetype::Tanker, stats(30.0, defense))
            .with_morale(50.0, 100.0)
    }

    #[test]
    fn defense_reduces_base_magnitude() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();

        assert_eq!(outcome.damage_to(CombatantId(1)), 30.0);
        assert_eq!(fx.get(1).hp(), 170.0);
        assert_eq!(fx.get(1).meter.value(), 10.0);
        assert_eq!(fx.get(0).meter.value(), 10.0);
    }

    #[test]
    fn full_rage_quadruples_damage() {
        let mut berserker = warrior(10.0);
        // Rage adds crit chance; a neutral crit keeps the result exact.
        berserker.stats.crit_damage = 1.0;
        let mut fx = Fixture::new(vec![berserker, tanker(0.0)]);
        fx.roster
            .get_mut(CombatantId(0))
            .unwrap()
            .meter
            .gain(100.0, &fx.config.meters);
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();
        assert!((outcome.damage_to(CombatantId(1)) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn timing_multiplier_scales_damage() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        let outcome = fx
            .run(
                &ActionRequest::attack(CombatantId(0), CombatantId(1)),
                Some(1.5),
            )
            .unwrap();
        assert_eq!(outcome.damage_to(CombatantId(1)), 55.0);
    }

    #[test]
    fn rejected_request_changes_nothing() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        let before = fx.roster.clone();
        let error = fx
            .run(
                &ActionRequest::skill(CombatantId(0), "frenzy", Vec::new()),
                None,
            )
            .unwrap_err();
        assert!(matches!(error, ActionError::InsufficientMeter { .. }));
        assert_eq!(fx.roster, before);
        assert!(matches!(
            fx.log.events().last().unwrap().kind,
            EventKind::ActionRejected { .. }
        ));
    }

    #[test]
    fn attacking_an_ally_is_rejected() {
        let mut fx = Fixture::new(vec![warrior(50.0), warrior(40.0), tanker(20.0)]);
        assert_eq!(
            fx.run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None),
            Err(ActionError::InvalidTarget(CombatantId(1)))
        );
    }

    #[test]
    fn skill_sets_cooldown_and_spends_morale() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        let request = ActionRequest::skill(CombatantId(0), "charge_slash", vec![CombatantId(1)]);
        let outcome = fx.run(&request, None).unwrap();
        // 50 × 1.3 - 20
        assert!((outcome.damage_to(CombatantId(1)) - 45.0).abs() < 1e-9);

        let blade = fx.get(0);
        assert_eq!(blade.cooldown(&SkillId::from("charge_slash")), 5);
        // 50 - 25 cost + 2 for the hit
        assert_eq!(blade.morale(), 27.0);
        // attack gain 10 + explicit gain 20
        assert_eq!(blade.meter.value(), 30.0);

        assert!(matches!(
            fx.run(&request, None),
            Err(ActionError::OnCooldown { remaining: 5, .. })
        ));
    }

    #[test]
    fn certain_dodge_avoids_damage_and_builds_focus() {
        let mut ranger = Combatant::new("Bow", Side::Enemy, Archetype::Ranger, stats(30.0, 0.0));
        ranger.stats.dodge_chance = 1.0;
        let mut fx = Fixture::new(vec![warrior(50.0), ranger]);
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();
        assert_eq!(outcome.hits[0].kind, HitKind::Dodged);
        assert_eq!(fx.get(1).hp(), 200.0);
        assert_eq!(fx.get(1).meter.value(), 20.0);
    }

    #[test]
    fn certain_block_halves_and_counters_once() {
        let mut fx = Fixture::new(vec![warrior(60.0), tanker(10.0)]);
        fx.config.mitigation.block_chance = 1.0;
        fx.config.mitigation.counter_chance = 1.0;
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();

        // 60 × 0.5 - 10
        assert_eq!(outcome.damage_to(CombatantId(1)), 20.0);
        // counter: 30 - 5 against the warrior, which cannot block back
        assert_eq!(outcome.damage_to(CombatantId(0)), 25.0);
        let counters = outcome
            .hits
            .iter()
            .filter(|hit| hit.kind == HitKind::Counter)
            .count();
        assert_eq!(counters, 1);
    }

    #[test]
    fn attacker_killed_by_counter_lands_nothing() {
        let mut fx = Fixture::new(vec![warrior(60.0), tanker(10.0)]);
        fx.config.mitigation.block_chance = 1.0;
        fx.config.mitigation.counter_chance = 1.0;
        fx.roster.get_mut(CombatantId(0)).unwrap().take_damage(195.0);

        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();

        assert!(!fx.get(0).is_alive());
        assert_eq!(outcome.defeated, vec![CombatantId(0)]);
        assert_eq!(outcome.damage_to(CombatantId(1)), 0.0);
        assert_eq!(fx.get(1).hp(), 200.0);
        // 50 - 3 for the counter, no gain for dealing damage
        assert_eq!(fx.get(0).morale(), 47.0);
        assert!(!fx
            .log
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::Damaged { target, .. } if target == CombatantId(1))));
    }

    #[test]
    fn weather_multipliers_scale_damage() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        fx.weather.damage_multiplier = 1.2;
        fx.weather.warrior.damage_multiplier = 1.5;
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();
        // 50 × 1.2 × 1.5 - 20
        assert!((outcome.damage_to(CombatantId(1)) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn weather_defense_adds_to_the_target() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        fx.weather.defense_mod = 5.0;
        fx.weather.tank.defense = 5.0;
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();
        // 50 - (20 + 5 + 5)
        assert_eq!(outcome.damage_to(CombatantId(1)), 20.0);
    }

    #[test]
    fn weather_hit_rate_moves_the_dodge_roll() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        fx.weather.hit_rate_mod = -1.0;
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();
        assert_eq!(outcome.hits[0].kind, HitKind::Dodged);
        assert_eq!(fx.get(1).hp(), 200.0);

        let mut ranger = Combatant::new("Bow", Side::Enemy, Archetype::Ranger, stats(30.0, 0.0));
        ranger.stats.dodge_chance = 0.6;
        let mut fx = Fixture::new(vec![warrior(50.0), ranger]);
        fx.weather.hit_rate_mod = 0.4;
        fx.weather.warrior.hit_rate = 0.2;
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();
        assert!(outcome.damage_to(CombatantId(1)) > 0.0);
    }

    #[test]
    fn drain_heals_by_ratio_of_damage_dealt() {
        let mut fx = Fixture::new(vec![
            warrior(50.0).with_skills(vec![SkillId::from("leech")]),
            tanker(20.0),
        ]);
        fx.skills.insert(SkillDef::new(
            "leech",
            "Leech",
            SkillEffect::Drain {
                power: 1.0,
                ratio: 0.5,
            },
            TargetMode::SingleEnemy,
        ));
        fx.roster.get_mut(CombatantId(0)).unwrap().take_damage(100.0);

        let outcome = fx
            .run(
                &ActionRequest::skill(CombatantId(0), "leech", vec![CombatantId(1)]),
                None,
            )
            .unwrap();

        assert_eq!(outcome.damage_to(CombatantId(1)), 30.0);
        assert!(outcome
            .hits
            .iter()
            .any(|hit| hit.target == CombatantId(0) && hit.kind == HitKind::Heal { amount: 15.0 }));
        assert_eq!(fx.get(0).hp(), 115.0);
    }

    #[test]
    fn lethal_hit_logs_defeat_and_feeds_focus() {
        let ranger = Combatant::new("Bow", Side::Player, Archetype::Ranger, stats(500.0, 0.0))
            .with_morale(50.0, 100.0);
        let mut fx = Fixture::new(vec![ranger, tanker(0.0)]);
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();
        assert_eq!(outcome.defeated, vec![CombatantId(1)]);
        assert!(!fx.get(1).is_alive());
        assert_eq!(fx.get(0).meter.value(), 30.0);
        assert!(fx
            .log
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::Defeated { target, .. } if target == CombatantId(1))));
    }

    #[test]
    fn repeated_target_builds_continuous_focus() {
        let ranger = Combatant::new("Bow", Side::Player, Archetype::Ranger, stats(10.0, 0.0))
            .with_morale(50.0, 100.0);
        let mut fx = Fixture::new(vec![ranger, tanker(0.0)]);
        let attack = ActionRequest::attack(CombatantId(0), CombatantId(1));
        fx.run(&attack, None).unwrap();
        assert_eq!(fx.get(0).meter.value(), 0.0);
        fx.run(&attack, None).unwrap();
        assert_eq!(fx.get(0).meter.value(), 15.0);
    }

    #[test]
    fn threat_crossing_threshold_taunts_strongest_enemy() {
        let guard = Combatant::new("Wall", Side::Player, Archetype::Tanker, stats(30.0, 10.0))
            .with_morale(50.0, 100.0);
        let weak = Combatant::new("Imp", Side::Enemy, Archetype::Warrior, stats(20.0, 0.0))
            .with_morale(50.0, 100.0);
        let strong = Combatant::new("Ogre", Side::Enemy, Archetype::Warrior, stats(45.0, 0.0))
            .with_morale(50.0, 100.0);
        let mut fx = Fixture::new(vec![guard, weak, strong]);
        fx.roster
            .get_mut(CombatantId(0))
            .unwrap()
            .meter
            .gain(75.0, &fx.config.meters);

        fx.run(&ActionRequest::attack(CombatantId(1), CombatantId(0)), None)
            .unwrap();

        assert_eq!(fx.get(2).taunted_by(), Some(CombatantId(0)));
        assert!(fx.get(1).taunted_by().is_none());
        assert!(fx
            .log
            .events()
            .iter()
            .any(|e| matches!(e.kind, EventKind::TauntActivated { .. })));
    }

    #[test]
    fn defend_raises_defense() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        fx.run(&ActionRequest::defend(CombatantId(1)), None).unwrap();
        assert!(fx.get(1).status.has(StatusKind::DefenseUp));
        let outcome = fx
            .run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None)
            .unwrap();
        // 50 - 20 × 1.5
        assert_eq!(outcome.damage_to(CombatantId(1)), 20.0);
    }

    #[test]
    fn heal_is_capped_at_max_hp() {
        let knight = Combatant::new("Sir", Side::Player, Archetype::Knight, stats(50.0, 10.0))
            .with_skills(SkillBook::standard_loadout(Archetype::Knight));
        let mut fx = Fixture::new(vec![knight, warrior(40.0), tanker(10.0)]);
        fx.roster.get_mut(CombatantId(1)).unwrap().take_damage(20.0);
        let outcome = fx
            .run(
                &ActionRequest::skill(CombatantId(0), "mend", vec![CombatantId(1)]),
                None,
            )
            .unwrap();
        assert_eq!(outcome.hits[0].kind, HitKind::Heal { amount: 20.0 });
        assert_eq!(fx.get(1).hp(), 200.0);
    }

    #[test]
    fn stunned_actor_cannot_act() {
        let mut fx = Fixture::new(vec![warrior(50.0), tanker(20.0)]);
        fx.roster.get_mut(CombatantId(0)).unwrap().status.add(StatusEffect {
            kind: StatusKind::Stunned,
            remaining: 1,
            magnitude: 0.0,
            source: None,
        });
        assert_eq!(
            fx.run(&ActionRequest::attack(CombatantId(0), CombatantId(1)), None),
            Err(ActionError::ActorIncapacitated(CombatantId(0)))
        );
    }
}
