//! One headless battle, from team rolls to the final report.
use anyhow::{Result, bail};
use battle_content::{Content, TeamBuilder};
use battle_core::{
    ActionRequest, Archetype, BattleController, BattleEvent, BattleOutcome, BattleRng, CombatantId,
    Control, Difficulty, Rewards, Side, TickStatus, WeatherKind,
};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::autopilot::{Autopilot, Grade};

/// Fixed timestep fed to the controller.
pub const DT: f64 = 1.0 / 60.0;

/// Waves divisible by this spawn the boss.
const BOSS_EVERY: u32 = 5;

#[derive(Clone, Debug)]
pub struct SimOptions {
    pub seed: u64,
    pub wave: u32,
    pub difficulty: Difficulty,
    pub weather: WeatherKind,
    /// Autopilot grade for a player-controlled party; `None` is an auto battle.
    pub grade: Option<Grade>,
    /// Let the party open its turns with a team combo when one is ready.
    pub combos: bool,
    pub max_ticks: u64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            wave: 1,
            difficulty: Difficulty::Normal,
            weather: WeatherKind::Clear,
            grade: Some(Grade::Perfect),
            combos: false,
            max_ticks: 200_000,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub seed: u64,
    pub wave: u32,
    pub difficulty: Difficulty,
    pub weather: WeatherKind,
    pub outcome: BattleOutcome,
    pub rewards: Option<Rewards>,
    pub ticks: u64,
    pub events: Vec<BattleEvent>,
}

/// Enemy lineup for a wave; later waves face the evolved archetypes.
fn enemy_lineup(wave: u32) -> &'static [Archetype] {
    match wave {
        0..=2 => &[Archetype::Tanker, Archetype::Warrior, Archetype::Ranger],
        3..=4 => &[Archetype::Knight, Archetype::Warrior, Archetype::Witch],
        _ => &[Archetype::Knight, Archetype::Samurai, Archetype::LeafRanger],
    }
}

/// Plays one battle to the end.
///
/// With a grade the party is player-controlled: turns take the AI's
/// suggestion and the autopilot answers timing challenges. Without one the
/// party is AI-controlled end to end.
pub fn run(content: &Content, options: &SimOptions) -> Result<Report> {
    let profile = content.difficulty.profile(options.difficulty);
    let builder = TeamBuilder::new(&content.archetypes, &content.config);
    let mut rng = BattleRng::new(options.seed);

    let mut combatants = builder.party(
        &[Archetype::Tanker, Archetype::Warrior, Archetype::Ranger],
        if options.grade.is_some() {
            Control::Player
        } else {
            Control::Ai
        },
        &mut rng,
    );
    combatants.extend(builder.enemies(enemy_lineup(options.wave), &profile, &mut rng));
    let boss_wave = options.wave > 0 && options.wave % BOSS_EVERY == 0;
    if boss_wave {
        combatants.extend(builder.boss(&profile, &mut rng));
    }
    debug!(combatants = combatants.len(), boss_wave, "teams rolled");

    let setup = content
        .battle_setup(combatants, options.seed)
        .with_difficulty(profile)
        .with_weather(content.weather.snapshot(options.weather))
        .with_wave(options.wave, boss_wave);
    let mut controller = BattleController::new(setup);
    controller.start()?;

    let mut pilot = Autopilot::new(options.grade.unwrap_or_default(), &controller.config().timing);
    let mut combo_tried_on: Option<u32> = None;

    for tick in 0..options.max_ticks {
        match controller.tick(DT) {
            TickStatus::Ended(outcome) => {
                info!(%outcome, ticks = tick + 1, "battle finished");
                return Ok(Report {
                    seed: options.seed,
                    wave: options.wave,
                    difficulty: options.difficulty,
                    weather: options.weather,
                    outcome,
                    rewards: controller.rewards().cloned(),
                    ticks: tick + 1,
                    events: controller.event_log().to_vec(),
                });
            }
            TickStatus::AwaitingInput { actor } => {
                let turn = controller.state().turn;
                if options.combos && combo_tried_on != Some(turn) && !controller.combo().is_active() {
                    combo_tried_on = Some(turn);
                    if try_combo(&mut controller, &mut pilot) {
                        continue;
                    }
                }
                if !controller.combo().is_active() {
                    player_turn(&mut controller, &mut pilot, actor)?;
                }
            }
            TickStatus::Idle
            | TickStatus::AwaitingTiming { .. }
            | TickStatus::AwaitingCombo { .. }
            | TickStatus::Progressed => {}
        }

        feed(&mut controller, &mut pilot);
        for command in controller.drain_commands() {
            trace!(?command, "command");
        }
    }

    bail!("battle did not finish within {} ticks", options.max_ticks)
}

/// Submits the AI's suggestion for a party member and schedules the
/// timing inputs it needs.
fn player_turn(controller: &mut BattleController, pilot: &mut Autopilot, actor: CombatantId) -> Result<()> {
    let request = controller.ai_suggestion(actor);
    match controller.submit_action(request) {
        Ok(TickStatus::AwaitingTiming { kind, .. }) => {
            let qte = controller.qte();
            if let (Some(definition), Some(started_at)) = (qte.definition(kind), qte.started_at()) {
                pilot.plan_qte(definition, started_at);
            }
        }
        Ok(_) => {}
        Err(error) => {
            warn!(%actor, %error, "suggested action refused, waiting instead");
            controller.submit_action(ActionRequest::wait(actor))?;
        }
    }
    Ok(())
}

/// Starts the first combo the party can perform. Returns true when one started.
fn try_combo(controller: &mut BattleController, pilot: &mut Autopilot) -> bool {
    let ready = {
        let roster = controller.roster();
        controller.combo().definitions().iter().map(|d| d.pair).find(|pair| {
            pair.families().into_iter().all(|family| {
                roster
                    .living_on(Side::Player)
                    .find(|c| c.family() == family)
                    .is_some_and(|c| c.combo_cooldown == 0)
            })
        })
    };
    let Some(pair) = ready else {
        return false;
    };
    if controller.start_combo(pair, Side::Player).is_err() {
        return false;
    }

    let combo = controller.combo();
    if let (Some(definition), Some(started_at)) = (combo.active_definition(), combo.started_at()) {
        pilot.plan_combo(definition, started_at);
    }
    true
}

/// Delivers the autopilot's inputs that are due on the battle clock.
fn feed(controller: &mut BattleController, pilot: &mut Autopilot) {
    if !controller.qte().is_active() && !controller.combo().is_active() {
        pilot.clear();
        return;
    }
    if pilot.is_idle() {
        return;
    }
    for event in pilot.due(controller.clock()) {
        if !controller.qte().is_active() && !controller.combo().is_active() {
            break;
        }
        controller.handle_input(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_content::ContentFactory;
    use battle_core::EventKind;
    use std::path::PathBuf;

    fn content() -> Content {
        let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data");
        ContentFactory::new(data).load_all().unwrap()
    }

    #[test]
    fn same_options_same_report() {
        let content = content();
        let options = SimOptions {
            seed: 42,
            combos: true,
            ..SimOptions::default()
        };
        let first = run(&content, &options).unwrap();
        let second = run(&content, &options).unwrap();

        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.ticks, second.ticks);
        assert_eq!(first.events, second.events);
    }

    #[test]
    fn perfect_pilot_earns_perfect_ratings() {
        let report = run(&content(), &SimOptions::default()).unwrap();
        let ratings: Vec<_> = report
            .events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::QteResolved { rating, .. } => Some(*rating),
                _ => None,
            })
            .collect();
        assert!(!ratings.is_empty());
        assert!(ratings.iter().all(|r| r.is_success()));
    }

    #[test]
    fn boss_waves_spawn_the_boss() {
        let options = SimOptions {
            seed: 9,
            wave: 5,
            difficulty: Difficulty::Easy,
            ..SimOptions::default()
        };
        let report = run(&content(), &options).unwrap();
        match &report.events[0].kind {
            EventKind::BattleStarted { wave, combatants } => {
                assert_eq!(*wave, 5);
                assert_eq!(*combatants, 7);
            }
            other => panic!("first event was {other:?}"),
        }
    }

    #[test]
    fn missing_pilot_still_finishes() {
        let options = SimOptions {
            seed: 3,
            grade: Some(Grade::Miss),
            combos: true,
            ..SimOptions::default()
        };
        let report = run(&content(), &options).unwrap();
        assert!(matches!(report.outcome, BattleOutcome::Victory | BattleOutcome::Defeat));
    }

    #[test]
    fn auto_battle_needs_no_input() {
        let options = SimOptions {
            seed: 11,
            grade: None,
            ..SimOptions::default()
        };
        let report = run(&content(), &options).unwrap();
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::QteStarted { .. } | EventKind::InputIgnored)));
    }
}
