use battle_core::{
    Archetype, BattleConfig, BattleController, BattleEvent, BattleSetup, CombatStats, Combatant,
    CombatantId, Control, EventKind, InputEvent, Key, QteDefinition, QteKind, QteManager,
    QteRating, Roster, Side, SkillBook, TickStatus, TurnScheduler, WeatherKind, WeatherSnapshot,
};

const DT: f64 = 1.0 / 60.0;
const TICK_LIMIT: usize = 200_000;

fn unit(name: &str, side: Side, archetype: Archetype, speed: f64) -> Combatant {
    let stats = CombatStats {
        max_hp: 120.0,
        attack: 18.0,
        defense: 6.0,
        speed,
        crit_chance: 0.1,
        crit_damage: 1.5,
        dodge_chance: 0.05,
    };
    Combatant::new(name, side, archetype, stats)
        .with_skills(SkillBook::standard_loadout(archetype))
        .with_control(Control::Ai)
}

fn auto_battle(seed: u64) -> BattleController {
    let combatants = vec![
        unit("Wall", Side::Player, Archetype::Knight, 9.0),
        unit("Blade", Side::Player, Archetype::Samurai, 12.0),
        unit("Bow", Side::Player, Archetype::LeafRanger, 14.0),
        unit("Ogre", Side::Enemy, Archetype::Tanker, 8.0),
        unit("Orc", Side::Enemy, Archetype::Warrior, 12.0),
        unit("Hag", Side::Enemy, Archetype::Witch, 11.0),
    ];
    let setup = BattleSetup::new(combatants, seed).with_weather(WeatherSnapshot::preset(WeatherKind::Rain));
    let mut controller = BattleController::new(setup);
    controller.start().unwrap();
    controller
}

/// Runs until the battle ends, checking `each` after every tick.
fn run_to_end(controller: &mut BattleController, mut each: impl FnMut(&BattleController)) {
    for _ in 0..TICK_LIMIT {
        let status = controller.tick(DT);
        each(controller);
        if matches!(status, TickStatus::Ended(_)) {
            return;
        }
    }
    panic!("battle did not finish within {TICK_LIMIT} ticks");
}

fn event_kinds(log: &[BattleEvent]) -> Vec<EventKind> {
    log.iter().map(|e| e.kind.clone()).collect()
}

#[test]
fn same_seed_replays_the_same_log() {
    let mut first = auto_battle(2024);
    let mut second = auto_battle(2024);
    run_to_end(&mut first, |_| {});
    run_to_end(&mut second, |_| {});

    assert!(first.outcome().is_some());
    assert_eq!(first.outcome(), second.outcome());
    assert_eq!(first.event_log(), second.event_log());
    assert_eq!(first.rewards(), second.rewards());
}

#[test]
fn different_seeds_diverge() {
    let mut first = auto_battle(1);
    let mut second = auto_battle(2);
    run_to_end(&mut first, |_| {});
    run_to_end(&mut second, |_| {});
    assert_ne!(event_kinds(first.event_log()), event_kinds(second.event_log()));
}

#[test]
fn hp_meters_and_morale_stay_in_bounds() {
    let mut controller = auto_battle(77);
    let max_morale = BattleConfig::default().morale.max;
    run_to_end(&mut controller, |controller| {
        for combatant in controller.roster().iter() {
            assert!(combatant.hp() >= 0.0 && combatant.hp() <= combatant.stats.max_hp);
            assert!(combatant.meter.value() >= 0.0);
            assert!(combatant.meter.value() <= combatant.meter.max());
            assert!(combatant.morale() >= 0.0 && combatant.morale() <= max_morale);
        }
    });
}

#[test]
fn dead_combatants_never_take_turns() {
    let mut controller = auto_battle(5);
    run_to_end(&mut controller, |_| {});

    let mut fallen: Vec<CombatantId> = Vec::new();
    for event in controller.event_log() {
        match &event.kind {
            EventKind::Defeated { target, .. } => fallen.push(*target),
            EventKind::TurnStarted { actor } => assert!(!fallen.contains(actor)),
            EventKind::ActionUsed { actor, .. } => assert!(!fallen.contains(actor)),
            _ => {}
        }
    }
}

#[test]
fn turns_follow_the_round_order() {
    let mut controller = auto_battle(31);
    run_to_end(&mut controller, |_| {});

    let mut order: Vec<CombatantId> = Vec::new();
    let mut position = 0;
    for event in controller.event_log() {
        match &event.kind {
            EventKind::RoundStarted { order: next, .. } => {
                order = next.clone();
                position = 0;
            }
            EventKind::TurnStarted { actor } => {
                let index = order[position..]
                    .iter()
                    .position(|id| id == actor)
                    .map(|offset| position + offset)
                    .expect("turn outside the round order");
                position = index + 1;
            }
            _ => {}
        }
    }
}

#[test]
fn round_order_is_sorted_by_speed_with_stable_ties() {
    let roster = Roster::new(vec![
        unit("a", Side::Player, Archetype::Tanker, 10.0),
        unit("b", Side::Player, Archetype::Warrior, 14.0),
        unit("c", Side::Enemy, Archetype::Ranger, 10.0),
        unit("d", Side::Enemy, Archetype::Witch, 3.0),
    ]);
    let weather = WeatherSnapshot::clear();
    let mut scheduler = TurnScheduler::new();
    let order = scheduler.start_round(&roster, &weather).to_vec();

    assert_eq!(
        order,
        vec![CombatantId(1), CombatantId(0), CombatantId(2), CombatantId(3)]
    );
    let speeds: Vec<f64> = order
        .iter()
        .map(|id| roster.get(*id).unwrap().effective_speed(&weather))
        .collect();
    assert!(speeds.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn qte_timeout_resolves_exactly_once() {
    let mut qte = QteManager::new(QteDefinition::standard(), BattleConfig::default().timing);
    let actor = unit("Bow", Side::Player, Archetype::Ranger, 10.0);
    qte.trigger(QteKind::Sequence, &actor).unwrap();

    let mut outcomes = Vec::new();
    for _ in 0..200 {
        outcomes.extend(qte.tick(DT));
    }
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].rating, QteRating::Miss);

    let late = InputEvent::KeyDown {
        key: Key::Q,
        at: qte.clock(),
    };
    assert!(qte.submit_input(&late).is_none());
    assert!(qte.cancel().is_none());
}

#[test]
fn only_one_timing_session_at_a_time() {
    let mut qte = QteManager::new(QteDefinition::standard(), BattleConfig::default().timing);
    let first = unit("Wall", Side::Player, Archetype::Tanker, 10.0);
    let second = unit("Blade", Side::Player, Archetype::Warrior, 10.0);

    qte.trigger(QteKind::Hold, &first).unwrap();
    assert!(qte.trigger(QteKind::Press, &second).is_err());
    assert_eq!(qte.active_actor(), Some(first.id));
    assert_eq!(qte.active_kind(), Some(QteKind::Hold));
}
