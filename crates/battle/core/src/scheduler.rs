//! Round-based turn order.
//!
//! At each round start the living combatants are sorted by effective speed,
//! fastest first, keeping roster order between equals. Combatants that die
//! mid-round keep their slot but are skipped when the cursor reaches them.
use crate::combatant::{CombatantId, Roster, Side};
use crate::config::RewardTuning;
use crate::state::{BattleOutcome, Rewards};
use crate::weather::WeatherSnapshot;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnScheduler {
    order: Vec<CombatantId>,
    cursor: usize,
    round: u32,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the order for the next round and returns it.
    pub fn start_round(&mut self, roster: &Roster, weather: &WeatherSnapshot) -> &[CombatantId] {
        let mut living: Vec<(CombatantId, f64)> = roster
            .living()
            .map(|c| (c.id, c.effective_speed(weather)))
            .collect();
        // sort_by is stable, so ties stay in roster order.
        living.sort_by(|a, b| b.1.total_cmp(&a.1));

        self.order = living.into_iter().map(|(id, _)| id).collect();
        self.cursor = 0;
        self.round += 1;
        &self.order
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn order(&self) -> &[CombatantId] {
        &self.order
    }

    pub fn current(&self) -> Option<CombatantId> {
        self.order.get(self.cursor).copied()
    }

    pub fn advance(&mut self) {
        if self.cursor < self.order.len() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor past dead combatants and returns the next living one.
    pub fn next_living(&mut self, roster: &Roster) -> Option<CombatantId> {
        while let Some(id) = self.current() {
            if roster.is_alive(id) {
                return Some(id);
            }
            self.cursor += 1;
        }
        None
    }

    pub fn is_round_over(&self) -> bool {
        self.cursor >= self.order.len()
    }
}

/// Returns the outcome once either side has no living combatant.
///
/// Mutual wipe counts as defeat.
pub fn check_end(roster: &Roster) -> Option<BattleOutcome> {
    if roster.side_wiped(Side::Player) {
        Some(BattleOutcome::Defeat)
    } else if roster.side_wiped(Side::Enemy) {
        Some(BattleOutcome::Victory)
    } else {
        None
    }
}

pub fn compute_rewards(
    outcome: BattleOutcome,
    wave: u32,
    boss_defeated: bool,
    tuning: &RewardTuning,
) -> Rewards {
    if outcome != BattleOutcome::Victory {
        return Rewards::default();
    }
    let scale = 1.0 + f64::from(wave) * tuning.wave_scale;
    let mut items = Vec::new();
    if boss_defeated {
        items.push(tuning.boss_drop.clone());
    }
    Rewards {
        exp: (tuning.exp_base * scale).round() as u32,
        gold: (tuning.gold_base * scale).round() as u32,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Archetype, CombatStats, Combatant};

    fn unit(name: &str, side: Side, speed: f64) -> Combatant {
        Combatant::new(
            name,
            side,
            Archetype::Warrior,
            CombatStats {
                max_hp: 100.0,
                attack: 10.0,
                defense: 0.0,
                speed,
                crit_chance: 0.0,
                crit_damage: 1.5,
                dodge_chance: 0.0,
            },
        )
    }

    #[test]
    fn faster_combatants_act_first_and_ties_keep_roster_order() {
        let roster = Roster::new(vec![
            unit("a", Side::Player, 10.0),
            unit("b", Side::Enemy, 15.0),
            unit("c", Side::Player, 10.0),
            unit("d", Side::Enemy, 5.0),
        ]);
        let mut scheduler = TurnScheduler::new();
        let order = scheduler.start_round(&roster, &WeatherSnapshot::clear()).to_vec();
        assert_eq!(
            order,
            vec![CombatantId(1), CombatantId(0), CombatantId(2), CombatantId(3)]
        );
        assert_eq!(scheduler.round(), 1);
    }

    #[test]
    fn dead_combatants_are_skipped_without_a_slot() {
        let mut roster = Roster::new(vec![
            unit("a", Side::Player, 20.0),
            unit("b", Side::Enemy, 15.0),
            unit("c", Side::Player, 10.0),
        ]);
        let mut scheduler = TurnScheduler::new();
        scheduler.start_round(&roster, &WeatherSnapshot::clear());

        assert_eq!(scheduler.next_living(&roster), Some(CombatantId(0)));
        scheduler.advance();
        roster.get_mut(CombatantId(1)).unwrap().take_damage(500.0);
        assert_eq!(scheduler.next_living(&roster), Some(CombatantId(2)));
        scheduler.advance();
        assert_eq!(scheduler.next_living(&roster), None);
        assert!(scheduler.is_round_over());

        let order = scheduler.start_round(&roster, &WeatherSnapshot::clear());
        assert_eq!(order, &[CombatantId(0), CombatantId(2)]);
    }

    #[test]
    fn wiped_side_decides_outcome() {
        let mut roster = Roster::new(vec![unit("a", Side::Player, 1.0), unit("b", Side::Enemy, 1.0)]);
        assert_eq!(check_end(&roster), None);
        roster.get_mut(CombatantId(1)).unwrap().take_damage(500.0);
        assert_eq!(check_end(&roster), Some(BattleOutcome::Victory));
        roster.get_mut(CombatantId(0)).unwrap().take_damage(500.0);
        assert_eq!(check_end(&roster), Some(BattleOutcome::Defeat));
    }

    #[test]
    fn victory_rewards_scale_with_wave() {
        let tuning = RewardTuning::default();
        let rewards = compute_rewards(BattleOutcome::Victory, 5, true, &tuning);
        assert_eq!(rewards.exp, 150);
        assert_eq!(rewards.gold, 75);
        assert_eq!(rewards.items, vec![tuning.boss_drop.clone()]);

        let defeat = compute_rewards(BattleOutcome::Defeat, 5, true, &tuning);
        assert_eq!(defeat, Rewards::default());
    }
}
