//! Target selection helpers shared by the heuristics.
use crate::combatant::{Combatant, CombatantId, Roster, Row};
use crate::rng::BattleRng;

use super::TargetPolicy;

/// Higher means a more valuable target.
///
/// `max_attack` is the highest attack among the candidates and normalizes
/// the threat term into `[0, 1]`.
pub fn strategic_score(target: &Combatant, max_attack: f64) -> f64 {
    let threat = if max_attack > 0.0 {
        target.stats.attack / max_attack
    } else {
        0.0
    };
    let mut score = (1.0 - target.hp_fraction()) * 50.0 + threat * 30.0;
    if target.row == Row::Back {
        score += 20.0;
    }
    if target.status.has_buffs() {
        score += 15.0;
    }
    score
}

/// Picks a combatant `actor` may strike according to `policy`.
///
/// Only [`TargetPolicy::Random`] consumes a draw.
pub fn pick(
    policy: TargetPolicy,
    roster: &Roster,
    actor: &Combatant,
    rng: &mut BattleRng,
) -> Option<CombatantId> {
    let candidates: Vec<&Combatant> = roster.hostile_to(actor).collect();
    if candidates.is_empty() {
        return None;
    }
    match policy {
        TargetPolicy::Random => Some(candidates[rng.index(candidates.len())].id),
        TargetPolicy::Weakest => weakest(&candidates),
        TargetPolicy::BackLine => candidates
            .iter()
            .find(|c| c.row == Row::Back)
            .map(|c| c.id)
            .or_else(|| weakest(&candidates)),
        TargetPolicy::Strategic => {
            let max_attack = candidates
                .iter()
                .map(|c| c.stats.attack)
                .fold(0.0, f64::max);
            let mut best: Option<(&Combatant, f64)> = None;
            for &candidate in &candidates {
                let score = strategic_score(candidate, max_attack);
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((candidate, score));
                }
            }
            best.map(|(c, _)| c.id)
        }
    }
}

/// Living ally of `actor` (excluding itself) with the lowest hp fraction.
pub fn weakest_ally(actor: &Combatant, roster: &Roster) -> Option<CombatantId> {
    let allies: Vec<&Combatant> = roster
        .friendly_to(actor)
        .filter(|c| c.id != actor.id)
        .collect();
    weakest(&allies)
}

/// Lowest hp fraction; ties go to roster order.
fn weakest(candidates: &[&Combatant]) -> Option<CombatantId> {
    candidates
        .iter()
        .fold(None, |best: Option<&Combatant>, &c| match best {
            Some(b) if b.hp_fraction() <= c.hp_fraction() => Some(b),
            _ => Some(c),
        })
        .map(|c| c.id)
}
