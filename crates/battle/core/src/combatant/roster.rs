use super::{ArchetypeFamily, Combatant, CombatantId, Side};

/// Every combatant in a battle, indexed by [`CombatantId`].
///
/// Defeated combatants stay in the roster; queries that select actors or
/// targets skip them.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    combatants: Vec<Combatant>,
}

impl Roster {
    /// Builds a roster, assigning ids in insertion order.
    pub fn new(combatants: Vec<Combatant>) -> Self {
        let mut roster = Self {
            combatants: Vec::with_capacity(combatants.len()),
        };
        for combatant in combatants {
            roster.push(combatant);
        }
        roster
    }

    pub fn push(&mut self, mut combatant: Combatant) -> CombatantId {
        let id = CombatantId(self.combatants.len() as u32);
        combatant.id = id;
        self.combatants.push(combatant);
        id
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(id.index())
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.iter_mut()
    }

    pub fn living(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter().filter(|c| c.is_alive())
    }

    pub fn living_on(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.living().filter(move |c| c.side == side)
    }

    pub fn is_alive(&self, id: CombatantId) -> bool {
        self.get(id).is_some_and(Combatant::is_alive)
    }

    pub fn side_wiped(&self, side: Side) -> bool {
        self.living_on(side).next().is_none()
    }

    /// First living member of a family on a side, in roster order.
    pub fn first_of_family(&self, side: Side, family: ArchetypeFamily) -> Option<&Combatant> {
        self.living_on(side).find(|c| c.family() == family)
    }

    /// Living combatants `actor` may strike, in roster order.
    pub fn hostile_to<'a>(&'a self, actor: &'a Combatant) -> impl Iterator<Item = &'a Combatant> {
        self.living().filter(move |c| actor.is_hostile_to(c))
    }

    /// Living combatants `actor` may support, in roster order.
    pub fn friendly_to<'a>(&'a self, actor: &'a Combatant) -> impl Iterator<Item = &'a Combatant> {
        self.living().filter(move |c| actor.is_friendly_to(c))
    }

    /// Living member of `side` with the highest attack; ties go to roster order.
    pub fn strongest_on(&self, side: Side) -> Option<&Combatant> {
        strongest(self.living_on(side))
    }

    /// Strongest combatant `actor` may strike.
    pub fn strongest_hostile<'a>(&'a self, actor: &'a Combatant) -> Option<&'a Combatant> {
        strongest(self.hostile_to(actor))
    }
}

fn strongest<'a>(candidates: impl Iterator<Item = &'a Combatant>) -> Option<&'a Combatant> {
    candidates.fold(None, |best: Option<&Combatant>, c| match best {
        Some(b) if b.stats.attack >= c.stats.attack => Some(b),
        _ => Some(c),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Archetype, CombatStats, StatusEffect, StatusKind};

    fn stats(attack: f64) -> CombatStats {
        CombatStats {
            max_hp: 100.0,
            attack,
            defense: 5.0,
            speed: 10.0,
            crit_chance: 0.0,
            crit_damage: 1.5,
            dodge_chance: 0.0,
        }
    }

    #[test]
    fn ids_follow_insertion_order() {
        let roster = Roster::new(vec![
            Combatant::new("A", Side::Player, Archetype::Tanker, stats(30.0)),
            Combatant::new("B", Side::Enemy, Archetype::Ranger, stats(40.0)),
        ]);
        assert_eq!(roster.get(CombatantId(1)).unwrap().name, "B");
        assert_eq!(roster.get(CombatantId(1)).unwrap().id, CombatantId(1));
    }

    #[test]
    fn strongest_prefers_earlier_on_tie() {
        let mut roster = Roster::new(vec![
            Combatant::new("A", Side::Enemy, Archetype::Warrior, stats(50.0)),
            Combatant::new("B", Side::Enemy, Archetype::Warrior, stats(50.0)),
            Combatant::new("C", Side::Enemy, Archetype::Warrior, stats(60.0)),
        ]);
        assert_eq!(roster.strongest_on(Side::Enemy).unwrap().name, "C");

        roster.get_mut(CombatantId(2)).unwrap().take_damage(1000.0);
        assert_eq!(roster.strongest_on(Side::Enemy).unwrap().name, "A");
    }

    #[test]
    fn controlled_combatant_turns_on_its_own_side() {
        let mut roster = Roster::new(vec![
            Combatant::new("Hero", Side::Player, Archetype::Warrior, stats(30.0)),
            Combatant::new("Orc", Side::Enemy, Archetype::Warrior, stats(40.0)),
            Combatant::new("Imp", Side::Enemy, Archetype::Ranger, stats(20.0)),
        ]);
        roster.get_mut(CombatantId(1)).unwrap().status.add(StatusEffect {
            kind: StatusKind::Controlled,
            remaining: 2,
            magnitude: 0.0,
            source: Some(CombatantId(0)),
        });

        let orc = roster.get(CombatantId(1)).unwrap();
        assert_eq!(orc.allegiance(), Side::Player);
        assert_eq!(orc.controlled_by(), Some(CombatantId(0)));
        let hostile: Vec<CombatantId> = roster.hostile_to(orc).map(|c| c.id).collect();
        assert_eq!(hostile, vec![CombatantId(2)]);
        let friendly: Vec<CombatantId> = roster.friendly_to(orc).map(|c| c.id).collect();
        assert_eq!(friendly, vec![CombatantId(0)]);

        // The rest of the field still sees it by its side.
        let hero = roster.get(CombatantId(0)).unwrap();
        assert_eq!(roster.strongest_hostile(hero).unwrap().name, "Orc");
        assert!(!roster.side_wiped(Side::Enemy));
    }

    #[test]
    fn wiped_side_has_no_living_members() {
        let mut roster = Roster::new(vec![Combatant::new(
            "A",
            Side::Player,
            Archetype::Tanker,
            stats(30.0),
        )]);
        assert!(!roster.side_wiped(Side::Player));
        roster.get_mut(CombatantId(0)).unwrap().take_damage(1000.0);
        assert!(roster.side_wiped(Side::Player));
        assert!(roster.side_wiped(Side::Enemy));
    }
}
