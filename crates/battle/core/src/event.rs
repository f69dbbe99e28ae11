//! Event log and outbound commands.
//!
//! The log is append-only: every state change the controller performs is
//! recorded as one [`BattleEvent`] stamped with the battle clock and turn
//! number. [`Command`]s are fire-and-forget cues for presentation layers,
//! queued here until the caller drains them.
use crate::combatant::{CombatantId, StatusKind};
use crate::combo::ComboRating;
use crate::qte::{QteKind, QteRating};
use crate::resolve::ActionKind;
use crate::state::{BattleOutcome, Rewards};
use crate::tactics::Rally;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleEvent {
    /// Battle clock in seconds.
    pub timestamp: f64,
    pub turn: u32,
    pub kind: EventKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipReason {
    Stunned,
    Defeated,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    BattleStarted {
        wave: u32,
        combatants: u32,
    },
    RoundStarted {
        round: u32,
        order: Vec<CombatantId>,
    },
    TurnStarted {
        actor: CombatantId,
    },
    TurnSkipped {
        actor: CombatantId,
        reason: SkipReason,
    },
    TurnTimedOut {
        actor: CombatantId,
    },
    ActionRejected {
        actor: CombatantId,
        reason: String,
    },
    ActionUsed {
        actor: CombatantId,
        action: ActionKind,
        timing: Option<f64>,
    },
    Dodged {
        source: CombatantId,
        target: CombatantId,
    },
    Damaged {
        source: CombatantId,
        target: CombatantId,
        amount: f64,
        critical: bool,
        blocked: bool,
        hp_after: f64,
    },
    Countered {
        source: CombatantId,
        target: CombatantId,
    },
    Healed {
        source: CombatantId,
        target: CombatantId,
        amount: f64,
        hp_after: f64,
    },
    StatusApplied {
        target: CombatantId,
        status: StatusKind,
        magnitude: f64,
        turns: u32,
    },
    StatusTicked {
        target: CombatantId,
        status: StatusKind,
        amount: f64,
        hp_after: f64,
    },
    StatusExpired {
        target: CombatantId,
        status: StatusKind,
    },
    TauntActivated {
        holder: CombatantId,
        target: CombatantId,
    },
    Defeated {
        target: CombatantId,
        by: Option<CombatantId>,
    },
    QteStarted {
        actor: CombatantId,
        kind: QteKind,
        window: f64,
    },
    QteRejected {
        actor: CombatantId,
        kind: QteKind,
        reason: String,
    },
    QteResolved {
        actor: CombatantId,
        kind: QteKind,
        rating: QteRating,
        multiplier: f64,
    },
    QteWindowsAdjusted {
        success_rate: f64,
        factor: f64,
    },
    ComboStarted {
        name: String,
        participants: Vec<CombatantId>,
    },
    ComboRejected {
        reason: String,
    },
    ComboSucceeded {
        name: String,
        rating: ComboRating,
        participants: Vec<CombatantId>,
    },
    ComboFailed {
        name: String,
        participants: Vec<CombatantId>,
    },
    Rallied {
        actor: CombatantId,
        rally: Rally,
        cost: f64,
    },
    ControlStarted {
        caster: CombatantId,
        target: CombatantId,
        turns: u32,
    },
    /// Control ended early because the caster fell.
    ControlReleased {
        target: CombatantId,
    },
    InputIgnored,
    BattleEnded {
        outcome: BattleOutcome,
        rewards: Rewards,
    },
    BattleAborted,
}

/// Presentation cue kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EffectCue {
    Hit,
    Critical,
    Dodge,
    Block,
    Heal,
    Buff,
    Debuff,
    Taunt,
    Defeat,
    Combo,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    Effect {
        kind: EffectCue,
        at: CombatantId,
        magnitude: f64,
    },
    Sfx(String),
}

/// Append-only event log plus the pending command queue.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BattleLog {
    events: Vec<BattleEvent>,
    commands: Vec<Command>,
    clock: f64,
    turn: u32,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_clock(&mut self, clock: f64) {
        self.clock = clock;
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn record(&mut self, kind: EventKind) {
        self.events.push(BattleEvent {
            timestamp: self.clock,
            turn: self.turn,
            kind,
        });
    }

    pub fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn effect(&mut self, kind: EffectCue, at: CombatantId, magnitude: f64) {
        self.emit(Command::Effect { kind, at, magnitude });
    }

    pub fn sfx(&mut self, tag: &str) {
        self.emit(Command::Sfx(tag.to_string()));
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_carry_clock_and_turn() {
        let mut log = BattleLog::new();
        log.set_clock(1.5);
        log.set_turn(3);
        log.record(EventKind::InputIgnored);

        let event = &log.events()[0];
        assert_eq!(event.timestamp, 1.5);
        assert_eq!(event.turn, 3);
    }

    #[test]
    fn draining_commands_empties_queue() {
        let mut log = BattleLog::new();
        log.sfx("attack");
        log.effect(EffectCue::Hit, CombatantId(1), 12.0);
        assert_eq!(log.drain_commands().len(), 2);
        assert!(log.drain_commands().is_empty());
    }
}
