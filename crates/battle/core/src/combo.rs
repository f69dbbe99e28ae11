//! Team combos.
//!
//! Two teammates of complementary families perform a shared input pattern
//! inside a window. One session may be active battle-wide:
//! `idle → active → {success | fail} → idle`.
use strum::Display;
use tracing::{debug, info};

use crate::combatant::{
    ArchetypePair, CombatantId, Roster, Side, StatusEffect, StatusKind,
};
use crate::config::{BattleConfig, ComboTuning, TimingTuning};
use crate::error::SessionError;
use crate::event::{BattleLog, EffectCue, EventKind};
use crate::qte::{InputEvent, Key};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComboPattern {
    Sequence { keys: Vec<Key> },
    Press { key: Key },
    Hold { key: Key, duration: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComboEffect {
    /// `ComboBuff` damage multiplier on every living teammate.
    TeamBuff { value: f64, duration: u32 },
    /// Participants' summed attack × value to every living enemy.
    Burst { value: f64 },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboDefinition {
    pub pair: ArchetypePair,
    pub name: String,
    pub pattern: ComboPattern,
    pub window: f64,
    pub effect: ComboEffect,
}

impl ComboDefinition {
    /// Built-in combo table.
    pub fn standard() -> Vec<Self> {
        use crate::combatant::ArchetypeFamily::{Ranger, Tank, Warrior};
        vec![
            Self {
                pair: ArchetypePair::new(Tank, Warrior),
                name: "steel_wall".to_string(),
                pattern: ComboPattern::Sequence {
                    keys: vec![Key::Q, Key::W],
                },
                window: 1.5,
                effect: ComboEffect::TeamBuff {
                    value: 1.5,
                    duration: 3,
                },
            },
            Self {
                pair: ArchetypePair::new(Ranger, Warrior),
                name: "storm_strike".to_string(),
                pattern: ComboPattern::Sequence {
                    keys: vec![Key::E, Key::R],
                },
                window: 1.2,
                effect: ComboEffect::Burst { value: 2.0 },
            },
            Self {
                pair: ArchetypePair::new(Ranger, Tank),
                name: "covering_fire".to_string(),
                pattern: ComboPattern::Hold {
                    key: Key::F,
                    duration: 0.6,
                },
                window: 1.5,
                effect: ComboEffect::Burst { value: 1.2 },
            },
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ComboRating {
    Perfect,
    Good,
    Normal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ComboFailure {
    Timeout,
    /// A hold was released before its duration.
    Released,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComboOutcome {
    Succeeded {
        name: String,
        side: Side,
        rating: ComboRating,
        participants: Vec<CombatantId>,
        /// Effect already scaled by the rating.
        effect: ComboEffect,
    },
    Failed {
        name: String,
        side: Side,
        participants: Vec<CombatantId>,
        reason: ComboFailure,
    },
}

#[derive(Clone, Debug)]
struct ComboSession {
    definition: usize,
    side: Side,
    participants: Vec<CombatantId>,
    started_at: f64,
    progress: usize,
    hold_started: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct ComboManager {
    definitions: Vec<ComboDefinition>,
    tuning: ComboTuning,
    perfect_threshold: f64,
    good_threshold: f64,
    clock: f64,
    session: Option<ComboSession>,
}

impl ComboManager {
    pub fn new(definitions: Vec<ComboDefinition>, tuning: ComboTuning, timing: &TimingTuning) -> Self {
        Self {
            definitions,
            tuning,
            perfect_threshold: timing.perfect_threshold,
            good_threshold: timing.good_threshold,
            clock: 0.0,
            session: None,
        }
    }

    pub fn definition(&self, pair: ArchetypePair) -> Option<&ComboDefinition> {
        self.definitions.iter().find(|d| d.pair == pair)
    }

    pub fn definitions(&self) -> &[ComboDefinition] {
        &self.definitions
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn participants(&self) -> &[CombatantId] {
        self.session
            .as_ref()
            .map_or(&[], |s| s.participants.as_slice())
    }

    pub fn active_definition(&self) -> Option<&ComboDefinition> {
        let session = self.session.as_ref()?;
        self.definitions.get(session.definition)
    }

    /// Side performing the active combo.
    pub fn active_side(&self) -> Option<Side> {
        self.session.as_ref().map(|s| s.side)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active_definition().map(|d| d.name.as_str())
    }

    /// Battle-clock time at which the active combo started.
    pub fn started_at(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.started_at)
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Starts a combo for `side` using the first living member of each family.
    pub fn start(&mut self, pair: ArchetypePair, side: Side, roster: &Roster) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        let definition = self
            .definitions
            .iter()
            .position(|d| d.pair == pair)
            .ok_or(SessionError::UnconfiguredCombo(pair))?;

        let mut participants = Vec::with_capacity(2);
        for family in pair.families() {
            let member = roster
                .living_on(side)
                .find(|c| c.family() == family && !participants.contains(&c.id))
                .ok_or(SessionError::MissingMember(family))?;
            if member.combo_cooldown > 0 {
                return Err(SessionError::ComboCooldown {
                    actor: member.id,
                    remaining: member.combo_cooldown,
                });
            }
            participants.push(member.id);
        }

        debug!(%pair, ?participants, at = self.clock, "combo started");
        self.session = Some(ComboSession {
            definition,
            side,
            participants,
            started_at: self.clock,
            progress: 0,
            hold_started: None,
        });
        Ok(())
    }

    /// Feeds the shared team input to the active combo.
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<ComboOutcome> {
        let session = self.session.as_mut()?;
        let definition = self.definitions.get(session.definition)?;
        let elapsed = event.at() - session.started_at;
        if elapsed < 0.0 {
            return None;
        }
        if elapsed >= definition.window {
            return Some(self.fail(ComboFailure::Timeout));
        }

        enum Step {
            Pending,
            Complete,
            Released,
        }
        let step = match (&definition.pattern, *event) {
            (ComboPattern::Sequence { keys }, InputEvent::KeyDown { key, .. }) => {
                if keys.get(session.progress) == Some(&key) {
                    session.progress += 1;
                }
                if session.progress >= keys.len() {
                    Step::Complete
                } else {
                    Step::Pending
                }
            }
            (ComboPattern::Press { key }, InputEvent::KeyDown { key: down, .. }) if *key == down => {
                Step::Complete
            }
            (ComboPattern::Hold { key, .. }, InputEvent::KeyDown { key: down, at }) if *key == down => {
                session.hold_started.get_or_insert(at);
                Step::Pending
            }
            (ComboPattern::Hold { key, duration }, InputEvent::KeyUp { key: up, at }) if *key == up => {
                match session.hold_started {
                    Some(start) if at - start >= *duration => Step::Complete,
                    Some(_) => Step::Released,
                    None => Step::Pending,
                }
            }
            _ => Step::Pending,
        };

        match step {
            Step::Pending => None,
            Step::Complete => Some(self.succeed(elapsed)),
            Step::Released => Some(self.fail(ComboFailure::Released)),
        }
    }

    pub fn tick(&mut self, dt: f64) -> Option<ComboOutcome> {
        self.clock += dt;
        let session = self.session.as_ref()?;
        let definition = self.definitions.get(session.definition)?;

        if let (ComboPattern::Hold { duration, .. }, Some(start)) =
            (&definition.pattern, session.hold_started)
        {
            if self.clock - start >= *duration {
                let elapsed = self.clock - session.started_at;
                return Some(self.succeed(elapsed));
            }
        }
        if self.clock - session.started_at >= definition.window {
            return Some(self.fail(ComboFailure::Timeout));
        }
        None
    }

    pub fn cancel(&mut self) -> Option<ComboOutcome> {
        self.session.as_ref()?;
        Some(self.fail(ComboFailure::Cancelled))
    }

    /// Drops the active session without an outcome.
    pub fn reset(&mut self) {
        self.session = None;
    }

    fn rate(&self, elapsed: f64, window: f64) -> ComboRating {
        if elapsed < self.perfect_threshold * window {
            ComboRating::Perfect
        } else if elapsed < self.good_threshold * window {
            ComboRating::Good
        } else {
            ComboRating::Normal
        }
    }

    fn succeed(&mut self, elapsed: f64) -> ComboOutcome {
        let Some(session) = self.session.take() else {
            return self.fail(ComboFailure::Cancelled);
        };
        let definition = &self.definitions[session.definition];
        let rating = self.rate(elapsed, definition.window);
        let pick = |scale: &crate::config::RatingScale| match rating {
            ComboRating::Perfect => scale.perfect,
            ComboRating::Good => scale.good,
            ComboRating::Normal => scale.normal,
        };

        let effect = match definition.effect {
            ComboEffect::TeamBuff { value, duration } => {
                let scale = pick(&self.tuning.buff_scale);
                ComboEffect::TeamBuff {
                    value: value * scale,
                    duration: ((f64::from(duration) * scale).round() as u32).max(1),
                }
            }
            ComboEffect::Burst { value } => ComboEffect::Burst {
                value: value * pick(&self.tuning.burst_scale),
            },
        };

        ComboOutcome::Succeeded {
            name: definition.name.clone(),
            side: session.side,
            rating,
            participants: session.participants,
            effect,
        }
    }

    fn fail(&mut self, reason: ComboFailure) -> ComboOutcome {
        let session = self.session.take();
        let (name, side, participants) = match session {
            Some(session) => (
                self.definitions
                    .get(session.definition)
                    .map(|d| d.name.clone())
                    .unwrap_or_default(),
                session.side,
                session.participants,
            ),
            None => (String::new(), Side::Player, Vec::new()),
        };
        ComboOutcome::Failed {
            name,
            side,
            participants,
            reason,
        }
    }
}

/// Applies a finished combo to the roster and logs it.
///
/// Returns combatants defeated by a burst, in roster order.
pub fn apply_outcome(
    outcome: &ComboOutcome,
    roster: &mut Roster,
    config: &BattleConfig,
    log: &mut BattleLog,
) -> Vec<CombatantId> {
    let mut defeated = Vec::new();
    match outcome {
        ComboOutcome::Succeeded {
            name,
            side,
            rating,
            participants,
            effect,
        } => {
            info!(%name, %rating, "combo succeeded");
            log.record(EventKind::ComboSucceeded {
                name: name.clone(),
                rating: *rating,
                participants: participants.clone(),
            });
            log.sfx(&format!("combo_{rating}"));

            match *effect {
                ComboEffect::TeamBuff { value, duration } => {
                    let team: Vec<CombatantId> = roster.living_on(*side).map(|c| c.id).collect();
                    for id in team {
                        let added = roster.get_mut(id).is_some_and(|member| {
                            member.status.add(StatusEffect {
                                kind: StatusKind::ComboBuff,
                                remaining: duration,
                                magnitude: value,
                                source: participants.first().copied(),
                            })
                        });
                        if !added {
                            debug!(target = %id, "status list full, combo buff skipped");
                            continue;
                        }
                        log.record(EventKind::StatusApplied {
                            target: id,
                            status: StatusKind::ComboBuff,
                            magnitude: value,
                            turns: duration,
                        });
                        log.effect(EffectCue::Buff, id, value);
                    }
                }
                ComboEffect::Burst { value } => {
                    let attack: f64 = participants
                        .iter()
                        .filter_map(|id| roster.get(*id))
                        .map(|c| c.effective_attack())
                        .sum();
                    let damage = attack * value;
                    let source = participants.first().copied();
                    let enemies: Vec<CombatantId> =
                        roster.living_on(side.opposite()).map(|c| c.id).collect();
                    for id in enemies {
                        let Some(target) = roster.get_mut(id) else {
                            continue;
                        };
                        let amount = target.take_damage(damage);
                        let hp_after = target.hp();
                        let fell = !target.is_alive();
                        log.record(EventKind::Damaged {
                            source: source.unwrap_or(id),
                            target: id,
                            amount,
                            critical: false,
                            blocked: false,
                            hp_after,
                        });
                        log.effect(EffectCue::Combo, id, amount);
                        if fell {
                            log.record(EventKind::Defeated { target: id, by: source });
                            log.effect(EffectCue::Defeat, id, 0.0);
                            defeated.push(id);
                        }
                    }
                }
            }

            for id in participants {
                if let Some(member) = roster.get_mut(*id) {
                    member.combo_cooldown = config.combo.cooldown_turns;
                }
            }
        }
        ComboOutcome::Failed {
            name,
            participants,
            reason,
            ..
        } => {
            debug!(%name, %reason, "combo failed");
            log.record(EventKind::ComboFailed {
                name: name.clone(),
                participants: participants.clone(),
            });
            log.sfx("combo_fail");
            for id in participants {
                if let Some(member) = roster.get_mut(*id) {
                    member.adjust_morale(-config.combo.fail_morale_penalty, config.morale.max);
                }
            }
        }
    }
    defeated
}
