//! Timing challenges (QTE).
//!
//! [`QteManager`] runs at most one session at a time:
//! `idle → active → {perfect | good | miss} → idle`. The manager keeps its
//! own clock, advanced by [`QteManager::tick`]; input timestamps use the
//! same battle clock. A resolved session is cleared immediately, so later
//! ticks and inputs cannot change its rating.
mod definition;
mod input;

pub use definition::{QteDefinition, QteKind, QtePattern};
pub use input::{Direction, InputEvent, Key};

use strum::Display;
use tracing::{debug, warn};

use crate::combatant::{Combatant, CombatantId};
use crate::config::TimingTuning;
use crate::error::SessionError;

/// Windows outside this range are kept but reported.
const SANE_WINDOW: core::ops::RangeInclusive<f64> = 0.05..=10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum QteRating {
    Perfect,
    Good,
    Miss,
}

impl QteRating {
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// Result of a finished session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QteOutcome {
    pub actor: CombatantId,
    pub kind: QteKind,
    pub rating: QteRating,
    /// Timing multiplier for the pending action.
    pub multiplier: f64,
    /// Morale change for the actor.
    pub morale_delta: f64,
    /// Set when this outcome triggered an adaptive window change.
    pub adjustment: Option<WindowAdjustment>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowAdjustment {
    pub success_rate: f64,
    pub factor: f64,
}

#[derive(Clone, Debug)]
struct QteSession {
    kind: QteKind,
    actor: CombatantId,
    started_at: f64,
    /// Matched presses (sequence progress or multi-press timestamps).
    presses: Vec<f64>,
    hold_started: Option<f64>,
    travel: (f64, f64),
}

#[derive(Clone, Debug)]
pub struct QteManager {
    definitions: Vec<QteDefinition>,
    tuning: TimingTuning,
    clock: f64,
    session: Option<QteSession>,
    completed: u32,
    succeeded: u32,
    last_outcome: Option<QteOutcome>,
}

impl QteManager {
    /// Creates a manager; later definitions replace earlier ones of the same kind.
    pub fn new(definitions: Vec<QteDefinition>, tuning: TimingTuning) -> Self {
        let mut table: Vec<QteDefinition> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            table.retain(|existing| existing.kind() != definition.kind());
            table.push(definition);
        }
        Self {
            definitions: table,
            tuning,
            clock: 0.0,
            session: None,
            completed: 0,
            succeeded: 0,
            last_outcome: None,
        }
    }

    pub fn definition(&self, kind: QteKind) -> Option<&QteDefinition> {
        self.definitions.iter().find(|d| d.kind() == kind)
    }

    pub fn definitions(&self) -> &[QteDefinition] {
        &self.definitions
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_actor(&self) -> Option<CombatantId> {
        self.session.as_ref().map(|s| s.actor)
    }

    pub fn active_kind(&self) -> Option<QteKind> {
        self.session.as_ref().map(|s| s.kind)
    }

    /// Battle-clock time at which the active session started.
    pub fn started_at(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.started_at)
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn success_rate(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            f64::from(self.succeeded) / f64::from(self.completed)
        }
    }

    pub fn last_outcome(&self) -> Option<&QteOutcome> {
        self.last_outcome.as_ref()
    }

    /// Starts a session for `actor`.
    pub fn trigger(&mut self, kind: QteKind, actor: &Combatant) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        if !actor.is_alive() {
            return Err(SessionError::ActorDefeated(actor.id));
        }
        if self.definition(kind).is_none() {
            return Err(SessionError::UnconfiguredQte(kind));
        }

        debug!(actor = %actor.id, %kind, at = self.clock, "timing challenge started");
        self.session = Some(QteSession {
            kind,
            actor: actor.id,
            started_at: self.clock,
            presses: Vec::new(),
            hold_started: None,
            travel: (0.0, 0.0),
        });
        Ok(())
    }

    /// Feeds one input event to the active session.
    ///
    /// Returns the outcome when the event resolves the session.
    pub fn submit_input(&mut self, event: &InputEvent) -> Option<QteOutcome> {
        let session = self.session.as_mut()?;
        let definition = self.definitions.iter().find(|d| d.kind() == session.kind)?;
        let elapsed = event.at() - session.started_at;
        if elapsed < 0.0 {
            return None;
        }
        if elapsed >= definition.window {
            return Some(self.finish(QteRating::Miss));
        }

        let window = definition.window;
        let perfect = self.tuning.perfect_threshold * window;
        let good = self.tuning.good_threshold * window;
        let graded = |elapsed: f64| {
            if elapsed < perfect {
                QteRating::Perfect
            } else if elapsed < good {
                QteRating::Good
            } else {
                QteRating::Miss
            }
        };
        let completed = |elapsed: f64| {
            if elapsed < perfect {
                QteRating::Perfect
            } else {
                QteRating::Good
            }
        };

        let rating = match (&definition.pattern, *event) {
            (QtePattern::Press { keys }, InputEvent::KeyDown { key, .. }) => {
                keys.contains(&key).then(|| graded(elapsed))
            }
            (QtePattern::Sequence { keys }, InputEvent::KeyDown { key, at }) => {
                if !keys.contains(&key) {
                    None
                } else if keys.get(session.presses.len()) != Some(&key) {
                    Some(QteRating::Miss)
                } else {
                    session.presses.push(at);
                    (session.presses.len() == keys.len()).then(|| completed(elapsed))
                }
            }
            (QtePattern::Hold { key, .. }, InputEvent::KeyDown { key: down, at }) => {
                if *key == down && session.hold_started.is_none() {
                    session.hold_started = Some(at);
                }
                None
            }
            (QtePattern::Hold { key, duration }, InputEvent::KeyUp { key: up, at }) => {
                match session.hold_started {
                    Some(start) if *key == up => Some(if at - start >= *duration {
                        QteRating::Perfect
                    } else {
                        QteRating::Miss
                    }),
                    _ => None,
                }
            }
            (
                QtePattern::Motion {
                    direction,
                    distance,
                },
                InputEvent::PointerDelta { dx, dy, .. },
            ) => {
                session.travel.0 += dx;
                session.travel.1 += dy;
                let (ux, uy) = direction.unit();
                let projected = session.travel.0 * ux + session.travel.1 * uy;
                (projected >= *distance).then(|| graded(elapsed))
            }
            (
                QtePattern::MultiPress {
                    key,
                    count,
                    interval,
                },
                InputEvent::KeyDown { key: down, at },
            ) if *key == down => {
                match session.presses.last() {
                    Some(previous) if at - previous > *interval => {
                        session.presses.clear();
                    }
                    _ => {}
                }
                session.presses.push(at);
                (session.presses.len() as u32 >= *count).then(|| completed(elapsed))
            }
            _ => None,
        };

        rating.map(|rating| self.finish(rating))
    }

    /// Advances the clock; resolves a hold that reached its duration or a
    /// session whose window has passed.
    pub fn tick(&mut self, dt: f64) -> Option<QteOutcome> {
        self.clock += dt;
        let session = self.session.as_ref()?;
        let definition = self.definition(session.kind)?;

        if let (QtePattern::Hold { duration, .. }, Some(start)) =
            (&definition.pattern, session.hold_started)
        {
            if self.clock - start >= *duration {
                return Some(self.finish(QteRating::Perfect));
            }
        }
        if self.clock - session.started_at >= definition.window {
            return Some(self.finish(QteRating::Miss));
        }
        None
    }

    /// Ends the active session as an explicit failure.
    pub fn cancel(&mut self) -> Option<QteOutcome> {
        self.session.as_ref()?;
        Some(self.finish(QteRating::Miss))
    }

    /// Drops the active session without scoring it.
    pub fn reset(&mut self) {
        self.session = None;
    }

    fn finish(&mut self, rating: QteRating) -> QteOutcome {
        let session = self.session.take();
        let (actor, kind) = session
            .as_ref()
            .map_or((CombatantId::default(), QteKind::Press), |s| (s.actor, s.kind));
        let bonus = self.definition(kind).map_or(1.0, |d| d.bonus);

        let (multiplier, morale_delta) = match rating {
            QteRating::Perfect => (bonus, self.tuning.morale_perfect),
            QteRating::Good => (bonus * self.tuning.good_scale, self.tuning.morale_good),
            QteRating::Miss => (self.tuning.miss_multiplier, self.tuning.morale_miss),
        };

        self.completed += 1;
        if rating.is_success() {
            self.succeeded += 1;
        }
        let adjustment = self.maybe_adjust();

        debug!(%actor, %kind, %rating, multiplier, "timing challenge resolved");
        let outcome = QteOutcome {
            actor,
            kind,
            rating,
            multiplier,
            morale_delta,
            adjustment,
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    fn maybe_adjust(&mut self) -> Option<WindowAdjustment> {
        if self.tuning.adjust_every == 0 || self.completed % self.tuning.adjust_every != 0 {
            return None;
        }
        let success_rate = self.success_rate();
        let factor = if success_rate > self.tuning.raise_above {
            self.tuning.shrink_factor
        } else if success_rate < self.tuning.ease_below {
            self.tuning.grow_factor
        } else {
            return None;
        };

        for definition in &mut self.definitions {
            definition.window *= factor;
            if !SANE_WINDOW.contains(&definition.window) {
                warn!(
                    kind = %definition.kind(),
                    window = definition.window,
                    "timing window drifted outside the expected range"
                );
            }
        }
        debug!(success_rate, factor, "timing windows adjusted");
        Some(WindowAdjustment {
            success_rate,
            factor,
        })
    }
}
