//! Scripted input for timing challenges and combos.
//!
//! The engine only sees abstract [`InputEvent`]s, so the simulator plays the
//! player's hands: once a session starts, [`Autopilot`] queues the events a
//! player aiming for a given grade would produce, stamped on the battle
//! clock, and releases them as the clock reaches them.
use std::collections::VecDeque;

use battle_core::{
    ComboDefinition, ComboPattern, InputEvent, Key, QteDefinition, QtePattern, TimingTuning,
};
use clap::ValueEnum;

/// How well the scripted player performs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Grade {
    #[default]
    Perfect,
    Good,
    /// Never answers; every session times out.
    Miss,
}

#[derive(Clone, Debug)]
pub struct Autopilot {
    grade: Grade,
    perfect_threshold: f64,
    good_threshold: f64,
    queue: VecDeque<InputEvent>,
}

impl Autopilot {
    pub fn new(grade: Grade, timing: &TimingTuning) -> Self {
        Self {
            grade,
            perfect_threshold: timing.perfect_threshold,
            good_threshold: timing.good_threshold,
            queue: VecDeque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops whatever is still queued.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Seconds after the start at which the completing input lands.
    fn finish_offset(&self, window: f64) -> Option<f64> {
        match self.grade {
            Grade::Perfect => Some(0.5 * self.perfect_threshold * window),
            Grade::Good => Some(0.5 * (self.perfect_threshold + self.good_threshold) * window),
            Grade::Miss => None,
        }
    }

    /// Queues the inputs for a timing challenge that started at `started_at`.
    ///
    /// Holds have no good band, so a good grade holds for the full duration.
    pub fn plan_qte(&mut self, definition: &QteDefinition, started_at: f64) {
        self.clear();
        let Some(offset) = self.finish_offset(definition.window) else {
            return;
        };
        let at = started_at + offset;

        match &definition.pattern {
            QtePattern::Press { keys } => {
                if let Some(&key) = keys.first() {
                    self.queue.push_back(InputEvent::KeyDown { key, at });
                }
            }
            QtePattern::Sequence { keys } => self.spread(keys, started_at, offset),
            QtePattern::Hold { key, duration } => {
                self.queue.push_back(InputEvent::KeyDown {
                    key: *key,
                    at: started_at,
                });
                self.queue.push_back(InputEvent::KeyUp {
                    key: *key,
                    at: started_at + duration,
                });
            }
            QtePattern::Motion {
                direction,
                distance,
            } => {
                let (ux, uy) = direction.unit();
                self.queue.push_back(InputEvent::PointerDelta {
                    dx: ux * distance,
                    dy: uy * distance,
                    at,
                });
            }
            QtePattern::MultiPress {
                key,
                count,
                interval,
            } => {
                let count = (*count).max(1);
                let step = (0.5 * interval).min(offset / f64::from(count));
                for remaining in (0..count).rev() {
                    self.queue.push_back(InputEvent::KeyDown {
                        key: *key,
                        at: at - step * f64::from(remaining),
                    });
                }
            }
        }
    }

    /// Queues the shared team input for a combo that started at `started_at`.
    pub fn plan_combo(&mut self, definition: &ComboDefinition, started_at: f64) {
        self.clear();
        let Some(offset) = self.finish_offset(definition.window) else {
            return;
        };

        match &definition.pattern {
            ComboPattern::Sequence { keys } => self.spread(keys, started_at, offset),
            ComboPattern::Press { key } => {
                self.queue.push_back(InputEvent::KeyDown {
                    key: *key,
                    at: started_at + offset,
                });
            }
            ComboPattern::Hold { key, duration } => {
                self.queue.push_back(InputEvent::KeyDown {
                    key: *key,
                    at: started_at,
                });
                self.queue.push_back(InputEvent::KeyUp {
                    key: *key,
                    at: started_at + duration,
                });
            }
        }
    }

    /// Pops every queued event stamped at or before `clock`.
    pub fn due(&mut self, clock: f64) -> Vec<InputEvent> {
        let mut due = Vec::new();
        while let Some(event) = self.queue.front() {
            if event.at() > clock + 1e-9 {
                break;
            }
            due.extend(self.queue.pop_front());
        }
        due
    }

    fn spread(&mut self, keys: &[Key], started_at: f64, offset: f64) {
        let steps = keys.len() as f64;
        for (index, &key) in keys.iter().enumerate() {
            self.queue.push_back(InputEvent::KeyDown {
                key,
                at: started_at + offset * (index as f64 + 1.0) / steps,
            });
        }
    }
}
