//! Battle orchestration.
//!
//! The [`BattleController`] owns the battle state and every subsystem. It is
//! driven by a fixed-timestep [`BattleController::tick`] and by caller input
//! (action requests, input events, combo starts). Waiting for a player or a
//! timing session is reported through [`TickStatus`], never by blocking.
//!
//! Each tick advances at most one turn. A turn runs:
//!
//! 1. Turn start: expired statuses drop, poison ticks, cooldowns count down.
//!    A stunned combatant skips the rest of its turn.
//! 2. The action: AI combatants resolve immediately; players submit a request
//!    which may wait on a timing challenge through a [`PendingAction`].
//! 3. Turn end: remaining status durations decrement and the cursor moves on.
//!
//! The end condition is checked after every resolution and at each round
//! boundary.
use tracing::{debug, info, warn};

use crate::ai::{AiSelector, DifficultyProfile};
use crate::combatant::{ArchetypePair, Combatant, CombatantId, Control, Roster, Side, StatusKind};
use crate::combo::{self, ComboDefinition, ComboManager, ComboOutcome};
use crate::config::BattleConfig;
use crate::error::{BattleError, ErrorSeverity, SessionError};
use crate::event::{BattleEvent, Command, EffectCue, EventKind, SkipReason};
use crate::qte::{InputEvent, QteDefinition, QteKind, QteManager, QteOutcome};
use crate::resolve::{self, ActionError, ActionKind, ActionOutcome, ActionRequest, ResolveContext};
use crate::rng::BattleRng;
use crate::scheduler;
use crate::skill::SkillBook;
use crate::state::{BattleOutcome, BattleState, PendingAction, Phase, Rewards};
use crate::tactics::{self, Rally, TacticError};
use crate::weather::WeatherSnapshot;

/// Everything needed to start a battle. Immutable once the battle starts.
#[derive(Clone, Debug)]
pub struct BattleSetup {
    pub combatants: Vec<Combatant>,
    pub config: BattleConfig,
    pub skills: SkillBook,
    pub qte_definitions: Vec<QteDefinition>,
    pub combos: Vec<ComboDefinition>,
    pub difficulty: DifficultyProfile,
    pub weather: WeatherSnapshot,
    pub wave: u32,
    pub boss_appeared: bool,
    pub seed: u64,
}

impl BattleSetup {
    /// Setup with the built-in skills, timing challenges and combos.
    pub fn new(combatants: Vec<Combatant>, seed: u64) -> Self {
        Self {
            combatants,
            config: BattleConfig::default(),
            skills: SkillBook::standard(),
            qte_definitions: QteDefinition::standard(),
            combos: ComboDefinition::standard(),
            difficulty: DifficultyProfile::default(),
            weather: WeatherSnapshot::clear(),
            wave: 1,
            boss_appeared: false,
            seed,
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_weather(mut self, weather: WeatherSnapshot) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_difficulty(mut self, difficulty: DifficultyProfile) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_wave(mut self, wave: u32, boss_appeared: bool) -> Self {
        self.wave = wave;
        self.boss_appeared = boss_appeared;
        self
    }
}

/// What the controller is doing after a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickStatus {
    /// The battle has not started.
    Idle,
    /// A player-controlled combatant must submit an action.
    AwaitingInput { actor: CombatantId },
    /// A submitted action waits on a timing challenge.
    AwaitingTiming { actor: CombatantId, kind: QteKind },
    /// Turns are held while `side` performs a team combo.
    AwaitingCombo { side: Side },
    /// A turn or session advanced.
    Progressed,
    Ended(BattleOutcome),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ControllerError {
    #[error("battle is not in progress")]
    NotInProgress,

    #[error("it is not {0}'s turn to act")]
    NotPlayersTurn(CombatantId),

    #[error("an action is already waiting on a timing challenge")]
    ActionPending,

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Tactic(#[from] TacticError),
}

impl BattleError for ControllerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotInProgress | Self::NotPlayersTurn(_) => ErrorSeverity::Validation,
            Self::ActionPending => ErrorSeverity::Recoverable,
            Self::Action(error) => error.severity(),
            Self::Session(error) => error.severity(),
            Self::Tactic(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInProgress => "CONTROLLER_NOT_IN_PROGRESS",
            Self::NotPlayersTurn(_) => "CONTROLLER_NOT_PLAYERS_TURN",
            Self::ActionPending => "CONTROLLER_ACTION_PENDING",
            Self::Action(error) => error.error_code(),
            Self::Session(error) => error.error_code(),
            Self::Tactic(error) => error.error_code(),
        }
    }
}

pub struct BattleController {
    state: BattleState,
    config: BattleConfig,
    skills: SkillBook,
    qte: QteManager,
    combo: ComboManager,
    ai: AiSelector,
    rng: BattleRng,
    clock: f64,
    /// Combatant whose turn has started and not yet ended.
    active: Option<CombatantId>,
}

impl BattleController {
    pub fn new(setup: BattleSetup) -> Self {
        let BattleSetup {
            combatants,
            config,
            skills,
            qte_definitions,
            combos,
            difficulty,
            weather,
            wave,
            boss_appeared,
            seed,
        } = setup;

        Self {
            state: BattleState::new(Roster::new(combatants), wave, boss_appeared, weather),
            qte: QteManager::new(qte_definitions, config.timing),
            combo: ComboManager::new(combos, config.combo, &config.timing),
            ai: AiSelector::new(difficulty),
            rng: BattleRng::new(seed),
            clock: 0.0,
            active: None,
            config,
            skills,
        }
    }

    /// Moves the battle from preparation into its first round.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.state.phase != Phase::Preparation {
            return Err(ControllerError::NotInProgress);
        }
        self.state.phase = Phase::InProgress;
        info!(
            wave = self.state.wave,
            combatants = self.state.roster.len(),
            weather = %self.state.weather.kind,
            "battle started"
        );
        self.state.log.record(EventKind::BattleStarted {
            wave: self.state.wave,
            combatants: self.state.roster.len() as u32,
        });
        self.state.log.sfx("battle_start");

        if let Some(outcome) = scheduler::check_end(&self.state.roster) {
            self.end_battle(outcome);
        } else {
            self.start_round();
        }
        Ok(())
    }

    /// Advances the battle clock by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> TickStatus {
        match self.state.phase {
            Phase::Preparation => return TickStatus::Idle,
            Phase::Ended => return self.ended_status(),
            Phase::InProgress => {}
        }

        self.clock += dt;
        self.state.log.set_clock(self.clock);
        // A session that resolves this tick uses up the tick.
        if let Some(outcome) = self.qte.tick(dt) {
            self.finish_qte(outcome);
            return self.progress_status();
        }
        if let Some(outcome) = self.combo.tick(dt) {
            self.finish_combo(outcome);
            return self.progress_status();
        }
        if self.state.is_over() {
            return self.ended_status();
        }
        if let Some(pending) = &self.state.pending {
            return TickStatus::AwaitingTiming {
                actor: pending.request.actor,
                kind: pending.qte,
            };
        }
        if let Some(side) = self.combo.active_side() {
            return TickStatus::AwaitingCombo { side };
        }

        let actor = match self.active {
            Some(actor) => {
                self.state.turn_elapsed += dt;
                actor
            }
            None => match self.open_turn() {
                Some(actor) => actor,
                None if self.state.is_over() => return self.ended_status(),
                None => return TickStatus::Progressed,
            },
        };

        match self.control_of(actor) {
            Control::Ai => {
                self.run_ai_turn(actor);
                if self.state.is_over() {
                    self.ended_status()
                } else {
                    TickStatus::Progressed
                }
            }
            Control::Player if self.state.turn_elapsed >= self.config.turn_time_limit => {
                debug!(%actor, "player turn timed out");
                self.state.log.record(EventKind::TurnTimedOut { actor });
                self.end_turn(actor);
                TickStatus::Progressed
            }
            Control::Player => TickStatus::AwaitingInput { actor },
        }
    }

    /// Submits a player action for the combatant whose turn it is.
    ///
    /// Actions with a timing challenge return
    /// [`TickStatus::AwaitingTiming`]; the action resolves when the challenge
    /// does.
    pub fn submit_action(&mut self, request: ActionRequest) -> Result<TickStatus, ControllerError> {
        if self.state.phase != Phase::InProgress {
            return Err(ControllerError::NotInProgress);
        }
        self.check_players_turn(request.actor)?;
        if let Err(error) = resolve::check(&self.state.roster, &self.skills, &request) {
            warn!(actor = %request.actor, %error, "action rejected");
            self.state.log.record(EventKind::ActionRejected {
                actor: request.actor,
                reason: error.to_string(),
            });
            return Err(error.into());
        }

        let timing = match &request.kind {
            ActionKind::Attack => self.config.attack_qte,
            ActionKind::Skill(id) => self.skills.get(id).and_then(|def| def.qte),
            ActionKind::Defend | ActionKind::Wait => None,
        };
        if let Some(kind) = timing {
            if self.combo.is_active() {
                return Err(SessionError::AlreadyActive.into());
            }
            let actor = request.actor;
            let triggered = match self.state.roster.get(actor) {
                Some(combatant) => self.qte.trigger(kind, combatant),
                None => Err(SessionError::ActorDefeated(actor)),
            };
            match triggered {
                Ok(()) => {
                    let window = self.qte.definition(kind).map_or(0.0, |d| d.window);
                    self.state.log.record(EventKind::QteStarted { actor, kind, window });
                    self.state.log.sfx("qte_start");
                    self.state.pending = Some(PendingAction { request, qte: kind });
                    return Ok(TickStatus::AwaitingTiming { actor, kind });
                }
                Err(error @ SessionError::UnconfiguredQte(_)) => {
                    warn!(%actor, %error, "resolving without a timing challenge");
                    self.state.log.record(EventKind::QteRejected {
                        actor,
                        kind,
                        reason: error.to_string(),
                    });
                }
                Err(error) => return Err(error.into()),
            }
        }

        let actor = request.actor;
        let result = self.execute(&request, None);
        self.end_turn(actor);
        result?;
        Ok(self.progress_status())
    }

    /// Routes an input event to the active timing challenge, else to the
    /// active combo. Returns false when nothing consumed it.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.state.phase != Phase::InProgress {
            return false;
        }
        if self.qte.is_active() {
            if let Some(outcome) = self.qte.submit_input(event) {
                self.finish_qte(outcome);
            }
            return true;
        }
        if self.combo.is_active() {
            if let Some(outcome) = self.combo.handle_input(event) {
                self.finish_combo(outcome);
            }
            return true;
        }
        self.state.log.record(EventKind::InputIgnored);
        false
    }

    /// Starts a team combo for `side`.
    pub fn start_combo(&mut self, pair: ArchetypePair, side: Side) -> Result<(), ControllerError> {
        if self.state.phase != Phase::InProgress {
            return Err(ControllerError::NotInProgress);
        }
        let started = if self.qte.is_active() {
            Err(SessionError::AlreadyActive)
        } else {
            self.combo.start(pair, side, &self.state.roster)
        };
        if let Err(error) = started {
            warn!(%pair, %error, "combo rejected");
            self.state.log.record(EventKind::ComboRejected {
                reason: error.to_string(),
            });
            return Err(error.into());
        }

        let name = self.combo.active_name().unwrap_or_default().to_string();
        info!(%name, "combo started");
        self.state.log.record(EventKind::ComboStarted {
            name,
            participants: self.combo.participants().to_vec(),
        });
        self.state.log.sfx("combo_start");
        Ok(())
    }

    /// Spends the active player's morale on a rally. The turn stays open.
    pub fn rally(&mut self, actor: CombatantId, rally: Rally) -> Result<(), ControllerError> {
        if self.state.phase != Phase::InProgress {
            return Err(ControllerError::NotInProgress);
        }
        self.check_players_turn(actor)?;
        tactics::rally(rally, actor, &mut self.state.roster, &self.config, &mut self.state.log)?;
        Ok(())
    }

    /// Turns `target` against its own side. The caster's turn stays open.
    pub fn take_control(&mut self, caster: CombatantId, target: CombatantId) -> Result<(), ControllerError> {
        if self.state.phase != Phase::InProgress {
            return Err(ControllerError::NotInProgress);
        }
        self.check_players_turn(caster)?;
        if let Err(error) =
            tactics::take_control(caster, target, &mut self.state.roster, &self.config, &mut self.state.log)
        {
            warn!(%caster, %target, %error, "mind control rejected");
            return Err(error.into());
        }
        self.release_idle_taunts();
        Ok(())
    }

    /// Fails the active combo, if any.
    pub fn cancel_combo(&mut self) {
        if let Some(outcome) = self.combo.cancel() {
            self.finish_combo(outcome);
        }
    }

    /// Replaces the weather used from the next calculation on.
    pub fn set_weather(&mut self, weather: WeatherSnapshot) {
        if weather != self.state.weather {
            debug!(weather = %weather.kind, "weather changed");
            self.state.weather = weather;
        }
    }

    /// Ends the battle immediately without rewards.
    pub fn abort(&mut self) {
        if self.state.is_over() {
            return;
        }
        info!("battle aborted");
        self.qte.reset();
        self.combo.reset();
        self.state.pending = None;
        self.active = None;
        self.state.phase = Phase::Ended;
        self.state.outcome = Some(BattleOutcome::Aborted);
        self.state.log.record(EventKind::BattleAborted);
    }

    /// What the AI would do for `actor` right now. Does not consume the
    /// battle's random draws.
    pub fn ai_suggestion(&self, actor: CombatantId) -> ActionRequest {
        let mut rng = self.rng.clone();
        self.ai.choose(actor, &self.state.roster, &self.skills, &mut rng)
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        self.state.log.drain_commands()
    }

    pub fn event_log(&self) -> &[BattleEvent] {
        self.state.log.events()
    }

    pub fn rewards(&self) -> Option<&Rewards> {
        self.state.rewards.as_ref()
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.state.outcome
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.state.roster
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn skills(&self) -> &SkillBook {
        &self.skills
    }

    pub fn qte(&self) -> &QteManager {
        &self.qte
    }

    pub fn combo(&self) -> &ComboManager {
        &self.combo
    }

    /// Combatant whose turn is in progress.
    pub fn active(&self) -> Option<CombatantId> {
        self.active
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    // ===== turn flow =====

    /// Who decides `actor`'s moves: a controlled combatant follows its
    /// caster.
    fn control_of(&self, actor: CombatantId) -> Control {
        let roster = &self.state.roster;
        let Some(combatant) = roster.get(actor) else {
            return Control::Ai;
        };
        combatant
            .controlled_by()
            .and_then(|caster| roster.get(caster))
            .map_or(combatant.control, |caster| caster.control)
    }

    fn check_players_turn(&self, actor: CombatantId) -> Result<(), ControllerError> {
        if self.state.pending.is_some() || self.qte.is_active() {
            return Err(ControllerError::ActionPending);
        }
        if self.active != Some(actor) || self.control_of(actor) != Control::Player {
            return Err(ControllerError::NotPlayersTurn(actor));
        }
        Ok(())
    }

    fn start_round(&mut self) {
        let order = self
            .state
            .scheduler
            .start_round(&self.state.roster, &self.state.weather)
            .to_vec();
        let round = self.state.scheduler.round();
        debug!(round, ?order, "round started");
        self.state.log.record(EventKind::RoundStarted { round, order });
    }

    /// Starts the next turn. Returns the actor when it may act; `None` when
    /// the turn was skipped or the battle ended.
    fn open_turn(&mut self) -> Option<CombatantId> {
        let actor = loop {
            if let Some(actor) = self.state.scheduler.next_living(&self.state.roster) {
                break actor;
            }
            if let Some(outcome) = scheduler::check_end(&self.state.roster) {
                self.end_battle(outcome);
                return None;
            }
            if self.state.scheduler.round() >= self.config.max_rounds {
                warn!(rounds = self.config.max_rounds, "round cap reached");
                self.end_battle(BattleOutcome::Defeat);
                return None;
            }
            self.start_round();
        };

        self.state.turn += 1;
        self.state.turn_elapsed = 0.0;
        self.state.log.set_turn(self.state.turn);
        self.state.log.record(EventKind::TurnStarted { actor });

        if self.begin_turn(actor) {
            self.active = Some(actor);
            Some(actor)
        } else {
            self.end_turn(actor);
            None
        }
    }

    /// Turn-start upkeep. Returns false when the actor cannot act.
    fn begin_turn(&mut self, actor: CombatantId) -> bool {
        let floor = self.config.mitigation.poison_tick_floor;
        tactics::release_orphaned(actor, &mut self.state.roster, &mut self.state.log);
        let Some(combatant) = self.state.roster.get_mut(actor) else {
            return false;
        };

        for effect in combatant.status.expire() {
            self.state.log.record(EventKind::StatusExpired {
                target: actor,
                status: effect.kind,
            });
        }

        if let Some(poison) = combatant.status.get(StatusKind::Poisoned).copied() {
            let amount = combatant.take_damage(poison.magnitude.max(floor));
            let hp_after = combatant.hp();
            self.state.log.record(EventKind::StatusTicked {
                target: actor,
                status: StatusKind::Poisoned,
                amount,
                hp_after,
            });
            self.state.log.effect(EffectCue::Debuff, actor, amount);
            if !combatant.is_alive() {
                self.state.log.record(EventKind::Defeated {
                    target: actor,
                    by: poison.source,
                });
                self.state.log.effect(EffectCue::Defeat, actor, 0.0);
                self.state.log.record(EventKind::TurnSkipped {
                    actor,
                    reason: SkipReason::Defeated,
                });
                self.release_idle_taunts();
                return false;
            }
        }

        combatant.tick_cooldowns();
        let stunned = combatant.is_incapacitated();
        self.release_idle_taunts();

        if stunned {
            debug!(%actor, "stunned, turn skipped");
            self.state.log.record(EventKind::TurnSkipped {
                actor,
                reason: SkipReason::Stunned,
            });
            return false;
        }
        true
    }

    /// Frees threat meters whose taunt no longer holds anyone.
    fn release_idle_taunts(&mut self) {
        let roster = &self.state.roster;
        let idle: Vec<CombatantId> = roster
            .iter()
            .filter(|holder| holder.meter.is_taunt_active())
            .filter(|holder| !roster.living().any(|c| c.taunted_by() == Some(holder.id)))
            .map(|holder| holder.id)
            .collect();
        for id in idle {
            if let Some(holder) = self.state.roster.get_mut(id) {
                holder.meter.release_taunt();
            }
        }
    }

    fn end_turn(&mut self, actor: CombatantId) {
        if let Some(combatant) = self.state.roster.get_mut(actor) {
            combatant.status.decrement();
        }
        self.state.scheduler.advance();
        self.active = None;
        self.state.turn_elapsed = 0.0;
        if !self.state.is_over() {
            if let Some(outcome) = scheduler::check_end(&self.state.roster) {
                self.end_battle(outcome);
            }
        }
    }

    fn run_ai_turn(&mut self, actor: CombatantId) {
        let request = self
            .ai
            .choose(actor, &self.state.roster, &self.skills, &mut self.rng);
        if self.execute(&request, None).is_err() {
            // The choice was stale; a plain wait keeps the turn moving.
            let _ = self.execute(&ActionRequest::wait(actor), None);
        }
        self.end_turn(actor);
    }

    /// Runs the resolution pipeline and checks for the end of the battle.
    fn execute(&mut self, request: &ActionRequest, timing: Option<f64>) -> Result<ActionOutcome, ActionError> {
        let mut ctx = ResolveContext {
            roster: &mut self.state.roster,
            skills: &self.skills,
            config: &self.config,
            weather: &self.state.weather,
            rng: &mut self.rng,
            log: &mut self.state.log,
        };
        let outcome = resolve::resolve(&mut ctx, request, timing)?;
        if !outcome.defeated.is_empty() {
            self.release_idle_taunts();
            if let Some(result) = scheduler::check_end(&self.state.roster) {
                self.end_battle(result);
            }
        }
        Ok(outcome)
    }

    // ===== sessions =====

    fn finish_qte(&mut self, outcome: QteOutcome) {
        let max = self.config.morale.max;
        if let Some(actor) = self.state.roster.get_mut(outcome.actor) {
            actor.adjust_morale(outcome.morale_delta, max);
        }
        self.state.log.record(EventKind::QteResolved {
            actor: outcome.actor,
            kind: outcome.kind,
            rating: outcome.rating,
            multiplier: outcome.multiplier,
        });
        if let Some(adjustment) = outcome.adjustment {
            self.state.log.record(EventKind::QteWindowsAdjusted {
                success_rate: adjustment.success_rate,
                factor: adjustment.factor,
            });
        }
        self.state.log.sfx(&format!("qte_{}", outcome.rating));

        let Some(pending) = self.state.pending.take() else {
            return;
        };
        let actor = pending.request.actor;
        // Rejections are already logged by the pipeline.
        let _ = self.execute(&pending.request, Some(outcome.multiplier));
        self.end_turn(actor);
    }

    fn finish_combo(&mut self, outcome: ComboOutcome) {
        let defeated = combo::apply_outcome(
            &outcome,
            &mut self.state.roster,
            &self.config,
            &mut self.state.log,
        );
        if !defeated.is_empty() {
            self.release_idle_taunts();
        }
        if let Some(result) = scheduler::check_end(&self.state.roster) {
            self.end_battle(result);
        }
    }

    fn end_battle(&mut self, outcome: BattleOutcome) {
        if self.state.is_over() {
            return;
        }
        let rewards = scheduler::compute_rewards(
            outcome,
            self.state.wave,
            self.state.boss_defeated(),
            &self.config.rewards,
        );
        info!(%outcome, exp = rewards.exp, gold = rewards.gold, "battle ended");

        self.qte.reset();
        self.combo.reset();
        self.state.pending = None;
        self.active = None;
        self.state.phase = Phase::Ended;
        self.state.outcome = Some(outcome);
        self.state.rewards = Some(rewards.clone());
        self.state.log.record(EventKind::BattleEnded { outcome, rewards });
        self.state.log.sfx(match outcome {
            BattleOutcome::Victory => "victory",
            BattleOutcome::Defeat | BattleOutcome::Aborted => "defeat",
        });
    }

    fn ended_status(&self) -> TickStatus {
        self.state
            .outcome
            .map_or(TickStatus::Idle, TickStatus::Ended)
    }

    fn progress_status(&self) -> TickStatus {
        if self.state.is_over() {
            self.ended_status()
        } else {
            TickStatus::Progressed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Archetype, CombatStats};
    use crate::qte::Key;

    fn stats(max_hp: f64, attack: f64, speed: f64) -> CombatStats {
        CombatStats {
            max_hp,
            attack,
            defense: 0.0,
            speed,
            crit_chance: 0.0,
            crit_damage: 1.5,
            dodge_chance: 0.0,
        }
    }

    fn quiet_config() -> BattleConfig {
        let mut config = BattleConfig::default();
        config.mitigation.block_chance = 0.0;
        config.mitigation.counter_chance = 0.0;
        config
    }

    /// One player warrior (fast) against one enemy warrior.
    fn duel(player_hp: f64, enemy_hp: f64) -> BattleController {
        let hero = Combatant::new("Hero", Side::Player, Archetype::Warrior, stats(player_hp, 30.0, 20.0))
            .with_skills(SkillBook::standard_loadout(Archetype::Warrior))
            .with_morale(50.0, 100.0);
        let orc = Combatant::new("Orc", Side::Enemy, Archetype::Warrior, stats(enemy_hp, 10.0, 5.0))
            .with_morale(50.0, 100.0);
        let mut controller =
            BattleController::new(BattleSetup::new(vec![hero, orc], 42).with_config(quiet_config()));
        controller.start().unwrap();
        controller
    }

    #[test]
    fn start_logs_battle_and_round() {
        let controller = duel(100.0, 100.0);
        let kinds: Vec<_> = controller.event_log().iter().map(|e| &e.kind).collect();
        assert!(matches!(kinds[0], EventKind::BattleStarted { wave: 1, combatants: 2 }));
        assert!(matches!(kinds[1], EventKind::RoundStarted { round: 1, .. }));
    }

    #[test]
    fn player_turn_waits_for_input() {
        let mut controller = duel(100.0, 100.0);
        assert_eq!(
            controller.tick(0.1),
            TickStatus::AwaitingInput {
                actor: CombatantId(0)
            }
        );
        assert_eq!(
            controller.submit_action(ActionRequest::attack(CombatantId(1), CombatantId(0))),
            Err(ControllerError::NotPlayersTurn(CombatantId(1)))
        );
    }

    #[test]
    fn attack_waits_on_timing_then_resolves_with_multiplier() {
        let mut controller = duel(100.0, 100.0);
        controller.tick(0.1);
        let status = controller
            .submit_action(ActionRequest::attack(CombatantId(0), CombatantId(1)))
            .unwrap();
        assert_eq!(
            status,
            TickStatus::AwaitingTiming {
                actor: CombatantId(0),
                kind: QteKind::Press
            }
        );
        assert_eq!(
            controller.submit_action(ActionRequest::attack(CombatantId(0), CombatantId(1))),
            Err(ControllerError::ActionPending)
        );

        let at = controller.clock();
        assert!(controller.handle_input(&InputEvent::KeyDown { key: Key::Space, at }));

        // perfect press: 30 × 1.5
        let orc = controller.roster().get(CombatantId(1)).unwrap();
        assert_eq!(orc.hp(), 55.0);
        assert!(controller.state().pending.is_none());
        assert!(controller.event_log().iter().any(|e| matches!(
            e.kind,
            EventKind::QteResolved {
                rating: crate::qte::QteRating::Perfect,
                ..
            }
        )));
    }

    #[test]
    fn qte_timeout_resolves_once_as_miss() {
        let mut controller = duel(100.0, 100.0);
        controller.tick(0.1);
        controller
            .submit_action(ActionRequest::attack(CombatantId(0), CombatantId(1)))
            .unwrap();
        for _ in 0..30 {
            controller.tick(0.1);
        }
        let resolved = controller
            .event_log()
            .iter()
            .filter(|e| matches!(e.kind, EventKind::QteResolved { .. }))
            .count();
        assert_eq!(resolved, 1);
        // miss: 30 × 0.8
        assert!(controller.roster().get(CombatantId(1)).unwrap().hp() <= 76.0);
    }

    #[test]
    fn qte_timeout_spends_the_whole_tick() {
        let mut controller = duel(100.0, 100.0);
        controller.tick(0.1);
        controller
            .submit_action(ActionRequest::attack(CombatantId(0), CombatantId(1)))
            .unwrap();

        let used = |controller: &BattleController| -> Vec<CombatantId> {
            controller
                .event_log()
                .iter()
                .filter_map(|e| match e.kind {
                    EventKind::ActionUsed { actor, .. } => Some(actor),
                    _ => None,
                })
                .collect()
        };
        let mut status = TickStatus::Idle;
        for _ in 0..100 {
            status = controller.tick(0.1);
            if controller.state().pending.is_none() {
                break;
            }
        }
        assert_eq!(status, TickStatus::Progressed);
        assert_eq!(used(&controller), vec![CombatantId(0)]);

        assert_eq!(controller.tick(0.1), TickStatus::Progressed);
        assert_eq!(used(&controller), vec![CombatantId(0), CombatantId(1)]);
    }

    #[test]
    fn turns_hold_while_a_combo_runs() {
        let tank = Combatant::new("Wall", Side::Player, Archetype::Tanker, stats(100.0, 20.0, 10.0));
        let blade = Combatant::new("Blade", Side::Player, Archetype::Warrior, stats(100.0, 30.0, 8.0));
        let orc = Combatant::new("Orc", Side::Enemy, Archetype::Warrior, stats(500.0, 10.0, 30.0));
        let mut controller = BattleController::new(
            BattleSetup::new(vec![tank, blade, orc], 5).with_config(quiet_config()),
        );
        controller.start().unwrap();
        let pair = ArchetypePair::new(
            crate::combatant::ArchetypeFamily::Tank,
            crate::combatant::ArchetypeFamily::Warrior,
        );
        controller.start_combo(pair, Side::Player).unwrap();

        for _ in 0..10 {
            assert_eq!(
                controller.tick(0.05),
                TickStatus::AwaitingCombo { side: Side::Player }
            );
        }
        assert!(!controller.event_log().iter().any(|e| matches!(
            e.kind,
            EventKind::TurnStarted { .. } | EventKind::ActionUsed { .. }
        )));

        let at = controller.clock();
        controller.handle_input(&InputEvent::KeyDown { key: Key::Q, at });
        controller.handle_input(&InputEvent::KeyDown { key: Key::W, at });
        assert!(!controller.combo().is_active());

        assert_eq!(controller.tick(0.05), TickStatus::Progressed);
        assert!(controller
            .event_log()
            .iter()
            .any(|e| matches!(e.kind, EventKind::ActionUsed { actor, .. } if actor == CombatantId(2))));
    }

    #[test]
    fn boost_leaves_the_turn_open_and_raises_damage() {
        let mut controller = duel(100.0, 100.0);
        controller.tick(0.1);
        controller.rally(CombatantId(0), Rally::Boost).unwrap();
        assert_eq!(controller.roster().get(CombatantId(0)).unwrap().morale(), 30.0);
        assert_eq!(
            controller.tick(0.1),
            TickStatus::AwaitingInput {
                actor: CombatantId(0)
            }
        );

        controller
            .submit_action(ActionRequest::attack(CombatantId(0), CombatantId(1)))
            .unwrap();
        let at = controller.clock();
        controller.handle_input(&InputEvent::KeyDown { key: Key::Space, at });

        // perfect press with the boost: 30 × 1.5 × 1.3
        let orc = controller.roster().get(CombatantId(1)).unwrap();
        assert!((orc.hp() - 41.5).abs() < 1e-9);
    }

    #[test]
    fn rally_needs_morale_and_the_actors_turn() {
        let mut controller = duel(100.0, 100.0);
        controller.tick(0.1);
        assert_eq!(
            controller.rally(CombatantId(1), Rally::Boost),
            Err(ControllerError::NotPlayersTurn(CombatantId(1)))
        );
        controller.rally(CombatantId(0), Rally::Boost).unwrap();
        controller.rally(CombatantId(0), Rally::Boost).unwrap();

        let error = controller.rally(CombatantId(0), Rally::Inspire).unwrap_err();
        assert_eq!(
            error,
            ControllerError::Tactic(TacticError::InsufficientMorale {
                actor: CombatantId(0),
                needed: 30.0,
                available: 10.0,
            })
        );
        assert_eq!(error.error_code(), "TACTIC_INSUFFICIENT_MORALE");
        let rallies = controller
            .event_log()
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Rallied { .. }))
            .count();
        assert_eq!(rallies, 2);
    }

    /// Player witch (fastest) against an orc and an imp; attacks skip timing.
    fn skirmish() -> BattleController {
        let mut config = quiet_config();
        config.attack_qte = None;
        let witch = Combatant::new("Witch", Side::Player, Archetype::Witch, stats(1000.0, 30.0, 20.0))
            .with_morale(50.0, 100.0);
        let orc = Combatant::new("Orc", Side::Enemy, Archetype::Warrior, stats(100.0, 10.0, 10.0))
            .with_morale(50.0, 100.0);
        let imp = Combatant::new("Imp", Side::Enemy, Archetype::Ranger, stats(100.0, 10.0, 5.0))
            .with_morale(50.0, 100.0);
        let mut controller =
            BattleController::new(BattleSetup::new(vec![witch, orc, imp], 8).with_config(config));
        controller.start().unwrap();
        controller
    }

    /// Ticks through AI turns until the battle waits on someone.
    fn next_wait(controller: &mut BattleController) -> TickStatus {
        for _ in 0..20 {
            let status = controller.tick(0.1);
            if status != TickStatus::Progressed {
                return status;
            }
        }
        TickStatus::Progressed
    }

    #[test]
    fn controlled_enemy_takes_orders_from_its_caster() {
        let mut controller = skirmish();
        let witch = CombatantId(0);
        let orc = CombatantId(1);
        let imp = CombatantId(2);
        assert_eq!(next_wait(&mut controller), TickStatus::AwaitingInput { actor: witch });

        controller.take_control(witch, orc).unwrap();
        assert_eq!(
            controller.tick(0.1),
            TickStatus::AwaitingInput { actor: witch }
        );
        controller.submit_action(ActionRequest::wait(witch)).unwrap();

        assert_eq!(next_wait(&mut controller), TickStatus::AwaitingInput { actor: orc });
        assert!(matches!(
            controller.submit_action(ActionRequest::attack(orc, witch)),
            Err(ControllerError::Action(_))
        ));
        controller.submit_action(ActionRequest::attack(orc, imp)).unwrap();
        assert!(controller.roster().get(imp).unwrap().hp() < 100.0);
        assert_eq!(controller.roster().get(witch).unwrap().hp(), 1000.0);
    }

    #[test]
    fn control_runs_out_after_two_turns_and_cools_down() {
        let mut controller = skirmish();
        let witch = CombatantId(0);
        let orc = CombatantId(1);
        next_wait(&mut controller);
        controller.take_control(witch, orc).unwrap();
        controller.submit_action(ActionRequest::wait(witch)).unwrap();
        assert_eq!(next_wait(&mut controller), TickStatus::AwaitingInput { actor: orc });
        controller.submit_action(ActionRequest::wait(orc)).unwrap();

        assert_eq!(next_wait(&mut controller), TickStatus::AwaitingInput { actor: witch });
        assert_eq!(
            controller.take_control(witch, CombatantId(2)),
            Err(ControllerError::Tactic(TacticError::ControlCooldown {
                actor: witch,
                remaining: 4,
            }))
        );
        controller.submit_action(ActionRequest::wait(witch)).unwrap();
        assert_eq!(next_wait(&mut controller), TickStatus::AwaitingInput { actor: orc });
        controller.submit_action(ActionRequest::wait(orc)).unwrap();

        // Third orc turn: control has lapsed and the AI moves it again.
        assert_eq!(next_wait(&mut controller), TickStatus::AwaitingInput { actor: witch });
        controller.submit_action(ActionRequest::wait(witch)).unwrap();
        assert_eq!(next_wait(&mut controller), TickStatus::AwaitingInput { actor: witch });
        assert!(controller.event_log().iter().any(|e| matches!(
            e.kind,
            EventKind::StatusExpired {
                target,
                status: StatusKind::Controlled,
            } if target == orc
        )));
        assert_eq!(controller.roster().get(orc).unwrap().allegiance(), Side::Enemy);
    }

    #[test]
    fn player_turn_times_out_without_action() {
        let mut controller = duel(100.0, 100.0);
        controller.tick(0.1);
        let mut status = TickStatus::Idle;
        for _ in 0..31 {
            status = controller.tick(1.0);
            if status == TickStatus::Progressed {
                break;
            }
        }
        assert_eq!(status, TickStatus::Progressed);
        assert!(controller
            .event_log()
            .iter()
            .any(|e| matches!(e.kind, EventKind::TurnTimedOut { actor } if actor == CombatantId(0))));
        assert_eq!(controller.roster().get(CombatantId(1)).unwrap().hp(), 100.0);
    }

    #[test]
    fn defend_resolves_immediately_and_ai_acts_next() {
        let mut controller = duel(100.0, 100.0);
        controller.tick(0.1);
        let status = controller
            .submit_action(ActionRequest::defend(CombatantId(0)))
            .unwrap();
        assert_eq!(status, TickStatus::Progressed);
        assert_eq!(controller.tick(0.1), TickStatus::Progressed);
        assert!(controller
            .event_log()
            .iter()
            .any(|e| matches!(e.kind, EventKind::ActionUsed { actor, .. } if actor == CombatantId(1))));
    }

    #[test]
    fn killing_the_last_enemy_ends_in_victory() {
        let mut controller = duel(100.0, 10.0);
        controller.tick(0.1);
        controller
            .submit_action(ActionRequest::skill(CombatantId(0), "charge_slash", vec![CombatantId(1)]))
            .unwrap();
        let at = controller.clock();
        for key in [Key::Q, Key::W, Key::E] {
            controller.handle_input(&InputEvent::KeyDown { key, at });
        }

        assert_eq!(controller.outcome(), Some(BattleOutcome::Victory));
        let rewards = controller.rewards().unwrap();
        assert_eq!(rewards.exp, 110);
        assert_eq!(controller.tick(0.1), TickStatus::Ended(BattleOutcome::Victory));
        assert!(matches!(
            controller.event_log().last().unwrap().kind,
            EventKind::BattleEnded {
                outcome: BattleOutcome::Victory,
                ..
            }
        ));
    }

    #[test]
    fn input_without_session_is_ignored() {
        let mut controller = duel(100.0, 100.0);
        assert!(!controller.handle_input(&InputEvent::KeyDown {
            key: Key::Space,
            at: 0.0
        }));
        assert!(matches!(
            controller.event_log().last().unwrap().kind,
            EventKind::InputIgnored
        ));
    }

    #[test]
    fn abort_ends_without_rewards() {
        let mut controller = duel(100.0, 100.0);
        controller.abort();
        assert_eq!(controller.outcome(), Some(BattleOutcome::Aborted));
        assert!(controller.rewards().is_none());
        assert_eq!(controller.tick(0.1), TickStatus::Ended(BattleOutcome::Aborted));
        assert!(matches!(
            controller.submit_action(ActionRequest::wait(CombatantId(0))),
            Err(ControllerError::NotInProgress)
        ));
    }

    #[test]
    fn combo_blocks_timing_challenges() {
        let tank = Combatant::new("Wall", Side::Player, Archetype::Tanker, stats(100.0, 20.0, 20.0));
        let blade = Combatant::new("Blade", Side::Player, Archetype::Warrior, stats(100.0, 30.0, 15.0));
        let orc = Combatant::new("Orc", Side::Enemy, Archetype::Warrior, stats(100.0, 10.0, 5.0));
        let mut controller = BattleController::new(
            BattleSetup::new(vec![tank, blade, orc], 3).with_config(quiet_config()),
        );
        controller.start().unwrap();
        controller.tick(0.1);

        let pair = ArchetypePair::new(
            crate::combatant::ArchetypeFamily::Tank,
            crate::combatant::ArchetypeFamily::Warrior,
        );
        controller.start_combo(pair, Side::Player).unwrap();
        assert_eq!(
            controller.start_combo(pair, Side::Player),
            Err(ControllerError::Session(SessionError::AlreadyActive))
        );
        assert_eq!(
            controller.submit_action(ActionRequest::attack(CombatantId(0), CombatantId(2))),
            Err(ControllerError::Session(SessionError::AlreadyActive))
        );
    }

    #[test]
    fn ai_suggestion_leaves_draws_untouched() {
        let controller = duel(100.0, 100.0);
        let before = controller.rng.draws();
        let suggestion = controller.ai_suggestion(CombatantId(1));
        assert_eq!(suggestion.actor, CombatantId(1));
        assert_eq!(controller.rng.draws(), before);
    }
}
