//! Battle-wide state owned by the controller.
use crate::combatant::Roster;
use crate::event::BattleLog;
use crate::qte::QteKind;
use crate::resolve::ActionRequest;
use crate::scheduler::TurnScheduler;
use crate::weather::WeatherSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    #[default]
    Preparation,
    InProgress,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Aborted,
}

/// Hand-off to the caller when a battle ends.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rewards {
    pub exp: u32,
    pub gold: u32,
    pub items: Vec<String>,
}

/// A validated request waiting on the result of a timing challenge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingAction {
    pub request: ActionRequest,
    pub qte: QteKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BattleState {
    pub phase: Phase,
    pub outcome: Option<BattleOutcome>,
    pub roster: Roster,
    pub scheduler: TurnScheduler,
    pub wave: u32,
    pub boss_appeared: bool,
    pub weather: WeatherSnapshot,
    pub log: BattleLog,
    pub pending: Option<PendingAction>,
    pub rewards: Option<Rewards>,
    /// Turns started so far, across all rounds.
    pub turn: u32,
    /// Seconds the current player turn has been waiting for input.
    pub turn_elapsed: f64,
}

impl BattleState {
    pub fn new(roster: Roster, wave: u32, boss_appeared: bool, weather: WeatherSnapshot) -> Self {
        Self {
            phase: Phase::Preparation,
            outcome: None,
            roster,
            scheduler: TurnScheduler::new(),
            wave,
            boss_appeared,
            weather,
            log: BattleLog::new(),
            pending: None,
            rewards: None,
            turn: 0,
            turn_elapsed: 0.0,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// True once any boss-flagged combatant has fallen.
    pub fn boss_defeated(&self) -> bool {
        self.roster.iter().any(|c| c.is_boss() && !c.is_alive())
    }
}
