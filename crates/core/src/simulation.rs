//! The simulation context: one battlefield, its units' actions, the turn state and both controllers.
//! This file owns the shared struct and read-only queries; behavior lives in focused submodules.

use std::collections::VecDeque;

use slotmap::SecondaryMap;

use crate::actions::{Action, Candidate, UnitAction};
use crate::state::{Battlefield, Unit};
use crate::turn::TurnController;
use crate::types::*;

mod advance;
mod bootstrap;
mod hash;
mod opponent;
mod selection;
mod terrain;
mod turns;

#[cfg(test)]
mod test_support;

pub use advance::{AdvanceResult, AdvanceStopReason};

/// Which controller started the action in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Driver {
    Player,
    Opponent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ActiveAction {
    unit: UnitId,
    kind: ActionKind,
    driver: Driver,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OpponentState {
    WaitingForTurn,
    StartingPhase,
    SelectingUnit,
    SelectingAction,
    /// Observability pause before the chosen action runs.
    Thinking { remaining: f32, choice: Candidate },
    Executing,
    EndingPhase,
}

#[derive(Clone, Debug)]
struct OpponentController {
    state: OpponentState,
    queue: VecDeque<UnitId>,
    current: Option<UnitId>,
    recoveries: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Selection {
    unit: Option<UnitId>,
    action: Option<ActionKind>,
    busy: bool,
}

pub struct Simulation {
    seed: u64,
    tick: u64,
    board: Battlefield,
    actions: SecondaryMap<UnitId, Vec<UnitAction>>,
    turn: TurnController,
    opponent: OpponentController,
    selection: Selection,
    active: Option<ActiveAction>,
}

impl Simulation {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn phase(&self) -> Phase {
        self.turn.phase()
    }

    pub fn turn(&self) -> u32 {
        self.turn.turn()
    }

    pub fn is_player_phase(&self) -> bool {
        self.turn.is_player_phase()
    }

    pub fn board(&self) -> &Battlefield {
        &self.board
    }

    pub fn turn_controller(&self) -> &TurnController {
        &self.turn
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.board.unit(id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.board.units.values()
    }

    pub fn units_of(&self, faction: Faction) -> Vec<UnitId> {
        self.board.units_of(faction)
    }

    pub fn opponents_of(&self, id: UnitId) -> Vec<UnitId> {
        self.board.opponents_of(id)
    }

    pub fn unit_at(&self, pos: GridPos) -> Option<&Unit> {
        self.board.unit_at(pos)
    }

    pub fn action_kinds(&self, id: UnitId) -> Vec<ActionKind> {
        self.actions
            .get(id)
            .map(|list| list.iter().map(|action| action.kind()).collect())
            .unwrap_or_default()
    }

    pub fn action_cost(&self, id: UnitId, kind: ActionKind) -> Option<u32> {
        self.actions
            .get(id)?
            .iter()
            .find(|action| action.kind() == kind)
            .map(|action| action.action_point_cost())
    }

    pub fn opponent_state(&self) -> OpponentState {
        self.opponent.state
    }

    /// Unit and kind of the action currently executing, if any.
    pub fn active_action(&self) -> Option<(UnitId, ActionKind)> {
        self.active.map(|active| (active.unit, active.kind))
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        let players = self.board.units.values().any(|unit| unit.faction == Faction::Player);
        let opponents = self.board.units.values().any(|unit| unit.faction == Faction::Opponent);
        match (players, opponents) {
            (false, _) => Some(BattleOutcome::OpponentsWin),
            (true, false) => Some(BattleOutcome::PlayersWin),
            (true, true) => None,
        }
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.board.events.drain(..).collect()
    }
}

/// Borrows only the action table so callers can hold the battlefield mutably alongside.
fn action_in(
    actions: &mut SecondaryMap<UnitId, Vec<UnitAction>>,
    unit: UnitId,
    kind: ActionKind,
) -> Option<&mut UnitAction> {
    actions.get_mut(unit)?.iter_mut().find(|action| action.kind() == kind)
}
