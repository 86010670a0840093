//! Turn-change dispatch to subscribed units and the opponent controller.
//! Subscribers observe a consistent state: the phase flag and every action point
//! reset are applied before `TurnChanged` is emitted.

use tracing::info;

use super::*;
use crate::error::SimError;

impl Simulation {
    /// Ends the player's phase. Rejected while an action is executing.
    pub fn end_turn(&mut self) -> Result<(), SimError> {
        if self.selection.busy || self.active.is_some() {
            return Err(SimError::Busy);
        }
        if !self.turn.is_player_phase() {
            return Err(SimError::WrongPhase { unit: None, phase: self.turn.phase() });
        }
        self.advance_turn();
        Ok(())
    }

    /// Flips the phase and refills the units whose phase begins. Their conditions
    /// are shed here too, so a condition earned in one phase lasts through one full
    /// opposing cycle.
    pub(super) fn advance_turn(&mut self) {
        let phase = self.turn.advance_turn();
        self.invalidate_paths();

        for &id in self.turn.subscribers() {
            let Some(unit) = self.board.units.get_mut(id) else {
                continue;
            };
            if unit.faction.phase() != phase {
                continue;
            }
            // Own phase entry: refill points, shed conditions earned last phase.
            unit.action_points = unit.action_point_max;
            unit.conditions.clear();
            self.board.events.push(SimEvent::ActionPointsChanged { unit: id });
        }

        let turn = self.turn.turn();
        self.board.events.push(SimEvent::TurnChanged { turn, phase });
        info!(turn, ?phase, "turn changed");

        self.opponent.state = match phase {
            Phase::Opponent => OpponentState::StartingPhase,
            Phase::Player => OpponentState::WaitingForTurn,
        };
        self.opponent.queue.clear();
        self.opponent.current = None;
    }
}
