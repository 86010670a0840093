//! Per-tick simulation loop: the action in flight, death cleanup and the opponent step.

use tracing::{info, warn};

use super::*;
use crate::actions::ActionProgress;
use crate::error::SimError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceStopReason {
    Finished(BattleOutcome),
    /// Player phase with nothing executing; the host must issue a command.
    AwaitingPlayer,
    BudgetExhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvanceResult {
    pub simulated_ticks: u32,
    pub stop_reason: AdvanceStopReason,
}

impl Simulation {
    /// Runs fixed steps of `dt` seconds until the battle ends, the player must
    /// act, or the step budget runs out.
    pub fn advance(&mut self, dt: f32, max_steps: u32) -> AdvanceResult {
        let mut steps = 0;
        loop {
            if let Some(outcome) = self.outcome() {
                return AdvanceResult {
                    simulated_ticks: steps,
                    stop_reason: AdvanceStopReason::Finished(outcome),
                };
            }
            if self.turn.is_player_phase() && self.active.is_none() {
                return AdvanceResult {
                    simulated_ticks: steps,
                    stop_reason: AdvanceStopReason::AwaitingPlayer,
                };
            }
            if steps >= max_steps {
                return AdvanceResult {
                    simulated_ticks: steps,
                    stop_reason: AdvanceStopReason::BudgetExhausted,
                };
            }
            self.tick(dt);
            steps += 1;
        }
    }

    /// One cooperative step: the action in flight, then cleanup, then the opponent controller.
    pub fn tick(&mut self, dt: f32) {
        self.tick += 1;

        if let Some(active) = self.active {
            match action_in(&mut self.actions, active.unit, active.kind) {
                Some(action) => {
                    if action.tick(&mut self.board, active.unit, dt) == ActionProgress::Completed {
                        self.finish_active(active);
                    }
                }
                None => {
                    warn!(unit = ?active.unit, action = ?active.kind, "active action lost its unit");
                    self.finish_active(active);
                }
            }
        }

        self.reap_fallen();

        if self.turn.phase() == Phase::Opponent {
            self.tick_opponent(dt);
        }
    }

    pub(super) fn start_action(
        &mut self,
        unit: UnitId,
        kind: ActionKind,
        cell: GridPos,
        driver: Driver,
    ) -> Result<ActionProgress, SimError> {
        if self.active.is_some() {
            return Err(SimError::Busy);
        }
        let action = action_in(&mut self.actions, unit, kind)
            .ok_or(SimError::ActionNotOwned { unit, action: kind })?;
        let progress = action.take_action(&mut self.board, unit, cell)?;
        self.board.events.push(SimEvent::ActionStarted { unit, action: kind });

        let active = ActiveAction { unit, kind, driver };
        match progress {
            ActionProgress::Running => self.active = Some(active),
            ActionProgress::Completed => self.finish_active(active),
        }
        Ok(progress)
    }

    fn finish_active(&mut self, active: ActiveAction) {
        self.active = None;
        self.board.events.push(SimEvent::ActionCompleted { unit: active.unit, action: active.kind });
        if active.driver == Driver::Player && self.selection.busy {
            self.selection.busy = false;
            self.board.events.push(SimEvent::BusyChanged);
        }
    }

    /// Grid first, then turn subscriptions, then the registry.
    fn reap_fallen(&mut self) {
        for id in self.board.take_fallen() {
            let Some(pos) = self.board.unit(id).map(|unit| unit.pos) else {
                continue;
            };
            self.board.grid.remove_occupant(pos, id);
            self.turn.unsubscribe(id);
            let removed = self.board.units.remove(id);
            self.actions.remove(id);
            self.opponent.queue.retain(|&queued| queued != id);
            if self.selection.unit == Some(id) {
                self.selection.unit = None;
                self.selection.action = None;
                self.board.events.push(SimEvent::SelectedUnitChanged);
            }
            if let Some(unit) = removed {
                info!(unit = %unit.name, %pos, "unit removed from battle");
            }
            self.board.events.push(SimEvent::UnitDied { unit: id });
        }
    }
}
