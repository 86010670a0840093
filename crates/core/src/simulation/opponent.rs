//! Decision state machine for the non-player side.
//! This module exists to walk opponent units one at a time, score every affordable
//! action and execute the winner. It does not score cells itself; actions do.
//! Every transition takes one tick, and no state can hold a phase open forever.

use rand_chacha::rand_core::Rng;
use tracing::{debug, error, warn};

use super::*;
use crate::actions::{ActionProgress, pick_best_across};

impl Simulation {
    pub(super) fn tick_opponent(&mut self, dt: f32) {
        match self.opponent.state {
            OpponentState::WaitingForTurn => {}
            OpponentState::StartingPhase => self.start_opponent_phase(),
            OpponentState::SelectingUnit => self.select_opponent_unit(),
            OpponentState::SelectingAction => self.select_opponent_action(),
            OpponentState::Thinking { remaining, choice } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.opponent.state = OpponentState::Thinking { remaining, choice };
                } else {
                    self.execute_opponent_choice(choice);
                }
            }
            OpponentState::Executing => {
                if self.active.is_none() {
                    self.opponent.state = OpponentState::SelectingAction;
                }
            }
            OpponentState::EndingPhase => self.advance_turn(),
        }
    }

    /// Shuffled initiative over every living opponent unit.
    fn start_opponent_phase(&mut self) {
        let mut queue = self.board.units_of(Faction::Opponent);
        for i in (1..queue.len()).rev() {
            let j = (self.board.rng.next_u64() % (i as u64 + 1)) as usize;
            queue.swap(i, j);
        }
        debug!(units = queue.len(), "opponent phase started");

        if queue.is_empty() {
            self.advance_turn();
            return;
        }
        self.opponent.queue = queue.into();
        self.opponent.state = OpponentState::SelectingUnit;
    }

    fn select_opponent_unit(&mut self) {
        while let Some(id) = self.opponent.queue.pop_front() {
            if self.board.unit(id).is_some_and(|unit| unit.action_points > 0) {
                self.opponent.current = Some(id);
                self.opponent.recoveries = 0;
                self.opponent.state = OpponentState::SelectingAction;
                return;
            }
        }
        self.opponent.current = None;
        self.opponent.state = OpponentState::EndingPhase;
    }

    fn select_opponent_action(&mut self) {
        let Some(id) = self.opponent.current else {
            error!("opponent selecting an action with no unit");
            self.opponent.state = OpponentState::SelectingUnit;
            return;
        };
        let Some(available) = self.board.unit(id).map(|unit| unit.action_points) else {
            self.opponent.state = OpponentState::SelectingUnit;
            return;
        };
        if available == 0 {
            self.opponent.state = OpponentState::SelectingUnit;
            return;
        }

        let mut candidates = Vec::new();
        if let Some(actions) = self.actions.get_mut(id) {
            for action in actions.iter_mut() {
                if action.action_point_cost() > available {
                    continue;
                }
                // Each decision searches afresh.
                if let UnitAction::Move(movement) = action {
                    movement.clear_path_cache();
                }
                let candidate = action.best_candidate(&mut self.board, id);
                debug!(unit = ?id, ?candidate, "scored action");
                candidates.push(candidate);
            }
        }

        match pick_best_across(&mut self.board, &candidates) {
            Some(choice) if choice.value > 0 => {
                self.opponent.state = OpponentState::Thinking {
                    remaining: self.board.config.opponent.thinking_delay_secs,
                    choice,
                };
            }
            _ => {
                debug!(unit = ?id, "nothing worth doing, passing");
                self.board.exhaust_action_points(id);
                self.opponent.state = OpponentState::SelectingUnit;
            }
        }
    }

    fn execute_opponent_choice(&mut self, choice: Candidate) {
        let Some(id) = self.opponent.current else {
            error!("opponent executing with no unit");
            self.opponent.state = OpponentState::SelectingUnit;
            return;
        };
        let Some(cost) = self.action_cost(id, choice.action) else {
            self.recover(id, "chosen action is missing");
            return;
        };
        if let Err(err) = self.board.spend_action_points(id, cost) {
            warn!(%err, unit = ?id, "opponent could not pay for its choice");
            self.recover(id, "insufficient action points");
            return;
        }

        match self.start_action(id, choice.action, choice.cell, Driver::Opponent) {
            Ok(ActionProgress::Running) => self.opponent.state = OpponentState::Executing,
            Ok(ActionProgress::Completed) => self.opponent.state = OpponentState::SelectingAction,
            Err(err) => {
                error!(%err, unit = ?id, action = ?choice.action, "opponent action failed to start");
                self.recover(id, "action failed to start");
            }
        }
    }

    /// Back to action selection for the same unit; forfeit its points once recovery keeps failing.
    fn recover(&mut self, id: UnitId, reason: &str) {
        self.opponent.recoveries += 1;
        if self.opponent.recoveries >= self.board.config.opponent.max_recovery_attempts {
            error!(unit = ?id, reason, attempts = self.opponent.recoveries, "recovery exhausted");
            self.board.exhaust_action_points(id);
            self.opponent.state = OpponentState::SelectingUnit;
            return;
        }
        warn!(unit = ?id, reason, "recovering opponent decision");
        self.opponent.state = OpponentState::SelectingAction;
    }
}
