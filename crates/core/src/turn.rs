//! Phase toggle and turn counter.
//! This module exists to own whose phase it is and who listens for changes.
//! It does not reset action points or touch units; the simulation dispatches to subscribers.

use crate::types::{Phase, UnitId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnController {
    phase: Phase,
    turn: u32,
    subscribers: Vec<UnitId>,
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnController {
    pub fn new() -> Self {
        Self { phase: Phase::Player, turn: 1, subscribers: Vec::new() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_player_phase(&self) -> bool {
        self.phase == Phase::Player
    }

    /// Flips the phase and bumps the counter. Returns the new phase.
    pub fn advance_turn(&mut self) -> Phase {
        self.phase = self.phase.next();
        self.turn += 1;
        self.phase
    }

    pub fn subscribe(&mut self, unit: UnitId) {
        if !self.subscribers.contains(&unit) {
            self.subscribers.push(unit);
        }
    }

    pub fn unsubscribe(&mut self, unit: UnitId) {
        self.subscribers.retain(|&id| id != unit);
    }

    pub fn subscribers(&self) -> &[UnitId] {
        &self.subscribers
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn phase_parity_follows_advance_count() {
        for n in 0..9 {
            let mut turns = TurnController::new();
            for _ in 0..n {
                turns.advance_turn();
            }
            let expected = if n % 2 == 0 { Phase::Player } else { Phase::Opponent };
            assert_eq!(turns.phase(), expected, "after {n} advances");
            assert_eq!(turns.turn(), 1 + n);
        }
    }

    #[test]
    fn subscribers_register_once_and_leave_cleanly() {
        let mut keys: SlotMap<UnitId, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());
        let mut turns = TurnController::new();
        turns.subscribe(a);
        turns.subscribe(b);
        turns.subscribe(a);
        assert_eq!(turns.subscribers(), &[a, b]);
        turns.unsubscribe(a);
        assert_eq!(turns.subscribers(), &[b]);
    }
}
