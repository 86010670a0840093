use tracing::warn;

use super::{Action, ActionProgress};
use crate::config::DodgeConfig;
use crate::error::SimError;
use crate::state::Battlefield;
use crate::types::*;

/// Spin in place and stay evasive until the unit's next own phase.
#[derive(Clone, Debug)]
pub struct DodgeAction {
    config: DodgeConfig,
    remaining: Option<f32>,
}

impl DodgeAction {
    pub fn new(config: DodgeConfig) -> Self {
        Self { config, remaining: None }
    }
}

impl Action for DodgeAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Dodge
    }

    fn action_point_cost(&self) -> u32 {
        self.config.cost
    }

    fn valid_targets(&mut self, board: &mut Battlefield, actor: UnitId) -> Vec<GridPos> {
        board.unit(actor).map(|unit| vec![unit.pos]).unwrap_or_default()
    }

    fn take_action(
        &mut self,
        board: &mut Battlefield,
        actor: UnitId,
        cell: GridPos,
    ) -> Result<ActionProgress, SimError> {
        if self.is_active() {
            return Err(SimError::ActionAlreadyActive(ActionKind::Dodge));
        }
        if !self.can_take(board, actor, cell) {
            warn!(%cell, "dodge started away from the unit");
            return Ok(ActionProgress::Completed);
        }
        if let Some(unit) = board.units.get_mut(actor) {
            unit.conditions.insert(UnitCondition::Dodging);
        }
        self.remaining = Some(self.config.spin_secs);
        Ok(ActionProgress::Running)
    }

    fn tick(&mut self, _board: &mut Battlefield, _actor: UnitId, dt: f32) -> ActionProgress {
        match self.remaining {
            Some(remaining) if remaining - dt > 0.0 => {
                self.remaining = Some(remaining - dt);
                ActionProgress::Running
            }
            _ => {
                self.remaining = None;
                ActionProgress::Completed
            }
        }
    }

    fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    fn desirability(&mut self, board: &mut Battlefield, actor: UnitId, _cell: GridPos) -> i32 {
        let dodging =
            board.unit(actor).is_some_and(|unit| unit.has_condition(UnitCondition::Dodging));
        if dodging { 0 } else { self.config.score }
    }
}
