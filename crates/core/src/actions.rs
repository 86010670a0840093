//! Unit actions: a closed set of kinds sharing one contract for legality, execution and scoring.
//! This module exists to give the player layer and the decision engine a single surface.
//! It does not spend action points or decide turn flow; callers check and spend before acting.

mod dodge;
mod movement;
mod scoring;
mod shoot;

pub use dodge::DodgeAction;
pub use movement::MoveAction;
pub use scoring::{Candidate, pick_best, pick_best_across};
pub use shoot::{ShootAction, ShootStage, shoot_targets_from};

use tracing::error;

use crate::config::TacticsConfig;
use crate::error::SimError;
use crate::state::Battlefield;
use crate::types::{ActionKind, GridPos, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionProgress {
    Running,
    Completed,
}

pub trait Action {
    fn kind(&self) -> ActionKind;

    fn action_point_cost(&self) -> u32;

    fn valid_targets(&mut self, board: &mut Battlefield, actor: UnitId) -> Vec<GridPos>;

    /// Membership in the valid-target set. Action points are the caller's concern.
    fn can_take(&mut self, board: &mut Battlefield, actor: UnitId, cell: GridPos) -> bool {
        self.valid_targets(board, actor).contains(&cell)
    }

    /// Starts execution. An invalid cell completes immediately with no effect.
    fn take_action(
        &mut self,
        board: &mut Battlefield,
        actor: UnitId,
        cell: GridPos,
    ) -> Result<ActionProgress, SimError>;

    fn tick(&mut self, board: &mut Battlefield, actor: UnitId, dt: f32) -> ActionProgress;

    fn is_active(&self) -> bool;

    fn desirability(&mut self, board: &mut Battlefield, actor: UnitId, cell: GridPos) -> i32;

    /// Highest-scoring target with uniform tie-breaks; a zero-valued sentinel
    /// at the actor's own cell when nothing is targetable.
    fn best_candidate(&mut self, board: &mut Battlefield, actor: UnitId) -> Candidate {
        let targets = self.valid_targets(board, actor);
        let scored: Vec<(GridPos, i32)> =
            targets.into_iter().map(|cell| (cell, self.desirability(board, actor, cell))).collect();
        pick_best(board, actor, self.kind(), &scored)
    }
}

#[derive(Clone, Debug)]
pub enum UnitAction {
    Move(MoveAction),
    Shoot(ShootAction),
    Dodge(DodgeAction),
}

impl UnitAction {
    /// Builds one unit's actions in loadout order. Move scores cells by what
    /// could be shot from them, so it cannot exist without Shoot.
    pub fn build_loadout(
        config: &TacticsConfig,
        loadout: &[ActionKind],
        unit: Option<UnitId>,
    ) -> Result<Vec<UnitAction>, SimError> {
        if loadout.contains(&ActionKind::Move) && !loadout.contains(&ActionKind::Shoot) {
            error!(?unit, "move action wired without a shoot action");
            return Err(SimError::MissingAction {
                unit,
                expected: ActionKind::Move,
                missing: ActionKind::Shoot,
            });
        }

        let mut actions: Vec<UnitAction> = Vec::with_capacity(loadout.len());
        for &kind in loadout {
            if actions.iter().any(|action| action.kind() == kind) {
                continue;
            }
            actions.push(match kind {
                ActionKind::Move => UnitAction::Move(MoveAction::new(
                    config.movement.clone(),
                    config.shoot.clone(),
                )),
                ActionKind::Shoot => UnitAction::Shoot(ShootAction::new(config.shoot.clone())),
                ActionKind::Dodge => UnitAction::Dodge(DodgeAction::new(config.dodge.clone())),
            });
        }
        Ok(actions)
    }

    fn inner(&self) -> &dyn Action {
        match self {
            UnitAction::Move(action) => action,
            UnitAction::Shoot(action) => action,
            UnitAction::Dodge(action) => action,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Action {
        match self {
            UnitAction::Move(action) => action,
            UnitAction::Shoot(action) => action,
            UnitAction::Dodge(action) => action,
        }
    }
}

impl Action for UnitAction {
    fn kind(&self) -> ActionKind {
        self.inner().kind()
    }

    fn action_point_cost(&self) -> u32 {
        self.inner().action_point_cost()
    }

    fn valid_targets(&mut self, board: &mut Battlefield, actor: UnitId) -> Vec<GridPos> {
        self.inner_mut().valid_targets(board, actor)
    }

    fn can_take(&mut self, board: &mut Battlefield, actor: UnitId, cell: GridPos) -> bool {
        self.inner_mut().can_take(board, actor, cell)
    }

    fn take_action(
        &mut self,
        board: &mut Battlefield,
        actor: UnitId,
        cell: GridPos,
    ) -> Result<ActionProgress, SimError> {
        self.inner_mut().take_action(board, actor, cell)
    }

    fn tick(&mut self, board: &mut Battlefield, actor: UnitId, dt: f32) -> ActionProgress {
        self.inner_mut().tick(board, actor, dt)
    }

    fn is_active(&self) -> bool {
        self.inner().is_active()
    }

    fn desirability(&mut self, board: &mut Battlefield, actor: UnitId, cell: GridPos) -> i32 {
        self.inner_mut().desirability(board, actor, cell)
    }

    fn best_candidate(&mut self, board: &mut Battlefield, actor: UnitId) -> Candidate {
        self.inner_mut().best_candidate(board, actor)
    }
}
