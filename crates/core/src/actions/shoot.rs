//! Ranged attack: aim, fire, reload.

use tracing::{debug, warn};

use super::{Action, ActionProgress};
use crate::config::ShootConfig;
use crate::error::SimError;
use crate::state::Battlefield;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShootStage {
    Idle,
    Aiming { remaining: f32 },
    Shooting { remaining: f32 },
    Reloading { remaining: f32 },
}

#[derive(Clone, Debug)]
pub struct ShootAction {
    config: ShootConfig,
    stage: ShootStage,
    target: Option<UnitId>,
}

/// Enemy-occupied cells within `range` of `origin` and in plain sight.
/// Range is straight-line between cell centers.
pub fn shoot_targets_from(
    board: &Battlefield,
    faction: Faction,
    origin: GridPos,
    range: u32,
) -> Vec<GridPos> {
    let reach = range as i32;
    let mut targets = Vec::new();
    for dx in -reach..=reach {
        for dz in -reach..=reach {
            let cell = origin + GridPos::new(dx, dz);
            if !board.grid.is_valid(cell) || origin.distance_squared(cell) > range * range {
                continue;
            }
            let Some(occupant) = board.unit_at(cell) else {
                continue;
            };
            if occupant.faction == faction {
                continue;
            }
            if !board.has_line_of_sight(origin, cell) {
                continue;
            }
            targets.push(cell);
        }
    }
    targets
}

impl ShootAction {
    pub fn new(config: ShootConfig) -> Self {
        Self { config, stage: ShootStage::Idle, target: None }
    }

    pub fn stage(&self) -> ShootStage {
        self.stage
    }

    fn resolve_shot(&mut self, board: &mut Battlefield, actor: UnitId) {
        let Some(target) = self.target else {
            return;
        };
        if board.unit(target).is_none() {
            warn!(?target, "shot target vanished before firing");
            return;
        }
        board.events.push(SimEvent::ShotFired { shooter: actor, target });

        let dodging =
            board.unit(target).is_some_and(|unit| unit.has_condition(UnitCondition::Dodging));
        let evade_percent = board.config.dodge.evade_percent;
        if dodging && board.roll(100) <= evade_percent {
            debug!(?target, "shot evaded");
            return;
        }

        let damage: u32 =
            (0..self.config.damage_dice).map(|_| board.roll(self.config.damage_sides)).sum();
        debug!(?actor, ?target, damage, "shot landed");
        board.apply_damage(target, damage as i32);
    }
}

impl Action for ShootAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Shoot
    }

    fn action_point_cost(&self) -> u32 {
        self.config.cost
    }

    fn valid_targets(&mut self, board: &mut Battlefield, actor: UnitId) -> Vec<GridPos> {
        match board.unit(actor) {
            Some(unit) => shoot_targets_from(board, unit.faction, unit.pos, self.config.range),
            None => Vec::new(),
        }
    }

    fn take_action(
        &mut self,
        board: &mut Battlefield,
        actor: UnitId,
        cell: GridPos,
    ) -> Result<ActionProgress, SimError> {
        if self.is_active() {
            return Err(SimError::ActionAlreadyActive(ActionKind::Shoot));
        }
        if !self.can_take(board, actor, cell) {
            warn!(%cell, "shoot started on an invalid target");
            return Ok(ActionProgress::Completed);
        }
        self.target = board.grid.occupant(cell);
        self.stage = ShootStage::Aiming { remaining: self.config.aim_secs };
        Ok(ActionProgress::Running)
    }

    fn tick(&mut self, board: &mut Battlefield, actor: UnitId, dt: f32) -> ActionProgress {
        self.stage = match self.stage {
            ShootStage::Idle => return ActionProgress::Completed,
            ShootStage::Aiming { remaining } if remaining - dt > 0.0 => {
                ShootStage::Aiming { remaining: remaining - dt }
            }
            ShootStage::Aiming { .. } => ShootStage::Shooting { remaining: self.config.fire_secs() },
            ShootStage::Shooting { remaining } if remaining - dt > 0.0 => {
                ShootStage::Shooting { remaining: remaining - dt }
            }
            ShootStage::Shooting { .. } => {
                self.resolve_shot(board, actor);
                ShootStage::Reloading { remaining: self.config.reload_secs }
            }
            ShootStage::Reloading { remaining } if remaining - dt > 0.0 => {
                ShootStage::Reloading { remaining: remaining - dt }
            }
            ShootStage::Reloading { .. } => {
                self.target = None;
                ShootStage::Idle
            }
        };
        match self.stage {
            ShootStage::Idle => ActionProgress::Completed,
            _ => ActionProgress::Running,
        }
    }

    fn is_active(&self) -> bool {
        self.stage != ShootStage::Idle
    }

    fn desirability(&mut self, _board: &mut Battlefield, _actor: UnitId, _cell: GridPos) -> i32 {
        self.config.score
    }
}
