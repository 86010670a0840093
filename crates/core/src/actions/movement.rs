//! Walking along an A* path, and the move scoring the decision engine relies on.
//! Destination cells are scored by how many enemies could be shot from them:
//! fewer exposed enemies is safer, none at all is worthless.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, warn};

use super::{Action, ActionProgress, Candidate, pick_best, shoot_targets_from};
use crate::config::{MoveConfig, ShootConfig};
use crate::error::SimError;
use crate::pathfinding::{Path, STRAIGHT_COST};
use crate::state::Battlefield;
use crate::types::*;

#[derive(Clone, Debug)]
pub struct MoveAction {
    config: MoveConfig,
    shoot: ShootConfig,
    waypoints: VecDeque<GridPos>,
    active: bool,
    /// Origin and walkability revision the cached paths were searched under.
    cache_key: Option<(GridPos, u64)>,
    path_cache: BTreeMap<GridPos, Option<Path>>,
}

impl MoveAction {
    pub fn new(config: MoveConfig, shoot: ShootConfig) -> Self {
        Self {
            config,
            shoot,
            waypoints: VecDeque::new(),
            active: false,
            cache_key: None,
            path_cache: BTreeMap::new(),
        }
    }

    pub fn max_path_cost(&self) -> u32 {
        self.config.max_distance.max(0) as u32 * STRAIGHT_COST
    }

    pub fn clear_path_cache(&mut self) {
        self.path_cache.clear();
        self.cache_key = None;
    }

    pub fn cached_paths(&self) -> usize {
        self.path_cache.len()
    }

    fn cached_path(
        &mut self,
        board: &mut Battlefield,
        origin: GridPos,
        dest: GridPos,
    ) -> Option<&Path> {
        let key = (origin, board.pathfinder.revision());
        if self.cache_key != Some(key) {
            self.path_cache.clear();
            self.cache_key = Some(key);
        }
        self.path_cache
            .entry(dest)
            .or_insert_with(|| board.pathfinder.find_path(origin, dest))
            .as_ref()
    }

    fn is_reachable_destination(
        &mut self,
        board: &mut Battlefield,
        origin: GridPos,
        cell: GridPos,
    ) -> bool {
        if !board.grid.is_valid(cell)
            || board.grid.has_occupant(cell)
            || !board.pathfinder.is_walkable(cell)
        {
            return false;
        }
        let max_cost = self.max_path_cost();
        let cost = self.cached_path(board, origin, cell).map_or(0, |path| path.cost);
        cost != 0 && cost <= max_cost
    }

    fn within_radius(&self, origin: GridPos, cell: GridPos) -> bool {
        let reach = self.config.max_distance.unsigned_abs();
        cell.x.abs_diff(origin.x) <= reach && cell.z.abs_diff(origin.z) <= reach
    }

    /// A bounded step along the cheapest path toward the nearest reachable
    /// opponent, backed off until the landing cell is free.
    fn advance_toward_nearest(&mut self, board: &mut Battlefield, actor: UnitId) -> Option<GridPos> {
        let origin = board.unit(actor)?.pos;
        let mut nearest: Option<Path> = None;
        for opponent in board.opponents_of(actor) {
            let Some(target) = board.unit(opponent).map(|unit| unit.pos) else {
                continue;
            };
            let Some(path) = board.pathfinder.find_path(origin, target) else {
                continue;
            };
            if path.cost == 0 {
                continue;
            }
            if nearest.as_ref().is_none_or(|best| path.cost < best.cost) {
                nearest = Some(path);
            }
        }
        let path = nearest?;

        let limit = board.grid.cell_size() * self.config.max_distance as f32;
        let mut travelled = 0.0;
        let mut index = 0;
        for i in 1..path.cells.len().saturating_sub(1) {
            let from = board.grid.grid_to_world(path.cells[i - 1]);
            let to = board.grid.grid_to_world(path.cells[i]);
            let step = from.distance(to);
            if travelled + step > limit + 1e-3 {
                break;
            }
            travelled += step;
            index = i;
        }
        while index > 0 && board.grid.has_occupant(path.cells[index]) {
            index -= 1;
        }
        if index == 0 {
            return None;
        }

        let cell = path.cells[index];
        if !self.is_reachable_destination(board, origin, cell) {
            warn!(%cell, "advance cell failed destination checks");
            return None;
        }
        Some(cell)
    }

    fn finish(&mut self) -> ActionProgress {
        self.active = false;
        self.waypoints.clear();
        ActionProgress::Completed
    }
}

impl Action for MoveAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Move
    }

    fn action_point_cost(&self) -> u32 {
        self.config.cost
    }

    fn valid_targets(&mut self, board: &mut Battlefield, actor: UnitId) -> Vec<GridPos> {
        let Some(origin) = board.unit(actor).map(|unit| unit.pos) else {
            return Vec::new();
        };
        let reach = self.config.max_distance;
        let mut targets = Vec::new();
        for dx in -reach..=reach {
            for dz in -reach..=reach {
                let cell = origin + GridPos::new(dx, dz);
                if self.is_reachable_destination(board, origin, cell) {
                    targets.push(cell);
                }
            }
        }
        targets
    }

    fn can_take(&mut self, board: &mut Battlefield, actor: UnitId, cell: GridPos) -> bool {
        let Some(origin) = board.unit(actor).map(|unit| unit.pos) else {
            return false;
        };
        self.within_radius(origin, cell) && self.is_reachable_destination(board, origin, cell)
    }

    fn take_action(
        &mut self,
        board: &mut Battlefield,
        actor: UnitId,
        cell: GridPos,
    ) -> Result<ActionProgress, SimError> {
        if self.active {
            return Err(SimError::ActionAlreadyActive(ActionKind::Move));
        }
        if !self.can_take(board, actor, cell) {
            warn!(%cell, "move started toward an invalid cell");
            return Ok(ActionProgress::Completed);
        }
        let Some(origin) = board.unit(actor).map(|unit| unit.pos) else {
            return Ok(ActionProgress::Completed);
        };

        self.clear_path_cache();
        let Some(path) = board.pathfinder.find_path(origin, cell) else {
            return Ok(ActionProgress::Completed);
        };
        self.waypoints = path.cells.into_iter().skip(1).collect();
        self.active = true;
        Ok(ActionProgress::Running)
    }

    fn tick(&mut self, board: &mut Battlefield, actor: UnitId, dt: f32) -> ActionProgress {
        if !self.active {
            return ActionProgress::Completed;
        }
        let Some(&next) = self.waypoints.front() else {
            return self.finish();
        };
        let target = board.grid.grid_to_world(next);

        let (world, cell) = {
            let Some(unit) = board.units.get_mut(actor) else {
                return self.finish();
            };
            let offset = target - unit.world_pos;
            let distance = offset.length();
            let step = self.config.speed * dt;
            if distance <= self.config.stop_distance || step >= distance {
                unit.world_pos = target;
                self.waypoints.pop_front();
            } else {
                unit.world_pos += offset / distance * step;
            }
            (unit.world_pos, unit.pos)
        };

        let now = board.grid.world_to_grid(world);
        if now != cell {
            board.relocate_unit(actor, now);
            board.events.push(SimEvent::UnitMoved { unit: actor });
        }

        if self.waypoints.is_empty() {
            return self.finish();
        }
        ActionProgress::Running
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn desirability(&mut self, board: &mut Battlefield, actor: UnitId, cell: GridPos) -> i32 {
        let Some(faction) = board.unit(actor).map(|unit| unit.faction) else {
            return 0;
        };
        let exposed = shoot_targets_from(board, faction, cell, self.shoot.range).len() as i32;
        if exposed == 0 {
            return 0;
        }
        (self.config.score_base - self.config.score_per_target * exposed).clamp(0, 100)
    }

    fn best_candidate(&mut self, board: &mut Battlefield, actor: UnitId) -> Candidate {
        let Some(home) = board.unit(actor).map(|unit| unit.pos) else {
            return Candidate::sentinel(ActionKind::Move, GridPos::default());
        };
        if self.desirability(board, actor, home) > 0 {
            return Candidate { action: ActionKind::Move, cell: home, value: self.config.score_hold };
        }

        let targets = self.valid_targets(board, actor);
        let scored: Vec<(GridPos, i32)> =
            targets.into_iter().map(|cell| (cell, self.desirability(board, actor, cell))).collect();
        let best = pick_best(board, actor, ActionKind::Move, &scored);
        if best.value > 0 {
            return best;
        }

        match self.advance_toward_nearest(board, actor) {
            Some(cell) => {
                debug!(%cell, "advancing toward nearest opponent");
                Candidate { action: ActionKind::Move, cell, value: self.config.score_advance }
            }
            None => {
                debug!("no opponent reachable, holding position");
                Candidate::sentinel(ActionKind::Move, home)
            }
        }
    }
}
