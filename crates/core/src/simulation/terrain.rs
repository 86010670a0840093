//! Runtime terrain changes.
//! Walkability is recomputed once per change and every cached Move search is dropped,
//! so no action keeps scoring or walking paths from the old layout.

use tracing::{info, warn};

use super::*;
use crate::error::SimError;
use crate::obstacles::ObstacleProbe;

impl Simulation {
    pub fn obstacles(&self) -> &dyn ObstacleProbe {
        self.board.obstacles()
    }

    /// Swaps the collision backend. Rejected while an action is executing or
    /// when the new layout would wall in a standing unit.
    pub fn set_obstacles(&mut self, obstacles: Box<dyn ObstacleProbe>) -> Result<(), SimError> {
        if self.selection.busy || self.active.is_some() {
            return Err(SimError::Busy);
        }
        let buried = self
            .board
            .units
            .values()
            .map(|unit| unit.pos)
            .find(|&pos| obstacles.is_blocked(self.board.grid.grid_to_world(pos)));
        if let Some(pos) = buried {
            warn!(%pos, "terrain change rejected");
            return Err(SimError::BlockedUnderUnit { pos });
        }

        self.board.set_obstacles(obstacles);
        self.invalidate_paths();
        info!(revision = self.board.pathfinder.revision(), "terrain changed");
        Ok(())
    }

    /// Drops every unit's cached Move searches.
    pub(super) fn invalidate_paths(&mut self) {
        for actions in self.actions.values_mut() {
            for action in actions.iter_mut() {
                if let UnitAction::Move(movement) = action {
                    movement.clear_path_cache();
                }
            }
        }
    }
}
