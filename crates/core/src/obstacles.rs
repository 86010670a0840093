//! Obstacle queries consumed by walkability refresh and line-of-sight checks.
//! This module exists so the simulation can run against any collision backend.
//! It does not own pathfinding or unit occupancy; units never block sight.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::GridPos;

/// Collision backend boundary. Queried once per cell on walkability refresh and
/// once per candidate target for line of sight, never per search.
pub trait ObstacleProbe: fmt::Debug {
    fn is_blocked(&self, world: Vec3) -> bool;

    fn is_line_blocked(&self, from: Vec3, to: Vec3) -> bool;
}

/// Built-in probe: a set of full-height blocked cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleMap {
    cell_size: f32,
    blocked: BTreeSet<GridPos>,
}

impl ObstacleMap {
    pub fn new(cell_size: f32, blocked: impl IntoIterator<Item = GridPos>) -> Self {
        Self { cell_size, blocked: blocked.into_iter().collect() }
    }

    pub fn block(&mut self, pos: GridPos) {
        self.blocked.insert(pos);
    }

    pub fn clear(&mut self, pos: GridPos) {
        self.blocked.remove(&pos);
    }

    fn cell_at(&self, world: Vec3) -> GridPos {
        GridPos::new((world.x / self.cell_size).round() as i32, (world.z / self.cell_size).round() as i32)
    }

    /// Walks the cells crossed between two cells, endpoints excluded.
    fn crossed_cells_blocked(&self, origin: GridPos, target: GridPos) -> bool {
        let dx = target.x - origin.x;
        let dz = target.z - origin.z;
        let sx = dx.signum();
        let sz = dz.signum();
        let total_x = dx.abs();
        let total_z = dz.abs();

        let mut x = origin.x;
        let mut z = origin.z;
        let mut step_x = 0;
        let mut step_z = 0;

        while step_x < total_x || step_z < total_z {
            let lhs = (1 + 2 * step_x) * total_z;
            let rhs = (1 + 2 * step_z) * total_x;

            if lhs == rhs {
                x += sx;
                z += sz;
                step_x += 1;
                step_z += 1;
            } else if lhs < rhs {
                x += sx;
                step_x += 1;
            } else {
                z += sz;
                step_z += 1;
            }

            if x == target.x && z == target.z {
                break;
            }
            if self.blocked.contains(&GridPos::new(x, z)) {
                return true;
            }
        }
        false
    }
}

impl ObstacleProbe for ObstacleMap {
    fn is_blocked(&self, world: Vec3) -> bool {
        self.blocked.contains(&self.cell_at(world))
    }

    fn is_line_blocked(&self, from: Vec3, to: Vec3) -> bool {
        self.crossed_cells_blocked(self.cell_at(from), self.cell_at(to))
    }
}
