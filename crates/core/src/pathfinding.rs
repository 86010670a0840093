//! A* search over the tactical grid with fixed-point octile costs.
//! This module exists so movement range, path following and AI advance share one cost model.
//! It does not own occupancy; units never block a search, only walls do.

use tracing::debug;

use crate::grid::GridIndex;
use crate::obstacles::ObstacleProbe;
use crate::types::GridPos;

pub const STRAIGHT_COST: u32 = 10;
pub const DIAGONAL_COST: u32 = 14;

/// Per-cell search bookkeeping. Everything except `walkable` is reset before each search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathNode {
    pub g: u32,
    pub h: u32,
    pub f: u32,
    pub came_from: Option<GridPos>,
    pub walkable: bool,
    open: bool,
    closed: bool,
}

impl PathNode {
    fn walkable() -> Self {
        Self { g: u32::MAX, h: 0, f: u32::MAX, came_from: None, walkable: true, open: false, closed: false }
    }

    fn reset(&mut self) {
        self.g = u32::MAX;
        self.h = 0;
        self.f = u32::MAX;
        self.came_from = None;
        self.open = false;
        self.closed = false;
    }

    fn set_costs(&mut self, g: u32, h: u32) {
        self.g = g;
        self.h = h;
        self.f = g.saturating_add(h);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    /// Ordered cells from start to goal, both included.
    pub cells: Vec<GridPos>,
    pub cost: u32,
}

#[derive(Clone, Debug)]
pub struct Pathfinder {
    nodes: GridIndex<PathNode>,
    /// Bumped on every walkability change so cached searches can tell they are stale.
    revision: u64,
}

/// Octile distance: diagonal steps first, then the straight remainder.
pub fn step_distance(a: GridPos, b: GridPos) -> u32 {
    let dx = a.x.abs_diff(b.x);
    let dz = a.z.abs_diff(b.z);
    let diagonal = dx.min(dz);
    let straight = dx.max(dz) - diagonal;
    DIAGONAL_COST * diagonal + STRAIGHT_COST * straight
}

impl Pathfinder {
    pub fn new(width: i32, height: i32, cell_size: f32) -> Self {
        let nodes = GridIndex::new(width, height, cell_size, |_| PathNode::walkable());
        Self { nodes, revision: 0 }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Rebuilds every walkable flag from the probe. Call when terrain changes.
    pub fn refresh_walkability(&mut self, probe: &dyn ObstacleProbe) {
        let mut blocked = 0usize;
        for pos in self.nodes.positions() {
            let world = self.nodes.grid_to_world(pos);
            let walkable = !probe.is_blocked(world);
            if !walkable {
                blocked += 1;
            }
            if let Some(node) = self.nodes.get_mut(pos) {
                node.walkable = walkable;
            }
        }
        self.revision += 1;
        debug!(blocked, revision = self.revision, "walkability refreshed");
    }

    pub fn set_walkable(&mut self, pos: GridPos, walkable: bool) {
        if let Some(node) = self.nodes.get_mut(pos)
            && node.walkable != walkable
        {
            node.walkable = walkable;
            self.revision += 1;
        }
    }

    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.nodes.get(pos).is_some_and(|node| node.walkable)
    }

    pub fn node(&self, pos: GridPos) -> Option<&PathNode> {
        self.nodes.get(pos)
    }

    /// Cost-only variant of [`Pathfinder::find_path`]; 0 when no path exists.
    pub fn path_cost(&mut self, start: GridPos, goal: GridPos) -> u32 {
        self.find_path(start, goal).map_or(0, |path| path.cost)
    }

    pub fn find_path(&mut self, start: GridPos, goal: GridPos) -> Option<Path> {
        if !self.nodes.is_valid(start) || !self.nodes.is_valid(goal) {
            return None;
        }

        for node in self.nodes.iter_mut() {
            node.reset();
        }

        let mut open: Vec<GridPos> = vec![start];
        if let Some(node) = self.nodes.get_mut(start) {
            node.set_costs(0, step_distance(start, goal));
            node.open = true;
        }

        while let Some(current) = self.lowest_f(&open) {
            let Some(current_node) = self.nodes.get(current).copied() else {
                break;
            };
            if current == goal {
                let cells = self.reconstruct(goal);
                debug!(%start, %goal, cost = current_node.f, steps = cells.len(), "path found");
                return Some(Path { cells, cost: current_node.f });
            }

            open.retain(|&pos| pos != current);
            if let Some(node) = self.nodes.get_mut(current) {
                node.open = false;
                node.closed = true;
            }

            for neighbor in self.neighbors(current) {
                let Some(node) = self.nodes.get_mut(neighbor) else {
                    continue;
                };
                if node.closed {
                    continue;
                }
                if !node.walkable {
                    node.closed = true;
                    continue;
                }

                let tentative = current_node.g.saturating_add(step_distance(current, neighbor));
                if tentative < node.g {
                    node.came_from = Some(current);
                    node.set_costs(tentative, step_distance(neighbor, goal));
                    if !node.open {
                        node.open = true;
                        open.push(neighbor);
                    }
                }
            }
        }

        debug!(%start, %goal, "no path");
        None
    }

    /// First node in open order with strictly lowest f wins ties.
    fn lowest_f(&self, open: &[GridPos]) -> Option<GridPos> {
        let mut best: Option<(GridPos, u32)> = None;
        for &pos in open {
            let f = self.nodes.get(pos).map_or(u32::MAX, |node| node.f);
            if best.is_none_or(|(_, best_f)| f < best_f) {
                best = Some((pos, f));
            }
        }
        best.map(|(pos, _)| pos)
    }

    fn neighbors(&self, pos: GridPos) -> Vec<GridPos> {
        let mut out = Vec::with_capacity(8);
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let next = pos + GridPos::new(dx, dz);
                if self.nodes.is_valid(next) {
                    out.push(next);
                }
            }
        }
        out
    }

    fn reconstruct(&self, goal: GridPos) -> Vec<GridPos> {
        let mut cells = vec![goal];
        let mut cursor = goal;
        while let Some(prev) = self.nodes.get(cursor).and_then(|node| node.came_from) {
            cells.push(prev);
            cursor = prev;
        }
        cells.reverse();
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::ObstacleMap;

    fn walk_cost(cells: &[GridPos]) -> u32 {
        cells.windows(2).map(|pair| step_distance(pair[0], pair[1])).sum()
    }

    #[test]
    fn octile_costs_match_expected_values() {
        let origin = GridPos::new(0, 0);
        assert_eq!(step_distance(origin, GridPos::new(3, 0)), 30);
        assert_eq!(step_distance(origin, GridPos::new(3, 3)), 42);
        assert_eq!(step_distance(origin, GridPos::new(5, 2)), 58);
    }

    #[test]
    fn open_grid_path_is_straight_and_includes_start() {
        let mut finder = Pathfinder::new(10, 10, 2.0);
        let path = finder.find_path(GridPos::new(1, 1), GridPos::new(5, 1)).expect("path");
        assert_eq!(path.cost, 40);
        assert_eq!(path.cells.first(), Some(&GridPos::new(1, 1)));
        assert_eq!(path.cells.last(), Some(&GridPos::new(5, 1)));
        assert_eq!(path.cells.len(), 5);
        assert_eq!(walk_cost(&path.cells), path.cost);
    }

    #[test]
    fn start_equals_goal_costs_nothing() {
        let mut finder = Pathfinder::new(4, 4, 1.0);
        let path = finder.find_path(GridPos::new(2, 2), GridPos::new(2, 2)).expect("path");
        assert_eq!(path.cells, vec![GridPos::new(2, 2)]);
        assert_eq!(path.cost, 0);
    }

    #[test]
    fn walls_force_a_detour_and_are_never_crossed() {
        let mut finder = Pathfinder::new(7, 7, 1.0);
        for z in 0..6 {
            finder.set_walkable(GridPos::new(3, z), false);
        }
        let path = finder.find_path(GridPos::new(0, 0), GridPos::new(6, 0)).expect("path");
        assert!(path.cells.iter().all(|&cell| finder.is_walkable(cell)));
        assert!(path.cells.contains(&GridPos::new(3, 6)));
        assert_eq!(walk_cost(&path.cells), path.cost);
        assert!(path.cost > 60);
    }

    #[test]
    fn sealed_goal_yields_no_path_and_zero_cost() {
        let mut finder = Pathfinder::new(5, 5, 1.0);
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx != 0 || dz != 0 {
                    finder.set_walkable(GridPos::new(2 + dx, 2 + dz), false);
                }
            }
        }
        assert_eq!(finder.find_path(GridPos::new(0, 0), GridPos::new(2, 2)), None);
        assert_eq!(finder.path_cost(GridPos::new(0, 0), GridPos::new(2, 2)), 0);
        assert_eq!(finder.path_cost(GridPos::new(0, 0), GridPos::new(9, 9)), 0);
    }

    #[test]
    fn repeated_search_is_identical() {
        let mut finder = Pathfinder::new(10, 10, 1.0);
        finder.set_walkable(GridPos::new(4, 4), false);
        let first = finder.find_path(GridPos::new(0, 3), GridPos::new(9, 6));
        let second = finder.find_path(GridPos::new(0, 3), GridPos::new(9, 6));
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn refresh_reads_blocked_cells_from_probe() {
        let mut finder = Pathfinder::new(6, 6, 2.0);
        let obstacles = ObstacleMap::new(2.0, [GridPos::new(1, 1), GridPos::new(4, 2)]);
        finder.refresh_walkability(&obstacles);
        assert!(!finder.is_walkable(GridPos::new(1, 1)));
        assert!(!finder.is_walkable(GridPos::new(4, 2)));
        assert!(finder.is_walkable(GridPos::new(2, 2)));
        assert!(!finder.is_walkable(GridPos::new(6, 0)));

        finder.refresh_walkability(&ObstacleMap::new(2.0, []));
        assert!(finder.is_walkable(GridPos::new(1, 1)));
    }

    #[test]
    fn walkability_changes_bump_the_revision() {
        let mut finder = Pathfinder::new(4, 4, 1.0);
        let start = finder.revision();
        finder.set_walkable(GridPos::new(1, 1), true);
        assert_eq!(finder.revision(), start, "no-op writes keep the revision");
        finder.set_walkable(GridPos::new(1, 1), false);
        assert_eq!(finder.revision(), start + 1);
        finder.refresh_walkability(&ObstacleMap::new(1.0, []));
        assert_eq!(finder.revision(), start + 2);
        finder.set_walkable(GridPos::new(9, 9), false);
        assert_eq!(finder.revision(), start + 2);
    }

    #[test]
    fn search_state_is_reset_between_queries() {
        let mut finder = Pathfinder::new(8, 8, 1.0);
        finder.path_cost(GridPos::new(0, 0), GridPos::new(7, 7));
        let cost = finder.path_cost(GridPos::new(7, 0), GridPos::new(7, 2));
        assert_eq!(cost, 20);
        let far = finder.node(GridPos::new(0, 7)).expect("node");
        assert_eq!(far.came_from, None);
    }
}
