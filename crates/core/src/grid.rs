//! Fixed-size spatial index over the tactical grid.
//! This module exists to map grid coordinates to per-cell payloads and world space.
//! It does not own walkability or search state; see `pathfinding`.

use glam::Vec3;

use crate::types::{GridPos, UnitId};

#[derive(Clone, Debug)]
pub struct GridIndex<T> {
    width: i32,
    height: i32,
    cell_size: f32,
    cells: Vec<T>,
}

impl<T> GridIndex<T> {
    pub fn new(width: i32, height: i32, cell_size: f32, mut init: impl FnMut(GridPos) -> T) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut cells = Vec::with_capacity((width * height) as usize);
        for z in 0..height {
            for x in 0..width {
                cells.push(init(GridPos::new(x, z)));
            }
        }
        Self { width, height, cell_size, cells }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn is_valid(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.z >= 0 && pos.x < self.width && pos.z < self.height
    }

    pub fn get(&self, pos: GridPos) -> Option<&T> {
        if !self.is_valid(pos) {
            return None;
        }
        self.cells.get(self.index(pos))
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut T> {
        if !self.is_valid(pos) {
            return None;
        }
        let idx = self.index(pos);
        self.cells.get_mut(idx)
    }

    /// Rounds each axis independently, so a point halfway between cells lands on the far one.
    pub fn world_to_grid(&self, world: Vec3) -> GridPos {
        GridPos::new(
            (world.x / self.cell_size).round() as i32,
            (world.z / self.cell_size).round() as i32,
        )
    }

    pub fn grid_to_world(&self, pos: GridPos) -> Vec3 {
        Vec3::new(pos.x as f32 * self.cell_size, 0.0, pos.z as f32 * self.cell_size)
    }

    /// Every in-bounds coordinate, row by row.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + use<T> {
        let width = self.width;
        (0..self.height).flat_map(move |z| (0..width).map(move |x| GridPos::new(x, z)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }

    fn index(&self, pos: GridPos) -> usize {
        (pos.z as usize) * (self.width as usize) + (pos.x as usize)
    }
}

/// Units standing on one cell. More than one is tolerated transiently while a
/// unit passes through an occupied cell mid-move.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    units: Vec<UnitId>,
}

impl Occupancy {
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }
}

impl GridIndex<Occupancy> {
    pub fn occupancy(width: i32, height: i32, cell_size: f32) -> Self {
        Self::new(width, height, cell_size, |_| Occupancy::default())
    }

    pub fn add_occupant(&mut self, pos: GridPos, unit: UnitId) {
        if let Some(cell) = self.get_mut(pos)
            && !cell.units.contains(&unit)
        {
            cell.units.push(unit);
        }
    }

    pub fn remove_occupant(&mut self, pos: GridPos, unit: UnitId) {
        if let Some(cell) = self.get_mut(pos) {
            cell.units.retain(|&id| id != unit);
        }
    }

    pub fn has_occupant(&self, pos: GridPos) -> bool {
        self.get(pos).is_some_and(|cell| !cell.units.is_empty())
    }

    pub fn occupant(&self, pos: GridPos) -> Option<UnitId> {
        self.get(pos).and_then(|cell| cell.units.first().copied())
    }

    pub fn occupants(&self, pos: GridPos) -> &[UnitId] {
        self.get(pos).map_or(&[], |cell| cell.units.as_slice())
    }

    /// Moves a unit's occupancy record in one step: remove old, add new.
    pub fn relocate(&mut self, unit: UnitId, from: GridPos, to: GridPos) {
        if from == to {
            return;
        }
        self.remove_occupant(from, unit);
        self.add_occupant(to, unit);
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn two_ids() -> (UnitId, UnitId) {
        let mut keys: SlotMap<UnitId, ()> = SlotMap::with_key();
        (keys.insert(()), keys.insert(()))
    }

    #[test]
    fn bounds_checks_fail_silently() {
        let mut grid = GridIndex::occupancy(4, 3, 2.0);
        let (a, _) = two_ids();
        assert!(grid.is_valid(GridPos::new(3, 2)));
        assert!(!grid.is_valid(GridPos::new(4, 0)));
        assert!(!grid.is_valid(GridPos::new(0, -1)));

        grid.add_occupant(GridPos::new(-1, 0), a);
        assert!(!grid.has_occupant(GridPos::new(-1, 0)));
        assert_eq!(grid.occupant(GridPos::new(9, 9)), None);
        assert!(grid.occupants(GridPos::new(9, 9)).is_empty());
    }

    #[test]
    fn world_conversion_scales_and_rounds_per_axis() {
        let grid = GridIndex::occupancy(10, 10, 2.0);
        assert_eq!(grid.grid_to_world(GridPos::new(3, 4)), Vec3::new(6.0, 0.0, 8.0));
        assert_eq!(grid.world_to_grid(Vec3::new(6.0, 5.0, 8.0)), GridPos::new(3, 4));
        assert_eq!(grid.world_to_grid(Vec3::new(6.9, 0.0, 7.1)), GridPos::new(3, 4));
        assert_eq!(grid.world_to_grid(Vec3::new(7.1, 0.0, 8.0)), GridPos::new(4, 4));
    }

    #[test]
    fn occupancy_add_remove_and_relocate() {
        let mut grid = GridIndex::occupancy(5, 5, 1.0);
        let (a, b) = two_ids();
        let cell = GridPos::new(2, 2);

        grid.add_occupant(cell, a);
        grid.add_occupant(cell, a);
        assert_eq!(grid.occupants(cell), &[a]);

        grid.add_occupant(cell, b);
        assert_eq!(grid.occupant(cell), Some(a));
        grid.remove_occupant(cell, a);
        assert_eq!(grid.occupant(cell), Some(b));

        grid.relocate(b, cell, GridPos::new(0, 4));
        assert!(!grid.has_occupant(cell));
        assert_eq!(grid.occupant(GridPos::new(0, 4)), Some(b));
    }

    #[test]
    fn positions_cover_grid_row_major() {
        let grid = GridIndex::new(3, 2, 1.0, |pos| pos.x + pos.z * 10);
        let all: Vec<_> = grid.positions().collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], GridPos::new(0, 0));
        assert_eq!(all[3], GridPos::new(0, 1));
        assert_eq!(grid.get(GridPos::new(2, 1)), Some(&12));
    }
}
