use std::collections::BTreeSet;
use std::mem;

use glam::Vec3;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;
use slotmap::SlotMap;
use tracing::{debug, info};

use crate::config::TacticsConfig;
use crate::error::SimError;
use crate::grid::{GridIndex, Occupancy};
use crate::obstacles::ObstacleProbe;
use crate::pathfinding::Pathfinder;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn apply_damage(&mut self, amount: i32) {
        self.current = (self.current - amount.max(0)).max(0);
    }

    pub fn apply_healing(&mut self, amount: i32) {
        self.current = (self.current + amount.max(0)).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    pub fn health_percent(&self) -> f32 {
        self.current as f32 / self.max as f32
    }
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub faction: Faction,
    pub pos: GridPos,
    /// Tracks `pos` except while a move is in flight.
    pub world_pos: Vec3,
    pub action_points: u32,
    pub action_point_max: u32,
    pub health: Health,
    pub conditions: BTreeSet<UnitCondition>,
    pub spawn_order: u32,
}

impl Unit {
    pub fn can_spend(&self, cost: u32) -> bool {
        self.action_points >= cost
    }

    pub fn has_condition(&self, condition: UnitCondition) -> bool {
        self.conditions.contains(&condition)
    }
}

/// Shared world state every action reads and mutates: the grid, the units
/// standing on it, the obstacle backend and the single random source.
#[derive(Debug)]
pub struct Battlefield {
    pub config: TacticsConfig,
    pub grid: GridIndex<Occupancy>,
    pub pathfinder: Pathfinder,
    pub units: SlotMap<UnitId, Unit>,
    pub rng: ChaCha8Rng,
    pub events: Vec<SimEvent>,
    obstacles: Box<dyn ObstacleProbe>,
    fallen: Vec<UnitId>,
    next_spawn_order: u32,
}

impl Battlefield {
    pub fn new(config: TacticsConfig, obstacles: Box<dyn ObstacleProbe>, rng: ChaCha8Rng) -> Self {
        let grid = GridIndex::occupancy(config.grid.width, config.grid.height, config.grid.cell_size);
        let mut pathfinder =
            Pathfinder::new(config.grid.width, config.grid.height, config.grid.cell_size);
        pathfinder.refresh_walkability(obstacles.as_ref());
        Self {
            config,
            grid,
            pathfinder,
            units: SlotMap::with_key(),
            rng,
            events: Vec::new(),
            obstacles,
            fallen: Vec::new(),
            next_spawn_order: 0,
        }
    }

    pub fn obstacles(&self) -> &dyn ObstacleProbe {
        self.obstacles.as_ref()
    }

    pub fn set_obstacles(&mut self, obstacles: Box<dyn ObstacleProbe>) {
        self.obstacles = obstacles;
        self.refresh_walkability();
    }

    pub fn refresh_walkability(&mut self) {
        self.pathfinder.refresh_walkability(self.obstacles.as_ref());
    }

    pub fn place_unit(
        &mut self,
        name: String,
        faction: Faction,
        pos: GridPos,
        action_point_max: u32,
        max_health: i32,
    ) -> Result<UnitId, SimError> {
        if !self.grid.is_valid(pos) {
            return Err(SimError::InvalidSpawn { pos, reason: "out of bounds" });
        }
        if !self.pathfinder.is_walkable(pos) {
            return Err(SimError::InvalidSpawn { pos, reason: "cell is blocked" });
        }
        if self.grid.has_occupant(pos) {
            return Err(SimError::InvalidSpawn { pos, reason: "cell is occupied" });
        }

        let spawn_order = self.next_spawn_order;
        self.next_spawn_order += 1;
        let world_pos = self.grid.grid_to_world(pos);
        let id = self.units.insert_with_key(|id| Unit {
            id,
            name,
            faction,
            pos,
            world_pos,
            action_points: action_point_max,
            action_point_max,
            health: Health::new(max_health),
            conditions: BTreeSet::new(),
            spawn_order,
        });
        self.grid.add_occupant(pos, id);
        debug!(unit = ?id, %pos, ?faction, "unit placed");
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Living units of one faction in spawn order.
    pub fn units_of(&self, faction: Faction) -> Vec<UnitId> {
        let mut ids: Vec<&Unit> =
            self.units.values().filter(|unit| unit.faction == faction).collect();
        ids.sort_by_key(|unit| unit.spawn_order);
        ids.into_iter().map(|unit| unit.id).collect()
    }

    pub fn opponents_of(&self, id: UnitId) -> Vec<UnitId> {
        match self.units.get(id) {
            Some(unit) => self.units_of(unit.faction.opposing()),
            None => Vec::new(),
        }
    }

    pub fn unit_at(&self, pos: GridPos) -> Option<&Unit> {
        self.grid.occupant(pos).and_then(|id| self.units.get(id))
    }

    pub fn spend_action_points(&mut self, id: UnitId, cost: u32) -> Result<(), SimError> {
        let unit = self.units.get_mut(id).ok_or(SimError::UnknownUnit(id))?;
        if !unit.can_spend(cost) {
            return Err(SimError::InsufficientActionPoints {
                needed: cost,
                available: unit.action_points,
            });
        }
        unit.action_points -= cost;
        self.events.push(SimEvent::ActionPointsChanged { unit: id });
        Ok(())
    }

    pub fn exhaust_action_points(&mut self, id: UnitId) {
        if let Some(unit) = self.units.get_mut(id)
            && unit.action_points > 0
        {
            unit.action_points = 0;
            self.events.push(SimEvent::ActionPointsChanged { unit: id });
        }
    }

    /// Keeps occupancy and the unit's own position in step.
    pub fn relocate_unit(&mut self, id: UnitId, to: GridPos) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        let from = unit.pos;
        if from == to {
            return;
        }
        unit.pos = to;
        self.grid.relocate(id, from, to);
    }

    /// Straight-line sight between two cell centers at shoulder height.
    pub fn has_line_of_sight(&self, from: GridPos, to: GridPos) -> bool {
        let lift = Vec3::new(0.0, self.config.shoot.shoulder_height, 0.0);
        let from = self.grid.grid_to_world(from) + lift;
        let to = self.grid.grid_to_world(to) + lift;
        !self.obstacles.is_line_blocked(from, to)
    }

    pub fn apply_damage(&mut self, id: UnitId, amount: i32) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        if unit.health.is_dead() {
            return;
        }
        unit.health.apply_damage(amount);
        self.events.push(SimEvent::HealthChanged { unit: id });
        if unit.health.is_dead() {
            info!(unit = %unit.name, "unit killed");
            self.fallen.push(id);
        }
    }

    pub(crate) fn take_fallen(&mut self) -> Vec<UnitId> {
        mem::take(&mut self.fallen)
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.rng.next_u64() % len as u64) as usize
    }

    /// Inclusive roll of one `sides`-sided die.
    pub fn roll(&mut self, sides: u32) -> u32 {
        (self.rng.next_u64() % u64::from(sides.max(1))) as u32 + 1
    }
}
