//! Declarative battle setup: configuration, walls, roster and seed.
//! This module exists so hosts can describe a skirmish as data.
//! It does not read files; parsing belongs to the binaries.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TacticsConfig;
use crate::error::SimError;
use crate::obstacles::ObstacleMap;
use crate::simulation::Simulation;
use crate::types::{ActionKind, Faction, GridPos};

fn standard_loadout() -> Vec<ActionKind> {
    vec![ActionKind::Move, ActionKind::Shoot, ActionKind::Dodge]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub faction: Faction,
    pub pos: GridPos,
    #[serde(default = "standard_loadout")]
    pub loadout: Vec<ActionKind>,
    /// Falls back to the configured maximum.
    #[serde(default)]
    pub action_point_max: Option<u32>,
    #[serde(default)]
    pub max_health: Option<i32>,
}

impl UnitSpec {
    pub fn new(name: impl Into<String>, faction: Faction, pos: GridPos) -> Self {
        Self {
            name: name.into(),
            faction,
            pos,
            loadout: standard_loadout(),
            action_point_max: None,
            max_health: None,
        }
    }

    pub fn with_loadout(mut self, loadout: &[ActionKind]) -> Self {
        self.loadout = loadout.to_vec();
        self
    }

    pub fn with_action_points(mut self, max: u32) -> Self {
        self.action_point_max = Some(max);
        self
    }

    pub fn with_health(mut self, max: i32) -> Self {
        self.max_health = Some(max);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub seed: u64,
    #[serde(default)]
    pub config: TacticsConfig,
    #[serde(default)]
    pub obstacles: Vec<GridPos>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

impl Scenario {
    /// Two squads at opposite corners of the default grid with a short wall between them.
    pub fn skirmish(seed: u64) -> Self {
        let units = vec![
            UnitSpec::new("Ash", Faction::Player, GridPos::new(0, 0)),
            UnitSpec::new("Brook", Faction::Player, GridPos::new(2, 0)),
            UnitSpec::new("Cinder", Faction::Player, GridPos::new(0, 2)),
            UnitSpec::new("Grunt-1", Faction::Opponent, GridPos::new(9, 9)),
            UnitSpec::new("Grunt-2", Faction::Opponent, GridPos::new(7, 9)),
            UnitSpec::new("Grunt-3", Faction::Opponent, GridPos::new(9, 7)),
        ];
        let obstacles = vec![
            GridPos::new(4, 4),
            GridPos::new(5, 4),
            GridPos::new(4, 5),
            GridPos::new(2, 6),
            GridPos::new(7, 3),
        ];
        Self { seed, config: TacticsConfig::default(), obstacles, units }
    }

    pub fn build(&self) -> Result<Simulation, SimError> {
        let obstacles = ObstacleMap::new(self.config.grid.cell_size, self.obstacles.iter().copied());
        let mut sim = Simulation::new(self.config.clone(), Box::new(obstacles), self.seed)?;
        for spec in &self.units {
            sim.spawn_unit(spec.clone())?;
        }
        info!(seed = self.seed, units = self.units.len(), "scenario built");
        Ok(sim)
    }
}
