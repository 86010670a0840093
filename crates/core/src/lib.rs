pub mod actions;
pub mod config;
pub mod error;
pub mod grid;
pub mod obstacles;
pub mod pathfinding;
pub mod scenario;
pub mod simulation;
pub mod state;
pub mod turn;
pub mod types;

pub use actions::{Action, ActionProgress, Candidate, UnitAction};
pub use config::TacticsConfig;
pub use error::SimError;
pub use grid::{GridIndex, Occupancy};
pub use obstacles::{ObstacleMap, ObstacleProbe};
pub use pathfinding::{Path, Pathfinder};
pub use scenario::{Scenario, UnitSpec};
pub use simulation::{AdvanceResult, AdvanceStopReason, Driver, OpponentState, Simulation};
pub use state::{Battlefield, Health, Unit};
pub use turn::TurnController;
pub use types::*;
