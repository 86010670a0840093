//! Tunable simulation parameters.
//! Scoring values are tunable heuristics rather than a balanced design.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::SimError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    pub grid: GridConfig,
    pub units: UnitConfig,
    pub opponent: OpponentConfig,
    pub movement: MoveConfig,
    pub shoot: ShootConfig,
    pub dodge: DodgeConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    pub cell_size: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    pub action_point_max: u32,
    pub max_health: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Pause before each chosen action executes. Observability only.
    pub thinking_delay_secs: f32,
    /// Failed executions tolerated for one unit before its points are forfeited.
    pub max_recovery_attempts: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveConfig {
    pub cost: u32,
    /// Search radius in cells; also caps path cost at `max_distance * 10`.
    pub max_distance: i32,
    pub speed: f32,
    pub stop_distance: f32,
    pub score_base: i32,
    pub score_per_target: i32,
    /// Score for holding a cell that already has targets.
    pub score_hold: i32,
    /// Score for advancing toward the nearest opponent when nothing else is worth doing.
    pub score_advance: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootConfig {
    pub cost: u32,
    /// Straight-line range in cells between cell centers.
    pub range: u32,
    pub aim_secs: f32,
    pub reload_secs: f32,
    pub damage_dice: u32,
    pub damage_sides: u32,
    pub shoulder_height: f32,
    pub score: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeConfig {
    pub cost: u32,
    pub spin_secs: f32,
    pub evade_percent: u32,
    pub score: i32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            units: UnitConfig::default(),
            opponent: OpponentConfig::default(),
            movement: MoveConfig::default(),
            shoot: ShootConfig::default(),
            dodge: DodgeConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { width: 10, height: 10, cell_size: 2.0 }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self { action_point_max: 3, max_health: 100 }
    }
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self { thinking_delay_secs: 0.5, max_recovery_attempts: 3 }
    }
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            cost: 1,
            max_distance: 7,
            speed: 4.0,
            stop_distance: 0.1,
            score_base: 100,
            score_per_target: 10,
            score_hold: 1,
            score_advance: 100,
        }
    }
}

impl Default for ShootConfig {
    fn default() -> Self {
        Self {
            cost: 1,
            range: 9,
            aim_secs: 0.5,
            reload_secs: 0.5,
            damage_dice: 7,
            damage_sides: 10,
            shoulder_height: 1.5,
            score: 100,
        }
    }
}

impl Default for DodgeConfig {
    fn default() -> Self {
        Self { cost: 1, spin_secs: 1.0, evade_percent: 50, score: 90 }
    }
}

impl ShootConfig {
    /// The firing wind-up lasts half again as long as the aim.
    pub fn fire_secs(&self) -> f32 {
        self.aim_secs * 1.5
    }
}

/// Largest grid side, move radius and shoot range accepted.
pub const MAX_GRID_SIDE: i32 = 1024;

impl TacticsConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        let problem = if self.grid.width <= 0 || self.grid.height <= 0 {
            Some(format!("grid must be non-empty, got {}x{}", self.grid.width, self.grid.height))
        } else if self.grid.width > MAX_GRID_SIDE || self.grid.height > MAX_GRID_SIDE {
            Some(format!(
                "grid sides are capped at {MAX_GRID_SIDE}, got {}x{}",
                self.grid.width, self.grid.height
            ))
        } else if !(self.grid.cell_size > 0.0) {
            Some(format!("cell size must be positive, got {}", self.grid.cell_size))
        } else if self.units.action_point_max == 0 {
            Some("action point maximum must be at least 1".to_string())
        } else if self.units.max_health <= 0 {
            Some(format!("max health must be positive, got {}", self.units.max_health))
        } else if self.movement.max_distance <= 0 {
            Some(format!("move distance must be positive, got {}", self.movement.max_distance))
        } else if self.movement.max_distance > MAX_GRID_SIDE {
            Some(format!(
                "move distance is capped at {MAX_GRID_SIDE}, got {}",
                self.movement.max_distance
            ))
        } else if self.shoot.range > MAX_GRID_SIDE.unsigned_abs() {
            Some(format!("shoot range is capped at {MAX_GRID_SIDE}, got {}", self.shoot.range))
        } else if self.movement.cost == 0 || self.shoot.cost == 0 || self.dodge.cost == 0 {
            Some("every action must cost at least one action point".to_string())
        } else if !(self.movement.speed > 0.0) {
            Some(format!("move speed must be positive, got {}", self.movement.speed))
        } else if self.shoot.damage_sides == 0 {
            Some("damage dice need at least one side".to_string())
        } else if self.dodge.evade_percent > 100 {
            Some(format!("evade chance is a percentage, got {}", self.dodge.evade_percent))
        } else {
            None
        };

        match problem {
            Some(reason) => {
                error!(%reason, "rejected tactics configuration");
                Err(SimError::InvalidConfig(reason))
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(TacticsConfig::default().validate(), Ok(()));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let mut config = TacticsConfig::default();
        config.grid.width = 0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn oversized_grid_and_range_are_rejected() {
        let mut config = TacticsConfig::default();
        config.grid.width = i32::MAX;
        config.grid.height = i32::MAX;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let mut config = TacticsConfig::default();
        config.shoot.range = u32::MAX;
        assert!(config.validate().is_err());

        let mut config = TacticsConfig::default();
        config.movement.max_distance = MAX_GRID_SIDE + 1;
        assert!(config.validate().is_err());

        let mut config = TacticsConfig::default();
        config.grid.width = MAX_GRID_SIDE;
        config.shoot.range = MAX_GRID_SIDE.unsigned_abs();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn free_actions_are_rejected() {
        for zero_cost in [0, 1, 2] {
            let mut config = TacticsConfig::default();
            match zero_cost {
                0 => config.movement.cost = 0,
                1 => config.shoot.cost = 0,
                _ => config.dodge.cost = 0,
            }
            assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
        }
    }

    #[test]
    fn nan_cell_size_is_rejected() {
        let mut config = TacticsConfig::default();
        config.grid.cell_size = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: TacticsConfig =
            serde_json::from_str(r#"{ "grid": { "width": 14 }, "shoot": { "range": 5 } }"#)
                .expect("partial config should parse");
        assert_eq!(config.grid.width, 14);
        assert_eq!(config.grid.height, 10);
        assert_eq!(config.shoot.range, 5);
        assert_eq!(config.shoot.damage_dice, 7);
        assert_eq!(config.movement.max_distance, 7);
    }
}
