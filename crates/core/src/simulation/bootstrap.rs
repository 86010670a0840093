//! Simulation construction and unit registration.
//! This module exists to isolate setup validation from runtime flow.
//! It does not own scenario parsing or turn advancement.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing::{error, info};

use super::*;
use crate::config::TacticsConfig;
use crate::error::SimError;
use crate::obstacles::ObstacleProbe;
use crate::scenario::UnitSpec;

impl Simulation {
    pub fn new(
        config: TacticsConfig,
        obstacles: Box<dyn ObstacleProbe>,
        seed: u64,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let board = Battlefield::new(config, obstacles, rng);
        info!(seed, width = board.grid.width(), height = board.grid.height(), "simulation created");
        Ok(Self {
            seed,
            tick: 0,
            board,
            actions: SecondaryMap::new(),
            turn: TurnController::new(),
            opponent: OpponentController {
                state: OpponentState::WaitingForTurn,
                queue: VecDeque::new(),
                current: None,
                recoveries: 0,
            },
            selection: Selection::default(),
            active: None,
        })
    }

    /// Places a unit, builds its actions and subscribes it to turn changes.
    pub fn spawn_unit(&mut self, spec: UnitSpec) -> Result<UnitId, SimError> {
        let actions = UnitAction::build_loadout(&self.board.config, &spec.loadout, None)?;
        let action_point_max =
            spec.action_point_max.unwrap_or(self.board.config.units.action_point_max);
        let max_health = spec.max_health.unwrap_or(self.board.config.units.max_health);
        let name = spec.name.clone();

        let id = self
            .board
            .place_unit(spec.name, spec.faction, spec.pos, action_point_max, max_health)
            .inspect_err(|err| error!(%err, unit = %name, "spawn rejected"))?;
        self.actions.insert(id, actions);
        self.turn.subscribe(id);
        info!(unit = %name, faction = ?spec.faction, pos = %spec.pos, "unit spawned");
        Ok(id)
    }
}
