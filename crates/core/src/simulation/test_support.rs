//! Shared fixtures for the simulation regression suites.
//! This module exists to avoid repeating grid and roster setup across many tests.
//! It does not own production logic.

use super::*;
use crate::config::TacticsConfig;
use crate::obstacles::ObstacleMap;
use crate::scenario::UnitSpec;

pub(super) const DT: f32 = 0.1;

pub(super) fn sim_with(
    config: TacticsConfig,
    blocked: &[GridPos],
    roster: Vec<UnitSpec>,
    seed: u64,
) -> (Simulation, Vec<UnitId>) {
    let obstacles = ObstacleMap::new(config.grid.cell_size, blocked.iter().copied());
    let mut sim = Simulation::new(config, Box::new(obstacles), seed).expect("valid config");
    let ids = roster.into_iter().map(|spec| sim.spawn_unit(spec).expect("spawn")).collect();
    (sim, ids)
}

/// One player at (0, 0) and one opponent at (9, 9) on an open 10x10 grid.
/// Both are sturdy enough to survive a full phase of fire.
pub(super) fn corner_duel(seed: u64) -> (Simulation, UnitId, UnitId) {
    let (sim, ids) = sim_with(
        TacticsConfig::default(),
        &[],
        vec![
            UnitSpec::new("A", Faction::Player, GridPos::new(0, 0)).with_health(1000),
            UnitSpec::new("B", Faction::Opponent, GridPos::new(9, 9)).with_health(1000),
        ],
        seed,
    );
    (sim, ids[0], ids[1])
}

/// Ticks until the opponent hands the turn back. Returns ticks spent.
pub(super) fn finish_opponent_phase(sim: &mut Simulation) -> u32 {
    let mut ticks = 0;
    while sim.phase() == Phase::Opponent && sim.outcome().is_none() {
        sim.tick(DT);
        ticks += 1;
        assert!(ticks < 20_000, "opponent phase never ended");
    }
    ticks
}

/// Selects, commits and ticks a player action to completion.
pub(super) fn play(sim: &mut Simulation, unit: UnitId, kind: ActionKind, cell: GridPos) {
    sim.select_unit(unit).expect("select unit");
    sim.select_action(kind).expect("select action");
    sim.commit_action(cell).expect("commit");
    let mut ticks = 0;
    while sim.is_busy() {
        sim.tick(DT);
        ticks += 1;
        assert!(ticks < 10_000, "player action never completed");
    }
}
