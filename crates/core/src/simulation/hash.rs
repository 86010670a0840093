//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Simulation {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.tick);
        hasher.write_u32(self.turn.turn());
        hasher.write_u8(match self.turn.phase() {
            Phase::Player => 0,
            Phase::Opponent => 1,
        });

        let mut units: Vec<&Unit> = self.board.units.values().collect();
        units.sort_by_key(|unit| unit.spawn_order);
        for unit in units {
            hasher.write_u32(unit.spawn_order);
            hasher.write_u8(match unit.faction {
                Faction::Player => 0,
                Faction::Opponent => 1,
            });
            hasher.write_i32(unit.pos.x);
            hasher.write_i32(unit.pos.z);
            hasher.write_u32(unit.action_points);
            hasher.write_i32(unit.health.current());
            hasher.write_u8(u8::from(unit.has_condition(UnitCondition::Dodging)));
        }
        hasher.finish()
    }
}
