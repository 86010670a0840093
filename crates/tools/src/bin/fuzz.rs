use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tactics::{AdvanceStopReason, Faction, Scenario, Simulation};

const DT: f32 = 0.1;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 30)]
    turns: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn assert_invariants(sim: &Simulation) {
    let board = sim.board();
    let occupied: usize = board.grid.positions().map(|pos| board.grid.occupants(pos).len()).sum();
    assert_eq!(occupied, sim.units().count(), "Invariant failed: occupancy drift");
    for unit in sim.units() {
        assert!(unit.action_points <= unit.action_point_max, "Invariant failed: AP > max AP");
        assert!(unit.health.current() <= unit.health.max(), "Invariant failed: HP > max HP");
        assert!(!unit.health.is_dead(), "Invariant failed: dead unit left on the board");
        assert!(board.pathfinder.is_walkable(unit.pos), "Invariant failed: unit inside wall");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for max {} turns...", args.seed, args.turns);
    let mut sim = Scenario::skirmish(args.seed).build()?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut commands = 0u32;
    let mut rejected = 0u32;

    while sim.turn() <= args.turns {
        if let Some(outcome) = sim.outcome() {
            println!("Finished with outcome {:?} on turn {}", outcome, sim.turn());
            break;
        }

        for _ in 0..6 {
            let players = sim.units_of(Faction::Player);
            if players.is_empty() {
                break;
            }
            let unit = choose(&mut rng, &players);
            sim.select_unit(unit)?;
            let kind = choose(&mut rng, &sim.action_kinds(unit));
            sim.select_action(kind)?;
            let cells = sim.highlighted_cells().map(|(cells, _)| cells).unwrap_or_default();
            let Some(cell) = (!cells.is_empty()).then(|| choose(&mut rng, &cells)) else {
                continue;
            };
            commands += 1;
            if sim.commit_action(cell).is_err() {
                rejected += 1;
                continue;
            }
            if sim.advance(DT, 10_000).stop_reason == AdvanceStopReason::BudgetExhausted {
                bail!("player {kind} never completed on seed {}", args.seed);
            }
            assert_invariants(&sim);
        }

        if sim.outcome().is_some() {
            continue;
        }
        sim.end_turn()?;
        if sim.advance(DT, 50_000).stop_reason == AdvanceStopReason::BudgetExhausted {
            bail!("opponent phase stalled on seed {}", args.seed);
        }
        assert_invariants(&sim);
        sim.drain_events();
    }

    println!("Fuzz complete: {commands} commands ({rejected} rejected).");
    println!("Final tick {}, hash {}", sim.current_tick(), sim.snapshot_hash());
    Ok(())
}
