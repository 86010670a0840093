use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tactics::{
    ActionKind, AdvanceStopReason, BattleOutcome, Faction, GridPos, Scenario, SimEvent, Simulation,
    UnitCondition, UnitId,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Commits per unit per phase before the autopilot moves on.
const MAX_COMMANDS_PER_UNIT: usize = 8;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario TOML file; the built-in skirmish is used when absent
    #[arg(short = 'f', long)]
    scenario: Option<PathBuf>,
    /// Overrides the scenario seed
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(short, long, default_value_t = 40)]
    max_turns: u32,
    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,
    /// Print the built-in skirmish as TOML and exit
    #[arg(long)]
    print_default: bool,
}

#[derive(Default)]
struct Tally {
    shots: usize,
    moves: usize,
    deaths: usize,
}

impl Tally {
    fn record(&mut self, events: Vec<SimEvent>) {
        for event in events {
            match event {
                SimEvent::ShotFired { .. } => self.shots += 1,
                SimEvent::UnitMoved { .. } => self.moves += 1,
                SimEvent::UnitDied { .. } => self.deaths += 1,
                _ => {}
            }
        }
    }
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Failed to parse scenario TOML: {}", path.display()))
}

fn nearest_opponent_distance(sim: &Simulation, unit: UnitId, cell: GridPos) -> Option<u32> {
    sim.opponents_of(unit)
        .into_iter()
        .filter_map(|id| sim.unit(id))
        .map(|enemy| enemy.pos.distance_squared(cell))
        .min()
}

/// Shoot the weakest visible enemy, else step toward the closest one, else dodge.
fn choose_command(sim: &mut Simulation, unit: UnitId) -> Result<Option<(ActionKind, GridPos)>> {
    let kinds = sim.action_kinds(unit);
    sim.select_unit(unit)?;

    if kinds.contains(&ActionKind::Shoot) {
        sim.select_action(ActionKind::Shoot)?;
        let targets = sim.highlighted_cells().map(|(cells, _)| cells).unwrap_or_default();
        let weakest = targets.into_iter().min_by_key(|&cell| {
            sim.unit_at(cell).map_or(i32::MAX, |target| target.health.current())
        });
        if let Some(cell) = weakest {
            return Ok(Some((ActionKind::Shoot, cell)));
        }
    }

    if kinds.contains(&ActionKind::Move) {
        let Some(here) = sim.unit(unit).map(|unit| unit.pos) else {
            return Ok(None);
        };
        sim.select_action(ActionKind::Move)?;
        let cells = sim.highlighted_cells().map(|(cells, _)| cells).unwrap_or_default();
        let current = nearest_opponent_distance(sim, unit, here);
        let closer = cells
            .into_iter()
            .filter_map(|cell| nearest_opponent_distance(sim, unit, cell).map(|d| (cell, d)))
            .min_by_key(|&(_, distance)| distance);
        if let (Some((cell, distance)), Some(current)) = (closer, current)
            && distance < current
        {
            return Ok(Some((ActionKind::Move, cell)));
        }
    }

    let dodging = sim.unit(unit).is_some_and(|unit| unit.has_condition(UnitCondition::Dodging));
    if kinds.contains(&ActionKind::Dodge) && !dodging {
        let Some(here) = sim.unit(unit).map(|unit| unit.pos) else {
            return Ok(None);
        };
        return Ok(Some((ActionKind::Dodge, here)));
    }
    Ok(None)
}

fn play_player_phase(sim: &mut Simulation, dt: f32, tally: &mut Tally) -> Result<()> {
    for unit in sim.units_of(Faction::Player) {
        for _ in 0..MAX_COMMANDS_PER_UNIT {
            if sim.outcome().is_some() || !sim.unit(unit).is_some_and(|u| u.action_points > 0) {
                break;
            }
            let Some((kind, cell)) = choose_command(sim, unit)? else {
                break;
            };
            sim.select_action(kind)?;
            if let Err(err) = sim.commit_action(cell) {
                warn!(%err, %kind, %cell, "autopilot command rejected");
                break;
            }
            let result = sim.advance(dt, 100_000);
            tally.record(sim.drain_events());
            if result.stop_reason == AdvanceStopReason::BudgetExhausted {
                bail!("player {kind} did not finish");
            }
        }
    }
    Ok(())
}

fn run(sim: &mut Simulation, max_turns: u32, dt: f32) -> Result<Tally> {
    let mut tally = Tally::default();
    while sim.outcome().is_none() && sim.turn() <= max_turns {
        play_player_phase(sim, dt, &mut tally)?;
        if sim.outcome().is_some() {
            break;
        }
        sim.end_turn()?;
        let result = sim.advance(dt, 100_000);
        tally.record(sim.drain_events());
        if result.stop_reason == AdvanceStopReason::BudgetExhausted {
            bail!("opponent phase did not hand the turn back on turn {}", sim.turn());
        }
    }
    Ok(tally)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.print_default {
        let text = toml::to_string_pretty(&Scenario::skirmish(args.seed.unwrap_or(42)))
            .context("Failed to render the default scenario")?;
        println!("{text}");
        return Ok(());
    }

    let mut scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => Scenario::skirmish(42),
    };
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    if args.dt.is_nan() || args.dt <= 0.0 {
        bail!("--dt must be positive, got {}", args.dt);
    }

    let mut sim = scenario.build().context("Failed to build scenario")?;
    info!(seed = scenario.seed, units = scenario.units.len(), "skirmish starting");
    let tally = run(&mut sim, args.max_turns, args.dt)?;

    println!("Skirmish complete.");
    println!("Outcome: {:?}", sim.outcome());
    println!("Turn: {}", sim.turn());
    println!("Final Tick: {}", sim.current_tick());
    println!("Shots: {}  Steps: {}  Deaths: {}", tally.shots, tally.moves, tally.deaths);
    for unit in sim.units() {
        println!(
            "  {:<10} {:?} at ({}) hp {}/{}",
            unit.name,
            unit.faction,
            unit.pos,
            unit.health.current(),
            unit.health.max()
        );
    }
    println!("Snapshot Hash: {}", sim.snapshot_hash());

    Ok(())
}
