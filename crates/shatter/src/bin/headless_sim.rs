//! # SHATTER Headless Simulation
//!
//! Runs a full game without a window: spawns, random hits, fragmentation,
//! score and effects, then prints a summary.
//!
//! ```bash
//! # Reference config, 60 simulated seconds
//! ./headless_sim
//!
//! # Custom config and seed
//! RUST_LOG=shatter=debug ./headless_sim balance.toml --ticks 7200 --seed 7
//! ```

use std::process::ExitCode;

use shatter::gameplay::{RandomSource, SeededRandom, StaticWorld};
use shatter::shared::{FIXED_TIMESTEP, TICK_RATE};
use shatter::{GameConfig, GameState, Session};
use tracing::{error, info};

/// Chance per tick that some entity gets hit.
const HIT_CHANCE: f32 = 0.08;

/// Tick at which the simulated player dies, as a fraction of the run.
const PLAYER_DEATH_AT: f32 = 0.9;

struct Args {
    config_path: Option<String>,
    ticks: u64,
    seed: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config_path: None,
        ticks: u64::from(TICK_RATE) * 60,
        seed: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = iter.next().ok_or("--ticks needs a value")?;
                args.ticks = value.parse().map_err(|_| format!("bad tick count: {value}"))?;
            }
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                args.seed = Some(value.parse().map_err(|_| format!("bad seed: {value}"))?);
            }
            path => args.config_path = Some(path.to_owned()),
        }
    }

    Ok(args)
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("usage: headless_sim [config.toml] [--ticks N] [--seed S]\n{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = match &args.config_path {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, path = %path, "config rejected");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.session.seed = seed;
    }

    let world = StaticWorld::new(config.play_field);
    let mut hits = SeededRandom::new(config.session.seed.wrapping_add(1));
    let mut session = match Session::new(config) {
        Ok(session) => session,
        Err(err) => {
            error!(%err, "session setup failed");
            return ExitCode::FAILURE;
        }
    };

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    SHATTER HEADLESS SIMULATION");
    println!("═══════════════════════════════════════════════════════════════════");

    session.start_game();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let death_tick = (args.ticks as f32 * PLAYER_DEATH_AT) as u64;

    for tick in 0..args.ticks {
        if session.state() == GameState::GameOver {
            break;
        }
        if tick == death_tick {
            session.player_died();
        }
        if hits.next_unit() < HIT_CHANCE {
            let ids = session.spawner().entity_ids();
            if !ids.is_empty() {
                let target = ids[hits.index(ids.len())];
                session.queue_damage(target, 1);
            }
        }
        session.tick(FIXED_TIMESTEP, &world);
    }

    let score = session.score().score();
    let high_score = session.score().high_score();
    let final_state = session.state();
    let off_field = session
        .spawner()
        .entities()
        .filter(|entity| !world.field.contains(entity.body().position))
        .count();
    let stats = session.teardown();

    info!(ticks = stats.ticks_recorded, score, "simulation finished");
    println!("Ticks:              {}", stats.ticks_recorded);
    println!("Final state:        {final_state:?}");
    println!("Spawned:            {} ({} fragments)", stats.spawned, stats.fragments);
    println!("Destroyed:          {}", stats.destroyed);
    println!("Peak population:    {}", stats.peak_population);
    println!("Off field at end:   {off_field}");
    println!("Events per tick:    {:.2}", stats.avg_events_per_tick());
    println!("Handler failures:   {}", stats.handler_failures);
    println!("Score:              {score} (high score {high_score})");
    println!("═══════════════════════════════════════════════════════════════════");

    ExitCode::SUCCESS
}
