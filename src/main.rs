//! Bounce Shot headless driver
//!
//! Runs the simulation at a fixed timestep with the seeded autopilot at
//! the controls and prints the final board as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use bounce_shot::consts::{MAX_SUBSTEPS, SIM_DT};
use bounce_shot::sim::{GameEvent, GameState, tick};
use bounce_shot::{Autopilot, Settings};

#[derive(Parser)]
#[command(name = "bounce-shot")]
#[command(about = "Run a headless Bounce Shot session driven by the autopilot")]
struct Args {
    /// Settings JSON (defaults are used if missing)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 30.0)]
    seconds: f32,

    /// Autopilot seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Frame length fed to the accumulator, in seconds
    #[arg(long, default_value_t = 1.0 / 30.0)]
    frame: f32,

    /// Write the final snapshot here instead of stdout
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = Settings::load_or_default(args.settings.as_deref());

    log::info!(
        "Bounce Shot starting: {:.1}s, seed {}",
        args.seconds,
        args.seed
    );

    let mut state = GameState::new(settings);
    let mut pilot = Autopilot::new(args.seed);

    let frame = args.frame.clamp(SIM_DT, 0.1);
    let frames = (args.seconds / frame).ceil() as u64;
    let mut accumulator = 0.0;
    let mut cleared_total = 0;

    for _ in 0..frames {
        accumulator += frame;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = pilot.next_input(&state, SIM_DT);
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            for event in state.drain_events() {
                if let GameEvent::ColumnCleared { cleared, .. } = event {
                    cleared_total += cleared;
                }
                log::debug!("{:?}", event);
            }
        }
    }

    log::info!(
        "Finished after {} ticks, {} blocks cleared",
        state.time_ticks,
        cleared_total
    );

    let json = serde_json::to_string_pretty(&state.snapshot())?;
    match args.snapshot {
        Some(path) => fs::write(&path, json)
            .with_context(|| format!("writing snapshot to {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}
