//! Wheel Archer headless runner
//!
//! Plays an autopilot session against a simulated clock and prints a JSON
//! summary. Useful for balance passes over tuning files.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use serde::Serialize;

use wheel_archer::sim::{GameEvent, ManualClock, SessionStats};
use wheel_archer::{GameState, HudSnapshot, Session, TickInput, Tuning};

#[derive(Parser)]
#[command(name = "wheel-archer")]
#[command(about = "Run a headless autopilot session and report the result")]
struct Args {
    /// RNG seed
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Simulated seconds to play
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Frames per simulated second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Tuning JSON file (defaults when omitted)
    #[arg(short, long)]
    tuning: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    frames: u64,
    simulated_seconds: f32,
    score: u64,
    accuracy: f64,
    stats: SessionStats,
    wheel_angular_velocity: f32,
    combo_milestones: u32,
    hud: HudSnapshot,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    ensure!(args.fps > 0, "--fps must be positive");
    ensure!(args.seconds >= 0.0, "--seconds must not be negative");

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };

    log::info!(
        "Wheel Archer headless run: seed {}, {}s at {} fps",
        args.seed,
        args.seconds,
        args.fps
    );

    let clock = ManualClock::new(0.0);
    let mut session = Session::new(GameState::with_tuning(args.seed, tuning), &clock);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let dt = 1.0 / args.fps as f32;
    let frames = (args.seconds * args.fps as f32).round() as u64;
    let mut combo_milestones = 0;
    for _ in 0..frames {
        clock.advance(1000.0 / f64::from(args.fps));
        for event in session.frame(&input, dt) {
            if let Some(message) = event.message() {
                log::debug!("{message}");
            }
            if matches!(event, GameEvent::ComboMilestone { .. }) {
                combo_milestones += 1;
            }
        }
    }

    let state = &session.state;
    let summary = Summary {
        seed: args.seed,
        frames: session.sim.frames(),
        simulated_seconds: session.sim.elapsed_seconds(),
        score: state.score,
        accuracy: state.stats.accuracy(),
        stats: state.stats.clone(),
        wheel_angular_velocity: state.wheel.angular_velocity,
        combo_milestones,
        hud: session.hud(),
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .context("serializing summary")?;
    println!("{json}");
    Ok(())
}
