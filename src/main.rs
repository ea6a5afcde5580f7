//! Horde entry point
//!
//! Runs an encounter headless at the fixed timestep with a stationary player
//! and prints a summary when the run ends.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;

use horde::Tuning;
use horde::consts::SIM_DT;
use horde::sim::{DirectorPhase, Encounter, Rect, SimEvent, TickInput, tick};

/// Headless wave-survival encounter runner
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tuning file (JSON); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for every random draw
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 180.0)]
    seconds: f32,

    /// Shoot at the nearest living agent
    #[arg(short, long)]
    autofire: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let tuning = match &args.config {
        Some(path) => Tuning::load(path).with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };

    let mut encounter = Encounter::new(tuning, args.seed);
    encounter.viewport = Some(Rect::from_center_size(Vec2::ZERO, Vec2::new(17.8, 10.0)));
    if let Err(err) = encounter.start() {
        log::error!("Encounter running without waves: {err}");
    }

    encounter.subscribe(|event| match event {
        SimEvent::WaveStarted { wave, agents } => log::info!("Wave {wave}: {agents} agents incoming"),
        SimEvent::PlayerDamaged { health } => log::debug!("Player hit, {health} health left"),
        SimEvent::PlayerDied => log::warn!("Player died"),
        _ => {}
    });

    let ticks = (args.seconds.max(0.0) / SIM_DT).ceil() as u64;
    let mut next_level = None;
    for _ in 0..ticks {
        let input = if args.autofire {
            aim_at_nearest(&encounter)
        } else {
            TickInput::default()
        };
        tick(&mut encounter, &input, SIM_DT);

        for event in encounter.drain_events() {
            if let SimEvent::LevelCompleted { next_level: level } = event {
                next_level = Some(level);
            }
        }

        let player_dead = encounter.player.as_ref().is_some_and(|p| p.is_dead());
        let finished = encounter.director.phase() == DirectorPhase::Completed && encounter.agents.is_empty();
        if player_dead || finished {
            break;
        }
    }

    let elapsed = encounter.time_ticks as f32 * SIM_DT;
    println!("Simulated {elapsed:.1}s (seed {})", encounter.seed);
    println!("Wave reached: {}", encounter.director.wave());
    println!("Agents alive: {}", encounter.alive_count());
    if let Some(player) = &encounter.player {
        println!("Kills: {}", player.kills());
        println!("Player health: {}/{}", player.health(), player.max_health());
    }
    if let Some(level) = next_level {
        println!("Level complete, next: {level}");
    }

    Ok(())
}

/// Hold the hit-scan trigger at the nearest agent, lobbing a projectile twice a second
fn aim_at_nearest(encounter: &Encounter) -> TickInput {
    let Some(player) = encounter.player.as_ref() else {
        return TickInput::default();
    };

    let nearest = encounter
        .agents
        .iter()
        .filter(|agent| !agent.is_dead())
        .min_by(|a, b| {
            a.position
                .distance_squared(player.position)
                .total_cmp(&b.position.distance_squared(player.position))
        });

    match nearest {
        Some(agent) => TickInput {
            aim: agent.position - player.position,
            fire_hitscan: true,
            fire_projectile: encounter.time_ticks % 30 == 0,
        },
        None => TickInput::default(),
    }
}
