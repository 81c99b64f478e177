#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays scripted shots against a bubble grid.

mod config;
mod render;

use std::{collections::VecDeque, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use hexpop_collision::ArenaCollider;
use hexpop_core::{Aim, AimController, CellCoord, Event, FireSignal, LevelLayout, Phase};
use hexpop_presentation::EntityArena;
use hexpop_system_orchestrator::{Collaborators, MatchOrchestrator};
use hexpop_world::{query, World};
use tracing::info;
use tracing_subscriber::prelude::*;

use crate::config::CliConfig;

/// Upper bound on ticks spent waiting for a single shot to resolve.
const MAX_TICKS_PER_SHOT: u32 = 10_000;

/// Command-line arguments accepted by the headless shooter.
#[derive(Debug, Parser)]
#[command(name = "hexpop", about = "Fires scripted shots into a hexagonal bubble grid")]
struct CliArgs {
    /// TOML file with `[grid]` and `[shooter]` sections.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON level layout; an empty grid is used when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Launch angle in degrees from the +x axis; repeat for several shots.
    #[arg(long = "shot", value_name = "DEGREES", allow_negative_numbers = true)]
    shots: Vec<f32>,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
}

/// Aim source fed by the driver loop.
#[derive(Debug, Default)]
struct QueuedAim {
    aim: Option<Aim>,
    signals: VecDeque<FireSignal>,
}

impl AimController for QueuedAim {
    fn aim(&mut self) -> Option<Aim> {
        self.aim
    }

    fn take_fire_signal(&mut self) -> Option<FireSignal> {
        self.signals.pop_front()
    }
}

/// Entry point for the hexpop command-line interface.
fn main() -> Result<()> {
    install_tracing();
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let level = match &args.level {
        Some(path) => config::load_level(path)?,
        None => LevelLayout::empty(config.grid.columns, config.grid.rows),
    };

    let mut world = World::with_layout(config.grid.layout().context("invalid grid config")?);
    let mut arena = EntityArena::new();
    let mut orchestrator = MatchOrchestrator::new(config.shooter);
    let mut events = Vec::new();
    orchestrator
        .load_level(&mut world, &level, &config.grid, &mut arena, &mut events)
        .context("failed to load level")?;
    events.clear();

    let layout = *query::layout(&world);
    let bottom = layout.grid_to_world(CellCoord::new(0, layout.rows() - 1)).y;
    let launcher = Vec2::new(0.0, bottom - layout.row_spacing() * 2.0);
    let dt = Duration::from_millis(args.tick_ms);
    let hold_ticks = hold_ticks(config.shooter.min_aim_hold(), dt);

    let mut aim = QueuedAim::default();
    for degrees in &args.shots {
        let radians = degrees.to_radians();
        aim.aim = Some(Aim {
            origin: launcher,
            direction: Vec2::new(radians.cos(), radians.sin()),
        });
        aim.signals.push_back(FireSignal::Pressed);

        let mut ticks = 0;
        let mut released = false;
        loop {
            if !released && ticks == hold_ticks {
                aim.signals.push_back(FireSignal::Released);
                released = true;
            }

            let collider = ArenaCollider::from_world(&world);
            let mut collaborators = Collaborators {
                aim: &mut aim,
                factory: &mut arena,
                collision: &collider,
            };
            orchestrator.tick(&mut world, &mut collaborators, dt, &mut events);
            let _ = arena.finish_drops();
            ticks += 1;

            if released && orchestrator.phase() == Phase::Idle {
                break;
            }
            if ticks >= MAX_TICKS_PER_SHOT {
                anyhow::bail!("shot at {degrees} degrees did not resolve");
            }
        }

        summarize(*degrees, &events);
        events.clear();
    }

    print!("{}", render::render_grid(&query::occupancy_view(&world)));
    Ok(())
}

fn install_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// Ticks needed to hold the fire button strictly longer than `minimum`.
fn hold_ticks(minimum: Duration, dt: Duration) -> u32 {
    let ticks = minimum.as_nanos() / dt.as_nanos().max(1) + 1;
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

fn summarize(degrees: f32, events: &[Event]) {
    for event in events {
        match event {
            Event::BubbleAttached { cell, color } => info!(
                degrees,
                column = cell.column(),
                row = cell.row(),
                ?color,
                "bubble attached"
            ),
            Event::ClusterPopped { color, cells } => {
                info!(degrees, ?color, count = cells.len(), "cluster popped")
            }
            Event::BubblesDropped { cells } => {
                info!(degrees, count = cells.len(), "bubbles dropped")
            }
            Event::ShotDiscarded { reason, .. } => info!(degrees, ?reason, "shot discarded"),
            Event::AimCancelled => info!(degrees, "aim cancelled"),
            _ => {}
        }
    }
}
