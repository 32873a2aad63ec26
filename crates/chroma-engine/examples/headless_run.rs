//! Headless run -- simulate a level without a window and print what happened.
//!
//! Run with:
//!   cargo run --example headless_run -p chroma-engine [level.json] [ticks]
//!
//! Without a level file a small built-in level is used. Set `RUST_LOG=debug`
//! to see the engine's own tracing output.

use std::sync::Arc;

use anyhow::Context;
use chroma_engine::prelude::*;
use glam::Vec2;

// ---------------------------------------------------------------------------
// Level setup
// ---------------------------------------------------------------------------

const DEMO: &[&str] = &[
    "################",
    "#..............#",
    "#..........K...#",
    "#..............#",
    "#S.....ll......#",
    "#.............G#",
    "#####^^^########",
    "################",
];

fn demo_level() -> LevelData {
    let tiles = DEMO
        .iter()
        .flat_map(|row| row.chars())
        .map(|c| match c {
            '#' => standard::WALL,
            'S' => standard::SPAWN,
            'K' => standard::KEY,
            'G' => standard::GOAL_LEFT,
            '^' => standard::SPIKES_UP,
            'l' => standard::LIGHT_BLOCK,
            _ => standard::AIR,
        })
        .collect();
    LevelData {
        width: DEMO[0].len(),
        height: DEMO.len(),
        tiles,
        spawn: None,
        prototypes: vec![
            ObjectKind::ColorBlock(ColorBlock::new(
                Vec2::ONE,
                Ability::DoubleJump,
                Ability::Glider,
            )),
            ObjectKind::Wind(Wind::new(Vec2::new(3.0, 4.0), Vec2::new(0.0, -0.01))),
        ],
        placements: vec![
            Placement {
                prototype: PrototypeId(0),
                position: Vec2::new(2.0, 5.0),
            },
            Placement {
                prototype: PrototypeId(1),
                position: Vec2::new(5.0, 1.0),
            },
        ],
    }
}

/// Walk right the whole time, jumping now and then.
fn input_for(tick: u64) -> InputFrame {
    let jump = match tick % 40 {
        0 => Button::TAPPED,
        1..=12 => Button::HELD,
        _ => Button::RELEASED,
    };
    InputFrame {
        horizontal: 1.0,
        jump,
        ..InputFrame::default()
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let level = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read level file {path}"))?;
            LevelData::from_json(&text)?
        }
        None => demo_level(),
    };
    let ticks: u64 = match args.next() {
        Some(n) => n.parse().context("tick count must be a number")?,
        None => 600,
    };

    let config = TickConfig {
        headless: true,
        ..TickConfig::default()
    };
    let mut sim = Simulation::from_level(
        &level,
        Arc::new(TileTable::standard()),
        PlayerConfig::default(),
        config,
    )?;

    let mut slowest = std::time::Duration::ZERO;
    for _ in 0..ticks {
        sim.step(input_for(sim.tick_count()));
        slowest = slowest.max(sim.last_diagnostics().total_time);
        for record in sim.drain_events() {
            println!("[{:>5}] {:?}", record.tick, record.event);
        }
    }

    let player = sim.player();
    println!(
        "ran {} ticks ({:.2}s simulated), slowest tick {:?}",
        sim.tick_count(),
        sim.sim_time(),
        slowest
    );
    println!(
        "player at {:.3}, {} deaths, {} objects left",
        player.position(),
        player.deaths(),
        sim.objects().len()
    );
    println!(
        "world {}, level selected {:?}",
        if sim.world().is_inverted() { "inverted" } else { "normal" },
        sim.selected_level()
    );
    Ok(())
}
