//! Tick performance benchmarks.
//!
//! Measures the cost of a full simulation tick as the number of moving
//! platforms grows, a single long sub-stepped move through a tile grid, and
//! the solid object overlap query. At 60 Hz a tick has a 16.67ms budget; a
//! level of a few dozen objects should stay far below it.
//!
//! Run with: `cargo bench --bench tick_benchmarks`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chroma_engine::prelude::*;
use glam::Vec2;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const WIDTH: usize = 64;
const HEIGHT: usize = 32;

/// A walled room with a floor, the spawn in the lower left and `platforms`
/// moving platforms spread over the upper half.
fn level(platforms: usize) -> LevelData {
    let mut tiles = vec![standard::AIR; WIDTH * HEIGHT];
    for x in 0..WIDTH {
        tiles[x] = standard::WALL;
        tiles[(HEIGHT - 1) * WIDTH + x] = standard::WALL;
    }
    for y in 0..HEIGHT {
        tiles[y * WIDTH] = standard::WALL;
        tiles[y * WIDTH + WIDTH - 1] = standard::WALL;
    }
    tiles[(HEIGHT - 2) * WIDTH + 1] = standard::SPAWN;

    let placements = (0..platforms)
        .map(|i| Placement {
            prototype: PrototypeId(0),
            position: Vec2::new(
                2.0 + (i % 20) as f32 * 3.0,
                2.0 + (i / 20) as f32 * 2.0,
            ),
        })
        .collect();
    LevelData {
        width: WIDTH,
        height: HEIGHT,
        tiles,
        spawn: None,
        prototypes: vec![ObjectKind::MovingPlatform(MovingPlatform::new(
            Vec2::new(2.0, 0.5),
            Vec2::new(0.0, 4.0),
            0.05,
        ))],
        placements,
    }
}

fn sim(platforms: usize) -> Simulation {
    Simulation::from_level(
        &level(platforms),
        Arc::new(TileTable::standard()),
        PlayerConfig::default(),
        TickConfig {
            headless: true,
            ..TickConfig::default()
        },
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Benchmark 1: full tick
// ---------------------------------------------------------------------------

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for platforms in [0usize, 20, 100] {
        group.bench_with_input(
            BenchmarkId::new("platforms", platforms),
            &platforms,
            |b, &platforms| {
                let mut sim = sim(platforms);
                sim.set_input(InputFrame {
                    horizontal: 1.0,
                    ..InputFrame::default()
                });
                b.iter(|| {
                    sim.tick();
                    sim.drain_events();
                    black_box(sim.player().position())
                });
            },
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 2: sub-stepped movement
// ---------------------------------------------------------------------------

fn bench_move(c: &mut Criterion) {
    let grid = TileGrid::from_ids(
        WIDTH,
        HEIGHT,
        level(0).tiles,
        Arc::new(TileTable::standard()),
    )
    .unwrap();
    let collider = GridCollider {
        grid: &grid,
        world: WorldSwitch::default(),
    };

    c.bench_function("move_by/across_room", |b| {
        b.iter(|| {
            let mut body = Body::new(Vec2::new(1.1, 20.1), Vec2::splat(0.8));
            black_box(body.move_by(black_box(Vec2::new(70.0, 3.0)), &collider))
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark 3: solid object query
// ---------------------------------------------------------------------------

fn bench_solids(c: &mut Criterion) {
    let mut group = c.benchmark_group("colliding_solids");
    for platforms in [0usize, 100] {
        let mut sim = sim(platforms);
        sim.run_ticks(30);
        let area = Bounds::new(Vec2::new(10.0, 2.0), Vec2::new(20.0, 6.0));
        group.bench_with_input(
            BenchmarkId::new("platforms", platforms),
            &sim,
            |b, sim| {
                b.iter(|| {
                    black_box(
                        sim.objects()
                            .colliding_solids(black_box(area), sim.world())
                            .count(),
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_tick, bench_move, bench_solids);
criterion_main!(benches);
