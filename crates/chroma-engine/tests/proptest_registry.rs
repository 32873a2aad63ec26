//! Property tests for the object registry: ids, order and deferred removal
//! stay consistent under arbitrary add/destroy/collect sequences, and
//! switching the world an even number of times changes nothing.

use std::sync::Arc;

use chroma_engine::prelude::*;
use glam::Vec2;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add,
    /// Destroy the n-th live object (modulo the live count).
    Destroy(usize),
    /// Touch the n-th live pickup, then sweep.
    Collect(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        1 => (0usize..32).prop_map(Op::Destroy),
        1 => (0usize..32).prop_map(Op::Collect),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn registry_matches_a_simple_model(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let grid = TileGrid::new(4, 4, Arc::new(TileTable::standard())).unwrap();
        let mut ctx = SimContext::new(grid);
        let mut objects = Objects::new();
        let mut alive: Vec<ObjectId> = Vec::new();
        let mut dead: Vec<ObjectId> = Vec::new();
        let mut added = 0u32;

        for op in ops {
            match op {
                Op::Add => {
                    // Spaced out so a touch reaches exactly one pickup.
                    let position = Vec2::new(added as f32 * 2.0, 0.0);
                    added += 1;
                    let id = objects.add(
                        GameObject::new(ObjectKind::Pickup(Pickup::new(Vec2::ONE))).at(position),
                    );
                    prop_assert!(!alive.contains(&id));
                    prop_assert!(!dead.contains(&id));
                    alive.push(id);
                }
                Op::Destroy(n) if !alive.is_empty() => {
                    let id = alive.remove(n % alive.len());
                    prop_assert!(objects.destroy(id).is_ok());
                    dead.push(id);
                }
                Op::Collect(n) if !alive.is_empty() => {
                    let id = alive[n % alive.len()];
                    let bounds = objects.get(id).unwrap().bounds();
                    objects.handle_collision(bounds, &mut ctx);
                    prop_assert_eq!(objects.len(), alive.len());
                    prop_assert_eq!(objects.destroy_marked(), vec![id]);
                    alive.retain(|other| *other != id);
                    dead.push(id);
                }
                _ => {}
            }

            let order: Vec<ObjectId> = objects.iter().map(|(id, _)| id).collect();
            prop_assert_eq!(&order, &alive);
            for id in &dead {
                prop_assert!(objects.get(*id).is_none());
                prop_assert!(objects.destroy(*id).is_err());
            }
        }
    }

    #[test]
    fn toggling_the_world_twice_restores_solidity_and_colors(
        tiles in prop::collection::vec(0usize..4, W * H),
        phases in prop::collection::vec(prop::option::of(any::<bool>()), 1..8),
        start_inverted in any::<bool>(),
        pairs in 1usize..4,
    ) {
        let palette = [
            standard::AIR,
            standard::WALL,
            standard::DARK_BLOCK,
            standard::LIGHT_BLOCK,
        ];
        let ids = tiles.iter().map(|t| palette[*t]).collect();
        let grid = TileGrid::from_ids(W, H, ids, Arc::new(TileTable::standard())).unwrap();
        let mut objects = Objects::new();
        for (i, phase) in phases.iter().enumerate() {
            let mut platform = MovingPlatform::new(Vec2::splat(0.75), Vec2::ZERO, 0.0);
            platform.phase = *phase;
            let position = Vec2::new((i % W) as f32 + 0.1, (i / W) as f32 + 0.1);
            objects.add(GameObject::new(ObjectKind::MovingPlatform(platform)).at(position));
        }

        let start = WorldSwitch::new(start_inverted);
        let before = world_view(&grid, &objects, start);
        let mut world = start;
        world.toggle();
        let flipped = world_view(&grid, &objects, world);
        for (&(id, was), &(flipped_id, now)) in before.solids.iter().zip(&flipped.solids) {
            prop_assert_eq!(id, flipped_id);
            let Some(ObjectKind::MovingPlatform(platform)) = objects.get(id).map(|o| &o.kind) else {
                unreachable!("only platforms were added");
            };
            if platform.phase.is_some() {
                prop_assert_ne!(was, now);
            } else {
                prop_assert!(was && now);
            }
        }

        for _ in 0..pairs * 2 - 1 {
            world.toggle();
        }
        prop_assert_eq!(world, start);
        prop_assert_eq!(world_view(&grid, &objects, world), before);
    }
}

const W: usize = 6;
const H: usize = 4;

/// Everything that depends on the world state: per-object solidity, per-cell
/// colors and blocking, and the overlap queries.
#[derive(Debug, PartialEq)]
struct WorldView {
    solids: Vec<(ObjectId, bool)>,
    colors: Vec<Option<Color>>,
    blocked: Vec<bool>,
    overlapping: Vec<Vec<ObjectId>>,
}

fn world_view(grid: &TileGrid, objects: &Objects, world: WorldSwitch) -> WorldView {
    let solids = objects.iter().map(|(id, o)| (id, o.is_solid(world))).collect();
    let collider = SceneCollider::new(grid, world, objects);
    let mut colors = Vec::new();
    let mut blocked = Vec::new();
    let mut overlapping = Vec::new();
    for y in 0..H as i32 {
        for x in 0..W as i32 {
            let cell = Bounds::new(
                Vec2::new(x as f32 + 0.25, y as f32 + 0.25),
                Vec2::splat(0.5),
            );
            colors.push(grid.color_at(x, y, world));
            blocked.push(collider.collides(cell));
            overlapping.push(objects.colliding_solids(cell, world).collect());
        }
    }
    WorldView {
        solids,
        colors,
        blocked,
        overlapping,
    }
}
