//! Integration tests for the object registry: dispatch order, deferred
//! destruction, prototype cloning and cross-object commands.

use std::sync::Arc;

use chroma_engine::prelude::*;
use glam::Vec2;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ctx() -> SimContext {
    let grid = TileGrid::new(12, 12, Arc::new(TileTable::standard())).unwrap();
    SimContext::new(grid)
}

fn pickup_at(position: Vec2) -> GameObject {
    GameObject::new(ObjectKind::Pickup(Pickup::new(Vec2::ONE))).at(position)
}

fn platform(travel: Vec2, speed: f32) -> ObjectKind {
    ObjectKind::MovingPlatform(MovingPlatform::new(Vec2::ONE, travel, speed))
}

fn close(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < 1e-4
}

// ---------------------------------------------------------------------------
// Dispatch and destruction
// ---------------------------------------------------------------------------

#[test]
fn touch_callbacks_run_in_insertion_order() {
    let mut objects = Objects::new();
    let mut ctx = ctx();
    let b = objects.add(pickup_at(Vec2::new(2.2, 2.0)));
    let a = objects.add(pickup_at(Vec2::new(2.0, 2.0)));

    objects.handle_collision(Bounds::new(Vec2::new(2.5, 2.5), Vec2::ONE), &mut ctx);
    assert_eq!(
        ctx.events,
        vec![
            GameEvent::PickupCollected { object: b },
            GameEvent::PickupCollected { object: a }
        ]
    );
}

#[test]
fn self_destruction_waits_for_the_sweep() {
    let mut objects = Objects::new();
    let mut ctx = ctx();
    let first = objects.add(pickup_at(Vec2::new(1.0, 1.0)));
    let second = objects.add(pickup_at(Vec2::new(1.5, 1.0)));
    let bystander = objects.add(pickup_at(Vec2::new(8.0, 8.0)));

    let player = Bounds::new(Vec2::new(1.2, 1.2), Vec2::splat(0.8));
    objects.handle_collision(player, &mut ctx);

    // Both flagged, none removed while the pass ran.
    assert_eq!(objects.len(), 3);
    assert!(objects.get(first).unwrap().should_destroy());
    assert!(objects.get(second).unwrap().should_destroy());

    // A second overlap before the sweep does not collect twice.
    objects.handle_collision(player, &mut ctx);
    assert_eq!(ctx.events.len(), 2);

    assert_eq!(objects.destroy_marked(), vec![first, second]);
    assert!(!objects.contains(first));
    assert!(!objects.contains(second));
    assert!(objects.contains(bystander));
    assert!(objects.destroy_marked().is_empty());
}

#[test]
fn face_callbacks_reach_only_solid_objects() {
    let mut objects = Objects::new();
    let mut ctx = ctx();
    objects.add(
        GameObject::new(ObjectKind::ColorBlock(ColorBlock::new(
            Vec2::ONE,
            Ability::Glider,
            Ability::None,
        )))
        .at(Vec2::new(3.0, 4.0)),
    );
    objects.add(pickup_at(Vec2::new(3.0, 4.0)));
    objects.add(
        GameObject::new(ObjectKind::MovingPlatform(
            MovingPlatform::new(Vec2::ONE, Vec2::ZERO, 0.0)
                .with_phase(true)
                .with_spikes(&[Face::Up]),
        ))
        .at(Vec2::new(3.0, 4.0)),
    );

    let probe = Bounds::new(Vec2::new(3.1, 3.3), Vec2::splat(0.8));
    assert!(objects.handle_face_collision(probe, Face::Down, &mut ctx));
    assert_eq!(
        ctx.effects,
        vec![PlayerEffect::SetAbilities {
            dark: Ability::Glider,
            light: Ability::None
        }]
    );
    assert!(ctx.events.is_empty());

    // In the inverted world the phased platform is there, and its top is
    // spiked.
    ctx.effects.clear();
    ctx.world = WorldSwitch::new(true);
    objects.handle_face_collision(probe, Face::Down, &mut ctx);
    assert!(ctx
        .effects
        .iter()
        .any(|e| matches!(e, PlayerEffect::Kill(KillCause::Hazard(_)))));

    let far = Bounds::new(Vec2::new(9.0, 9.0), Vec2::splat(0.8));
    assert!(!objects.handle_face_collision(far, Face::Down, &mut ctx));
}

// ---------------------------------------------------------------------------
// Prototypes
// ---------------------------------------------------------------------------

#[test]
fn spawned_clones_move_independently_of_each_other() {
    let mut objects = Objects::new();
    let mut ctx = ctx();
    let proto = objects
        .add_prototype(platform(Vec2::new(2.0, 0.0), 0.5))
        .unwrap();
    let a = objects.spawn(proto, Vec2::new(1.0, 1.0)).unwrap();
    let b = objects.spawn(proto, Vec2::new(4.0, 6.0)).unwrap();

    for _ in 0..4 {
        objects.tick_all(&mut ctx);
    }
    assert!(close(objects.get(a).unwrap().position(), Vec2::new(3.0, 1.0)));
    assert!(close(objects.get(b).unwrap().position(), Vec2::new(6.0, 6.0)));
    assert_eq!(objects.prototype(proto).unwrap().position(), Vec2::ZERO);

    objects.reset();
    assert_eq!(objects.get(a).unwrap().position(), Vec2::new(1.0, 1.0));
    assert_eq!(objects.get(b).unwrap().position(), Vec2::new(4.0, 6.0));
}

#[test]
fn invalid_prototype_is_rejected_with_its_index() {
    let mut objects = Objects::new();
    objects
        .add_prototype(ObjectKind::Pickup(Pickup::new(Vec2::ONE)))
        .unwrap();
    let err = objects
        .add_prototype(platform(Vec2::X, f32::NAN))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidPrototype {
            prototype: PrototypeId(1),
            ..
        }
    ));
    assert_eq!(objects.prototype_count(), 1);
}

#[test]
fn absorb_rebases_prototype_ids() {
    let mut base = Objects::new();
    base.add_prototype(ObjectKind::Pickup(Pickup::new(Vec2::ONE)))
        .unwrap();

    let mut level = Objects::new();
    level
        .add_prototype(ObjectKind::Pickup(Pickup::new(Vec2::ONE)))
        .unwrap();
    let wind = level
        .add_prototype(ObjectKind::Wind(Wind::new(Vec2::ONE, Vec2::X)))
        .unwrap();
    level.spawn(wind, Vec2::new(2.0, 2.0)).unwrap();

    base.absorb(level);
    assert_eq!(base.prototype_count(), 3);
    let (_, object) = base.iter().next().unwrap();
    assert_eq!(object.prototype, Some(PrototypeId(2)));
    assert_eq!(object.position(), Vec2::new(2.0, 2.0));
    assert!(matches!(
        base.prototype(PrototypeId(2)).unwrap().kind,
        ObjectKind::Wind(_)
    ));
}

// ---------------------------------------------------------------------------
// Cross-object behavior
// ---------------------------------------------------------------------------

#[test]
fn collected_key_flies_to_its_door_and_opens_it() {
    let mut objects = Objects::new();
    let mut ctx = ctx();
    let key = objects.add(GameObject::new(ObjectKind::Key(Key::new(1))).at(Vec2::new(1.0, 1.0)));
    let door = objects.add(
        GameObject::new(ObjectKind::Door(Door::new(Vec2::new(1.0, 2.0), 1)))
            .at(Vec2::new(5.0, 1.0)),
    );
    let world = ctx.world;
    assert!(objects.get(door).unwrap().is_solid(world));

    objects.handle_collision(Bounds::new(Vec2::new(1.1, 1.1), Vec2::splat(0.8)), &mut ctx);
    assert_eq!(
        ctx.events,
        vec![GameEvent::KeyCollected {
            site: Site::Object(key)
        }]
    );

    for _ in 0..200 {
        objects.tick_all(&mut ctx);
    }
    assert!(ctx
        .events
        .contains(&GameEvent::DoorOpened { door }));
    assert!(!objects.get(door).unwrap().is_solid(world));
    match &objects.get(key).unwrap().kind {
        ObjectKind::Key(k) => assert!(k.is_delivered()),
        other => panic!("unexpected {other:?}"),
    }

    objects.reset();
    assert!(objects.get(door).unwrap().is_solid(world));
    match &objects.get(door).unwrap().kind {
        ObjectKind::Door(d) => assert_eq!(d.progress(), (0, 0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn platform_pushes_player_out_of_its_path() {
    let mut objects = Objects::new();
    let mut ctx = ctx();
    let id = objects.add(GameObject::new(platform(Vec2::new(2.0, 0.0), 0.5)).at(Vec2::new(1.0, 1.0)));
    ctx.player.bounds = Bounds::new(Vec2::new(2.2, 1.0), Vec2::splat(0.8));

    objects.tick_all(&mut ctx);
    let [PlayerEffect::Push { by, offset }] = ctx.effects[..] else {
        panic!("expected a single push, got {:?}", ctx.effects);
    };
    assert_eq!(by, id);
    assert_eq!(offset.y, 0.0);
    assert!(offset.x >= 0.3 - 1e-4, "offset {offset}");
    assert!(!ctx
        .player
        .bounds
        .overlaps(&objects.get(id).unwrap().bounds()));
}

#[test]
fn nearest_wind_is_heard_and_ties_go_to_the_first() {
    let mut objects = Objects::new();
    let mut ctx = ctx();
    ctx.player.bounds = Bounds::new(Vec2::new(5.0, 5.0), Vec2::splat(0.8));
    let left = objects.add(
        GameObject::new(ObjectKind::Wind(Wind::new(Vec2::new(2.0, 1.0), Vec2::X)))
            .at(Vec2::new(1.0, 5.0)),
    );
    let right = objects.add(
        GameObject::new(ObjectKind::Wind(Wind::new(Vec2::new(2.0, 1.0), Vec2::NEG_X)))
            .at(Vec2::new(7.0, 5.0)),
    );

    objects.tick_all(&mut ctx);
    assert_eq!(ctx.wind.nearest(), Some((left, 2.0)));
    assert!(!ctx.wind.is_audible(right));

    objects.destroy(left).unwrap();
    ctx.wind.forget(left);
    objects.tick_all(&mut ctx);
    assert!(ctx.wind.is_audible(right));

    ctx.player.bounds = Bounds::new(Vec2::new(5.0, 30.0), Vec2::splat(0.8));
    objects.tick_all(&mut ctx);
    assert_eq!(ctx.wind.nearest(), None);
}
