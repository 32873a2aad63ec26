//! The object registry.
//!
//! [`Objects`] owns every live game object in slots addressed by generational
//! [`ObjectId`]s, plus the list of prototypes objects are cloned from. A
//! separate order list keeps insertion order, which is the order objects tick
//! and receive collision callbacks in: an object ticking later sees the fresh
//! state of the ones before it.
//!
//! Objects flag themselves for removal; [`Objects::destroy_marked`] sweeps
//! them once all passes of a tick are done, so a callback can never pull an
//! object out from under a running iteration.

use chroma_grid::prelude::{probe, Bounds, Face, TileGrid, WorldSwitch};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::body::Collider;
use crate::context::SimContext;
use crate::entity::{IdAllocator, ObjectId};
use crate::object::{GameObject, ObjectCommand, ObjectKind, PrototypeId, TickScope};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Objects {
    ids: IdAllocator,
    /// Indexed by [`ObjectId::index`].
    slots: Vec<Option<GameObject>>,
    order: Vec<ObjectId>,
    prototypes: Vec<GameObject>,
}

impl Objects {
    pub fn new() -> Self {
        Self::default()
    }

    // -- prototypes ---------------------------------------------------------

    /// Register a prototype and return its id.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidPrototype`] if the payload fails validation.
    pub fn add_prototype(&mut self, kind: ObjectKind) -> Result<PrototypeId, EngineError> {
        let id = PrototypeId(self.prototypes.len() as u32);
        kind.validate()
            .map_err(|reason| EngineError::InvalidPrototype { prototype: id, reason })?;
        let mut proto = GameObject::new(kind);
        proto.prototype = Some(id);
        self.prototypes.push(proto);
        Ok(id)
    }

    pub fn prototype(&self, id: PrototypeId) -> Option<&GameObject> {
        self.prototypes.get(id.0 as usize)
    }

    pub fn prototype_count(&self) -> usize {
        self.prototypes.len()
    }

    pub fn clear_prototypes(&mut self) {
        self.prototypes.clear();
    }

    // -- spawning -----------------------------------------------------------

    /// Clone prototype `proto` to `position`, register it and run its
    /// post-spawn hook.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownPrototype`]; nothing is registered on error.
    pub fn spawn(&mut self, proto: PrototypeId, position: Vec2) -> Result<ObjectId, EngineError> {
        let template = self
            .prototype(proto)
            .ok_or(EngineError::UnknownPrototype {
                prototype: proto,
                registered: self.prototypes.len(),
            })?;
        let object = template.clone().at(position);
        Ok(self.add(object))
    }

    /// Register an object built directly, then run its post-spawn hook on
    /// the registered copy.
    pub fn add(&mut self, object: GameObject) -> ObjectId {
        let id = self.insert(object);
        if let Some(object) = self.get_mut(id) {
            object.post_spawn();
        }
        id
    }

    /// Move every prototype and object of `other` into this registry,
    /// keeping their order. Objects get fresh ids and keep their state.
    pub fn absorb(&mut self, other: Objects) {
        let offset = self.prototypes.len() as u32;
        let rebase = |proto: Option<PrototypeId>| proto.map(|p| PrototypeId(p.0 + offset));
        let Objects {
            order,
            mut slots,
            prototypes,
            ..
        } = other;
        for mut proto in prototypes {
            proto.prototype = rebase(proto.prototype);
            self.prototypes.push(proto);
        }
        for id in order {
            if let Some(mut object) = slots.get_mut(id.index() as usize).and_then(Option::take) {
                object.prototype = rebase(object.prototype);
                self.insert(object);
            }
        }
    }

    fn insert(&mut self, object: GameObject) -> ObjectId {
        let id = self.ids.allocate();
        let index = id.index() as usize;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        trace!(object = %id, kind = object.kind.name(), "object spawned");
        self.slots[index] = Some(object);
        self.order.push(id);
        id
    }

    // -- access -------------------------------------------------------------

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        if !self.ids.is_alive(id) {
            return None;
        }
        self.slots.get(id.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        if !self.ids.is_alive(id) {
            return None;
        }
        self.slots.get_mut(id.index() as usize)?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.get(*id).map(|object| (*id, object)))
    }

    /// The first door of `kind` in insertion order.
    pub fn find_door(&self, kind: u8) -> Option<(ObjectId, &GameObject)> {
        self.iter()
            .find(|(_, o)| matches!(&o.kind, ObjectKind::Door(door) if door.kind == kind))
    }

    /// Number of key objects of `kind`.
    pub fn count_keys(&self, kind: u8) -> u32 {
        self.iter()
            .filter(|(_, o)| matches!(&o.kind, ObjectKind::Key(key) if key.kind == kind))
            .count() as u32
    }

    // -- collision queries --------------------------------------------------

    /// Ids of the objects solid in `world` that overlap `bounds`, in
    /// insertion order.
    pub fn colliding_solids(
        &self,
        bounds: Bounds,
        world: WorldSwitch,
    ) -> impl Iterator<Item = ObjectId> + '_ {
        self.iter()
            .filter(move |(_, o)| o.is_solid(world) && o.collides_with(bounds))
            .map(|(id, _)| id)
    }

    /// Whether a solid object other than `ignore` overlaps `bounds`.
    pub fn collides_with_solid(
        &self,
        bounds: Bounds,
        world: WorldSwitch,
        ignore: Option<ObjectId>,
    ) -> bool {
        self.colliding_solids(bounds, world).any(|id| Some(id) != ignore)
    }

    // -- dispatch -----------------------------------------------------------

    /// Run the face callback of every solid object the `face` probe box
    /// overlaps. Returns whether any did.
    pub fn handle_face_collision(
        &mut self,
        bounds: Bounds,
        face: Face,
        ctx: &mut SimContext,
    ) -> bool {
        let world = ctx.world;
        let mut hit = false;
        let Self { order, slots, .. } = self;
        for &id in order.iter() {
            let Some(Some(object)) = slots.get_mut(id.index() as usize) else {
                continue;
            };
            if object.is_solid(world) && object.collides_with(bounds) {
                object.on_face_collision(id, face, ctx);
                hit = true;
            }
        }
        hit
    }

    /// Run the touch callback of every object `bounds` overlaps.
    pub fn handle_collision(&mut self, bounds: Bounds, ctx: &mut SimContext) {
        let Self { order, slots, .. } = self;
        for &id in order.iter() {
            let Some(Some(object)) = slots.get_mut(id.index() as usize) else {
                continue;
            };
            if object.collides_with(bounds) {
                object.on_collision(id, ctx);
            }
        }
    }

    // -- lifecycle ----------------------------------------------------------

    /// Tick every object in insertion order.
    ///
    /// The ticking object is taken out of its slot for the duration of its
    /// tick so it can read the rest of the registry; commands it queues are
    /// applied before the next object ticks.
    pub fn tick_all(&mut self, ctx: &mut SimContext) {
        let mut commands = Vec::new();
        for i in 0..self.order.len() {
            let id = self.order[i];
            let index = id.index() as usize;
            let Some(mut object) = self.slots.get_mut(index).and_then(Option::take) else {
                continue;
            };
            {
                let mut scope = TickScope {
                    id,
                    ctx: &mut *ctx,
                    others: &*self,
                    commands: &mut commands,
                };
                object.tick(&mut scope);
            }
            self.slots[index] = Some(object);
            self.apply_commands(&mut commands);
        }
    }

    fn apply_commands(&mut self, commands: &mut Vec<ObjectCommand>) {
        for command in commands.drain(..) {
            match command {
                ObjectCommand::AddKey { kind } => {
                    let total = self.count_keys(kind);
                    let door = self.find_door(kind).map(|(id, _)| id);
                    match door.and_then(|id| self.get_mut(id)) {
                        Some(GameObject {
                            kind: ObjectKind::Door(door),
                            ..
                        }) => door.add_key(total),
                        _ => trace!(kind, "key delivered without a door"),
                    }
                }
                ObjectCommand::PushParticles { bounds, velocity } => {
                    for object in self.slots.iter_mut().flatten() {
                        object.push_particles(bounds, velocity);
                    }
                }
            }
        }
    }

    /// Remove every object flagged for destruction. Returns the removed ids.
    pub fn destroy_marked(&mut self) -> Vec<ObjectId> {
        let marked: Vec<ObjectId> = self
            .iter()
            .filter(|(_, o)| o.should_destroy())
            .map(|(id, _)| id)
            .collect();
        for &id in &marked {
            self.remove(id);
        }
        if !marked.is_empty() {
            trace!(count = marked.len(), "destroyed marked objects");
        }
        marked
    }

    /// Remove one object immediately.
    ///
    /// # Errors
    ///
    /// [`EngineError::StaleObject`] if `id` does not name a live object.
    pub fn destroy(&mut self, id: ObjectId) -> Result<GameObject, EngineError> {
        self.remove(id).ok_or_else(|| {
            warn!(object = %id, "destroy of stale object id");
            EngineError::StaleObject { id }
        })
    }

    fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        if !self.ids.release(id) {
            return None;
        }
        self.order.retain(|other| *other != id);
        self.slots.get_mut(id.index() as usize)?.take()
    }

    /// Reset every live object to its spawn-time state.
    ///
    /// Objects already removed, such as collected pickups, stay removed.
    pub fn reset(&mut self) {
        for object in self.slots.iter_mut().flatten() {
            object.reset();
        }
        debug!(objects = self.order.len(), "objects reset");
    }

    /// Remove every object that is not persistent, ahead of loading a new
    /// level.
    pub fn clear_level(&mut self) {
        let doomed: Vec<ObjectId> = self
            .iter()
            .filter(|(_, o)| !o.persistent)
            .map(|(id, _)| id)
            .collect();
        for id in doomed {
            self.remove(id);
        }
    }
}

// ---------------------------------------------------------------------------
// SceneCollider
// ---------------------------------------------------------------------------

/// Blocking by the grid plus every solid object, optionally ignoring one.
#[derive(Debug, Clone, Copy)]
pub struct SceneCollider<'a> {
    pub grid: &'a TileGrid,
    pub world: WorldSwitch,
    pub objects: &'a Objects,
    pub ignore: Option<ObjectId>,
}

impl<'a> SceneCollider<'a> {
    pub fn new(grid: &'a TileGrid, world: WorldSwitch, objects: &'a Objects) -> Self {
        Self {
            grid,
            world,
            objects,
            ignore: None,
        }
    }

    pub fn ignoring(mut self, id: ObjectId) -> Self {
        self.ignore = Some(id);
        self
    }
}

impl Collider for SceneCollider<'_> {
    fn collides(&self, bounds: Bounds) -> bool {
        probe::is_colliding(self.grid, bounds, self.world)
            || self
                .objects
                .collides_with_solid(bounds, self.world, self.ignore)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chroma_grid::prelude::TileTable;

    use crate::object::{ColorBlock, Emitter, EmitterConfig, MovingPlatform, Pickup};
    use crate::player::Ability;

    fn block_kind() -> ObjectKind {
        ObjectKind::ColorBlock(ColorBlock::new(Vec2::ONE, Ability::Dash, Ability::Glider))
    }

    #[test]
    fn prototype_ids_are_returned_in_order() {
        let mut objects = Objects::new();
        assert_eq!(objects.add_prototype(block_kind()).unwrap(), PrototypeId(0));
        let pickup = ObjectKind::Pickup(Pickup::new(Vec2::splat(0.5)));
        assert_eq!(objects.add_prototype(pickup).unwrap(), PrototypeId(1));
        assert_eq!(objects.prototype_count(), 2);
    }

    #[test]
    fn spawning_unknown_prototype_registers_nothing() {
        let mut objects = Objects::new();
        let err = objects.spawn(PrototypeId(3), Vec2::ZERO).unwrap_err();
        assert!(matches!(err, EngineError::UnknownPrototype { registered: 0, .. }));
        assert!(objects.is_empty());
    }

    #[test]
    fn spawn_clones_prototype_at_position() {
        let mut objects = Objects::new();
        let proto = objects.add_prototype(block_kind()).unwrap();
        let id = objects.spawn(proto, Vec2::new(2.0, 3.0)).unwrap();
        let object = objects.get(id).unwrap();
        assert_eq!(object.position(), Vec2::new(2.0, 3.0));
        assert_eq!(object.prototype, Some(proto));
        assert_eq!(objects.prototype(proto).unwrap().position(), Vec2::ZERO);
    }

    #[test]
    fn destroyed_ids_go_stale() {
        let mut objects = Objects::new();
        let a = objects.add(GameObject::new(block_kind()));
        let b = objects.add(GameObject::new(block_kind()));
        objects.destroy(a).unwrap();
        assert!(objects.get(a).is_none());
        assert!(matches!(objects.destroy(a), Err(EngineError::StaleObject { .. })));

        let c = objects.add(GameObject::new(block_kind()));
        assert_eq!(c.index(), a.index());
        assert!(objects.get(a).is_none());
        let order: Vec<_> = objects.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![b, c]);
    }

    #[test]
    fn collider_can_ignore_one_object() {
        let grid = TileGrid::new(8, 8, Arc::new(TileTable::standard())).unwrap();
        let mut objects = Objects::new();
        let id = objects.add(GameObject::new(block_kind()).at(Vec2::new(3.0, 3.0)));
        let probe = Bounds::new(Vec2::new(3.5, 3.5), Vec2::splat(0.5));
        let world = WorldSwitch::default();
        assert!(SceneCollider::new(&grid, world, &objects).collides(probe));
        assert!(!SceneCollider::new(&grid, world, &objects)
            .ignoring(id)
            .collides(probe));
    }

    #[test]
    fn clear_level_keeps_persistent_objects() {
        let mut objects = Objects::new();
        objects.add(GameObject::new(block_kind()));
        let keep = objects.add(GameObject::new(block_kind()).persistent());
        objects.clear_level();
        assert_eq!(objects.len(), 1);
        assert!(objects.contains(keep));
    }

    fn emitter() -> GameObject {
        GameObject::new(ObjectKind::Emitter(Emitter::new(EmitterConfig {
            seed: 11,
            ..EmitterConfig::default()
        })))
    }

    #[test]
    fn added_objects_run_their_hook_once_registered() {
        let mut objects = Objects::new();
        let platform = MovingPlatform::new(Vec2::ONE, Vec2::new(3.0, 0.0), 0.1);
        let p = objects.add(
            GameObject::new(ObjectKind::MovingPlatform(platform)).at(Vec2::new(2.0, 4.0)),
        );
        let e = objects.add(emitter());

        let Some(ObjectKind::MovingPlatform(platform)) = objects.get(p).map(|o| &o.kind) else {
            panic!("platform missing");
        };
        assert_eq!(platform.target(), Vec2::new(5.0, 4.0));
        let Some(ObjectKind::Emitter(emitter)) = objects.get(e).map(|o| &o.kind) else {
            panic!("emitter missing");
        };
        assert!(emitter.is_playing());
    }

    #[test]
    fn colliding_solids_lists_overlapping_solids_in_order() {
        let mut objects = Objects::new();
        let block = objects.add(GameObject::new(block_kind()));
        objects.add(GameObject::new(ObjectKind::Pickup(Pickup::new(Vec2::ONE))));
        let phased = MovingPlatform::new(Vec2::ONE, Vec2::ZERO, 0.0).with_phase(true);
        let platform = objects.add(GameObject::new(ObjectKind::MovingPlatform(phased)));
        objects.add(GameObject::new(block_kind()).at(Vec2::new(5.0, 5.0)));

        let area = Bounds::new(Vec2::splat(0.4), Vec2::splat(0.2));
        let normal = WorldSwitch::new(false);
        let inverted = WorldSwitch::new(true);
        assert_eq!(
            objects.colliding_solids(area, normal).collect::<Vec<_>>(),
            vec![block]
        );
        assert_eq!(
            objects.colliding_solids(area, inverted).collect::<Vec<_>>(),
            vec![block, platform]
        );
        assert!(!objects.collides_with_solid(area, normal, Some(block)));
        assert!(objects.collides_with_solid(area, inverted, Some(block)));
    }

    #[test]
    fn reset_restarts_emitters_but_not_removed_objects() {
        let grid = TileGrid::new(4, 4, Arc::new(TileTable::standard())).unwrap();
        let mut ctx = SimContext::new(grid);
        let mut objects = Objects::new();
        let e = objects.add(emitter());
        let pickup = objects.add(GameObject::new(ObjectKind::Pickup(Pickup::new(Vec2::ONE))));
        for _ in 0..5 {
            objects.tick_all(&mut ctx);
        }
        objects.destroy(pickup).unwrap();

        objects.reset();
        assert_eq!(objects.len(), 1);
        assert!(!objects.contains(pickup));

        let mut fresh = Objects::new();
        let f = fresh.add(emitter());
        assert_eq!(objects.get(e).map(|o| &o.kind), fresh.get(f).map(|o| &o.kind));
    }
}
