//! Game objects: the dynamic half of a level.
//!
//! Every object is a [`GameObject`], common placement state plus an
//! [`ObjectKind`] payload. Behavior is dispatched with `match` over the
//! closed set of kinds; a kind that does not care about a callback simply
//! falls through to the inert default (not solid, no reaction).
//!
//! Objects never touch the player directly. Reactions are queued on the
//! [`SimContext`] as [`PlayerEffect`](crate::context::PlayerEffect)s, and
//! requests that concern other objects are queued as [`ObjectCommand`]s for
//! the registry to apply once the current object is done.

pub mod block;
pub mod door;
pub mod emitter;
pub mod platform;
pub mod wind;
pub mod zone;

use std::fmt;

use chroma_grid::prelude::{Bounds, Face, WorldSwitch};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::context::SimContext;
use crate::entity::ObjectId;
use crate::registry::Objects;

pub use block::ColorBlock;
pub use door::{Door, Key};
pub use emitter::{Emitter, EmitterConfig, Particle};
pub use platform::MovingPlatform;
pub use wind::Wind;
pub use zone::{LevelTag, Pickup};

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Index of a registered prototype, returned by
/// [`Objects::add_prototype`](crate::registry::Objects::add_prototype).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrototypeId(pub u32);

impl fmt::Debug for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrototypeId({})", self.0)
    }
}

impl fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Placement state every object has regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub position: Vec2,
    pub last_position: Vec2,
    /// Set by the object itself; the registry removes it after the sweep.
    #[serde(default)]
    pub should_destroy: bool,
}

impl ObjectState {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            last_position: position,
            should_destroy: false,
        }
    }
}

/// A request from one object that affects others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectCommand {
    /// A key of `kind` arrived at its door.
    AddKey { kind: u8 },
    /// Carry particles inside `bounds` along by `velocity`.
    PushParticles { bounds: Bounds, velocity: Vec2 },
}

/// What an object's `tick` gets to see and touch.
pub struct TickScope<'a> {
    pub id: ObjectId,
    pub ctx: &'a mut SimContext,
    /// The registry with the ticking object taken out.
    pub others: &'a Objects,
    pub commands: &'a mut Vec<ObjectCommand>,
}

// ---------------------------------------------------------------------------
// ObjectKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectKind {
    ColorBlock(ColorBlock),
    Door(Door),
    Key(Key),
    MovingPlatform(MovingPlatform),
    Wind(Wind),
    Emitter(Emitter),
    LevelTag(LevelTag),
    Pickup(Pickup),
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::ColorBlock(_) => "color_block",
            ObjectKind::Door(_) => "door",
            ObjectKind::Key(_) => "key",
            ObjectKind::MovingPlatform(_) => "moving_platform",
            ObjectKind::Wind(_) => "wind",
            ObjectKind::Emitter(_) => "emitter",
            ObjectKind::LevelTag(_) => "level_tag",
            ObjectKind::Pickup(_) => "pickup",
        }
    }

    pub fn size(&self) -> Vec2 {
        match self {
            ObjectKind::ColorBlock(k) => k.size,
            ObjectKind::Door(k) => k.size,
            ObjectKind::Key(_) => Key::SIZE,
            ObjectKind::MovingPlatform(k) => k.size,
            ObjectKind::Wind(k) => k.size,
            ObjectKind::Emitter(_) => Vec2::ZERO,
            ObjectKind::LevelTag(k) => k.size,
            ObjectKind::Pickup(k) => k.size,
        }
    }

    /// Reject payloads that would make the object misbehave.
    pub fn validate(&self) -> Result<(), String> {
        let size = self.size();
        let needs_area = !matches!(self, ObjectKind::Emitter(_));
        if !size.is_finite() || (needs_area && (size.x <= 0.0 || size.y <= 0.0)) {
            return Err(format!("{} has invalid size {size}", self.name()));
        }
        match self {
            ObjectKind::MovingPlatform(k) => k.validate(),
            ObjectKind::Wind(k) if !k.force.is_finite() => {
                Err(format!("wind force {} is not finite", k.force))
            }
            ObjectKind::Emitter(k) => k.config.validate(),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// GameObject
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    pub state: ObjectState,
    /// The prototype this object was cloned from, if any.
    #[serde(default)]
    pub prototype: Option<PrototypeId>,
    /// Survives level changes (see [`Objects::clear_level`](crate::registry::Objects::clear_level)).
    #[serde(default)]
    pub persistent: bool,
    pub kind: ObjectKind,
}

impl GameObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            state: ObjectState::at(Vec2::ZERO),
            prototype: None,
            persistent: false,
            kind,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.state = ObjectState::at(position);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.kind.size()
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.state.position, self.size())
    }

    pub fn should_destroy(&self) -> bool {
        self.state.should_destroy
    }

    /// Render box between the previous and current tick.
    pub fn interpolated(&self, lag: f32) -> Bounds {
        let lag = lag.clamp(0.0, 1.0);
        Bounds::new(
            self.state.last_position.lerp(self.state.position, lag),
            self.size(),
        )
    }

    // -- capabilities -------------------------------------------------------

    pub fn is_solid(&self, world: WorldSwitch) -> bool {
        match &self.kind {
            ObjectKind::ColorBlock(_) => true,
            ObjectKind::Door(k) => k.is_solid(),
            ObjectKind::MovingPlatform(k) => k.is_solid(world),
            _ => false,
        }
    }

    pub fn collides_with(&self, bounds: Bounds) -> bool {
        match &self.kind {
            ObjectKind::Key(k) => k.collides_with(&self.state, bounds),
            ObjectKind::Emitter(_) => false,
            _ => self.bounds().overlaps(&bounds),
        }
    }

    /// The player's `face` probe overlaps this solid object.
    pub fn on_face_collision(&mut self, id: ObjectId, face: Face, ctx: &mut SimContext) {
        match &mut self.kind {
            ObjectKind::ColorBlock(k) => k.on_face_collision(ctx),
            ObjectKind::MovingPlatform(k) => k.on_face_collision(id, face, ctx),
            _ => {}
        }
    }

    /// The player's box overlaps this object.
    pub fn on_collision(&mut self, id: ObjectId, ctx: &mut SimContext) {
        match &mut self.kind {
            ObjectKind::Key(k) => k.on_collision(id, ctx),
            ObjectKind::Wind(k) => k.on_collision(ctx),
            ObjectKind::LevelTag(k) => k.on_collision(ctx),
            ObjectKind::Pickup(_) => zone::collect_pickup(&mut self.state, id, ctx),
            _ => {}
        }
    }

    pub fn tick(&mut self, scope: &mut TickScope<'_>) {
        self.state.last_position = self.state.position;
        match &mut self.kind {
            ObjectKind::Door(k) => k.tick(scope),
            ObjectKind::Key(k) => k.tick(&self.state, scope),
            ObjectKind::MovingPlatform(k) => k.tick(&mut self.state, scope),
            ObjectKind::Wind(k) => k.tick(&self.state, scope),
            ObjectKind::Emitter(k) => k.tick(&mut self.state),
            ObjectKind::ColorBlock(_) | ObjectKind::LevelTag(_) | ObjectKind::Pickup(_) => {}
        }
    }

    /// Runs once after the object is placed in the registry.
    pub fn post_spawn(&mut self) {
        match &mut self.kind {
            ObjectKind::Key(k) => k.post_spawn(&self.state),
            ObjectKind::MovingPlatform(k) => k.post_spawn(&self.state),
            ObjectKind::Emitter(k) => k.post_spawn(),
            _ => {}
        }
    }

    /// Restore the spawn-time state for a level restart.
    pub fn reset(&mut self) {
        match &mut self.kind {
            ObjectKind::Door(k) => k.reset(),
            ObjectKind::Key(k) => k.reset(&self.state),
            ObjectKind::MovingPlatform(k) => k.reset(&mut self.state),
            ObjectKind::Emitter(k) => k.reset(),
            _ => {}
        }
    }

    pub fn push_particles(&mut self, bounds: Bounds, velocity: Vec2) {
        if let ObjectKind::Emitter(k) = &mut self.kind {
            k.push(bounds, velocity);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Ability;

    fn block() -> GameObject {
        GameObject::new(ObjectKind::ColorBlock(ColorBlock::new(
            Vec2::ONE,
            Ability::WallJump,
            Ability::Dash,
        )))
    }

    #[test]
    fn clone_and_reset_keep_size_and_solidity() {
        let world = WorldSwitch::default();
        let kinds = [
            block(),
            GameObject::new(ObjectKind::Door(Door::new(Vec2::new(1.0, 2.0), 0))),
            GameObject::new(ObjectKind::MovingPlatform(MovingPlatform::new(
                Vec2::new(2.0, 1.0),
                Vec2::new(3.0, 3.0),
                0.025,
            ))),
            GameObject::new(ObjectKind::Wind(Wind::new(Vec2::ONE, Vec2::new(0.02, 0.0)))),
        ];
        for proto in kinds {
            let mut copy = proto.clone().at(Vec2::new(4.0, 4.0));
            copy.post_spawn();
            copy.reset();
            assert_eq!(copy.size(), proto.size(), "{}", proto.kind.name());
            assert_eq!(copy.is_solid(world), proto.is_solid(world));
        }
    }

    #[test]
    fn validation_rejects_degenerate_sizes() {
        let bad = ObjectKind::ColorBlock(ColorBlock::new(
            Vec2::new(0.0, 1.0),
            Ability::None,
            Ability::None,
        ));
        assert!(bad.validate().is_err());
        assert!(block().kind.validate().is_ok());
    }

    #[test]
    fn kind_tag_round_trips_through_json() {
        let json = serde_json::to_string(&block().kind).unwrap();
        assert!(json.contains("\"type\":\"ColorBlock\""));
        let back: ObjectKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block().kind);
    }
}
