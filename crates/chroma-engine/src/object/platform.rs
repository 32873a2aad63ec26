//! Moving platforms and hazards.
//!
//! A [`MovingPlatform`] shuttles between the position it was spawned at and
//! that position plus `travel`, at a fixed speed. It is solid, carries a
//! player standing on it (or hanging off its sides) through the base velocity
//! effect, kills through its spiky sides, and shoves the player out of its
//! path when it moves into them.
//!
//! With a `phase` set it exists in one world state only: it is solid and
//! moves while `phase == inverted`, and freezes in place otherwise.

use chroma_grid::prelude::{Bounds, Face, WorldSwitch};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{ObjectCommand, ObjectState, TickScope};
use crate::context::{PlayerEffect, SimContext};
use crate::entity::ObjectId;
use crate::event::KillCause;

/// Granularity of the push that moves the player out of the way.
pub const PUSH_STEP: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub size: Vec2,
    /// Offset from the spawn position to the far end of the path.
    pub travel: Vec2,
    /// Distance covered per tick.
    pub speed: f32,
    /// Which sides kill on contact, indexed by [`Face::index`].
    #[serde(default)]
    pub spiky: [bool; 4],
    /// World state the platform exists in, or `None` for both.
    #[serde(default)]
    pub phase: Option<bool>,
    #[serde(default)]
    start: Vec2,
    #[serde(default)]
    returning: bool,
    #[serde(default)]
    velocity: Vec2,
}

impl MovingPlatform {
    pub fn new(size: Vec2, travel: Vec2, speed: f32) -> Self {
        Self {
            size,
            travel,
            speed,
            spiky: [false; 4],
            phase: None,
            start: Vec2::ZERO,
            returning: false,
            velocity: Vec2::ZERO,
        }
    }

    pub fn with_spikes(mut self, faces: &[Face]) -> Self {
        for face in faces {
            self.spiky[face.index()] = true;
        }
        self
    }

    pub fn with_phase(mut self, seen: bool) -> Self {
        self.phase = Some(seen);
        self
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// The end of the path the platform is currently heading to.
    pub fn target(&self) -> Vec2 {
        if self.returning {
            self.start
        } else {
            self.start + self.travel
        }
    }

    pub fn is_solid(&self, world: WorldSwitch) -> bool {
        self.phase.map_or(true, |seen| seen == world.is_inverted())
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(format!("platform speed {} must be finite and >= 0", self.speed));
        }
        if !self.travel.is_finite() {
            return Err(format!("platform travel {} is not finite", self.travel));
        }
        Ok(())
    }

    pub(crate) fn post_spawn(&mut self, state: &ObjectState) {
        self.start = state.position;
    }

    pub(crate) fn reset(&mut self, state: &mut ObjectState) {
        *state = ObjectState::at(self.start);
        self.returning = false;
        self.velocity = Vec2::ZERO;
    }

    pub(crate) fn tick(&mut self, state: &mut ObjectState, scope: &mut TickScope<'_>) {
        if !self.is_solid(scope.ctx.world) {
            self.velocity = Vec2::ZERO;
            return;
        }

        let target = self.target();
        self.velocity = target - state.position;
        let length = self.velocity.length();
        if length < self.speed {
            state.position = target;
            self.returning = !self.returning;
        } else if length > 0.0 {
            self.velocity *= self.speed / length;
            state.position += self.velocity;
        }

        let bounds = Bounds::new(state.position, self.size);
        self.push_player(scope.id, bounds, scope.ctx);

        let grow = Vec2::new(0.0, 0.1);
        scope.commands.push(ObjectCommand::PushParticles {
            bounds: Bounds::new(state.position - grow, self.size + grow),
            velocity: self.velocity,
        });
    }

    /// Queue a push that moves the player out of `bounds`, stepping along
    /// the dominant axis of motion (vertical wins ties).
    fn push_player(&self, id: ObjectId, bounds: Bounds, ctx: &mut SimContext) {
        let player = ctx.player.bounds;
        if !ctx.player.alive || !bounds.overlaps(&player) {
            return;
        }
        let dir = if self.velocity.y != 0.0 {
            Vec2::new(0.0, self.velocity.y.signum())
        } else if self.velocity.x != 0.0 {
            Vec2::new(self.velocity.x.signum(), 0.0)
        } else {
            return;
        };

        let step = dir * PUSH_STEP;
        let reach = (bounds.size + player.size).max_element();
        let limit = (reach / PUSH_STEP).ceil() as u32 + 2;
        let mut steps = 1;
        while steps < limit && bounds.overlaps(&player.translated(step * steps as f32)) {
            steps += 1;
        }
        let offset = step * steps as f32;
        ctx.player.bounds = player.translated(offset);
        ctx.push_effect(PlayerEffect::Push { by: id, offset });
    }

    pub(crate) fn on_face_collision(&mut self, id: ObjectId, face: Face, ctx: &mut SimContext) {
        if face != Face::Up {
            ctx.push_effect(PlayerEffect::AddBaseVelocity(self.velocity));
        }
        if self.spiky[face.opposite().index()] {
            ctx.push_effect(PlayerEffect::Kill(KillCause::Hazard(id)));
        }
    }
}
