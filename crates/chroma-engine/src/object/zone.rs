//! Non-solid trigger zones.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ObjectState;
use crate::context::{PlayerEffect, SimContext};
use crate::entity::ObjectId;
use crate::event::GameEvent;

/// Marks the area in front of a level entrance in a hub level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTag {
    pub size: Vec2,
    pub level: u32,
}

impl LevelTag {
    pub fn new(size: Vec2, level: u32) -> Self {
        Self { size, level }
    }

    pub(crate) fn on_collision(&mut self, ctx: &mut SimContext) {
        ctx.push_effect(PlayerEffect::SelectLevel(self.level));
    }
}

/// A one-shot collectible that removes itself when touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub size: Vec2,
}

impl Pickup {
    pub fn new(size: Vec2) -> Self {
        Self { size }
    }
}

/// Touch handler for [`Pickup`]. Marking happens during the collision pass;
/// the registry removes the object only after the pass is over.
pub(crate) fn collect_pickup(state: &mut ObjectState, id: ObjectId, ctx: &mut SimContext) {
    if state.should_destroy {
        return;
    }
    state.should_destroy = true;
    debug!(pickup = %id, "pickup collected");
    ctx.emit(GameEvent::PickupCollected { object: id });
}
