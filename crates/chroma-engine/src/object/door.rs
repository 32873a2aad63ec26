//! Key objects and the doors they open.
//!
//! Keys and doors are matched by a small `kind` number. Touching a key marks
//! it collected; on the following ticks it flies to the first door of the
//! same kind and, on arrival, adds itself to that door. A door fades out once
//! every key of its kind has arrived and stops being solid when fully faded.

use chroma_grid::prelude::Bounds;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ObjectCommand, ObjectState, TickScope};
use crate::context::SimContext;
use crate::entity::ObjectId;
use crate::event::{GameEvent, Site};

const FADE_PER_TICK: u8 = 3;
const KEY_FADE_PER_TICK: u8 = 5;

// ---------------------------------------------------------------------------
// Door
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub size: Vec2,
    pub kind: u8,
    #[serde(default)]
    keys: u32,
    #[serde(default)]
    max_keys: u32,
    #[serde(default = "opaque")]
    alpha: u8,
}

fn opaque() -> u8 {
    u8::MAX
}

impl Door {
    pub fn new(size: Vec2, kind: u8) -> Self {
        Self {
            size,
            kind,
            keys: 0,
            max_keys: 0,
            alpha: u8::MAX,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.alpha > 0
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Delivered keys and the number of keys of this kind in the registry.
    pub fn progress(&self) -> (u32, u32) {
        (self.keys, self.max_keys)
    }

    /// A key arrived; `total` is the current number of keys of this kind.
    pub fn add_key(&mut self, total: u32) {
        self.keys += 1;
        self.max_keys = total;
    }

    pub(crate) fn tick(&mut self, scope: &mut TickScope<'_>) {
        let complete = self.max_keys != 0 && self.keys == self.max_keys;
        if !complete || self.alpha == 0 {
            return;
        }
        self.alpha = self.alpha.saturating_sub(FADE_PER_TICK);
        if self.alpha == 0 {
            debug!(door = %scope.id, kind = self.kind, "door opened");
            scope.ctx.emit(GameEvent::DoorOpened { door: scope.id });
        }
    }

    pub(crate) fn reset(&mut self) {
        self.keys = 0;
        self.max_keys = 0;
        self.alpha = u8::MAX;
    }
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub kind: u8,
    #[serde(default)]
    collected: bool,
    #[serde(default)]
    added: bool,
    #[serde(default = "opaque")]
    alpha: u8,
    /// Where the key is drawn; travels to the door while the object itself
    /// stays put.
    #[serde(default)]
    carried: Vec2,
    #[serde(default)]
    goal: Option<Vec2>,
}

impl Key {
    pub const SIZE: Vec2 = Vec2::ONE;
    /// Distance flown per tick.
    pub const SPEED: f32 = 0.25;

    pub fn new(kind: u8) -> Self {
        Self {
            kind,
            collected: false,
            added: false,
            alpha: u8::MAX,
            carried: Vec2::ZERO,
            goal: None,
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Whether the key reached its door.
    pub fn is_delivered(&self) -> bool {
        self.added
    }

    pub fn carried_position(&self) -> Vec2 {
        self.carried
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub(crate) fn collides_with(&self, state: &ObjectState, bounds: Bounds) -> bool {
        !self.collected && Bounds::new(state.position, Self::SIZE).overlaps(&bounds)
    }

    pub(crate) fn on_collision(&mut self, id: ObjectId, ctx: &mut SimContext) {
        if self.collected {
            return;
        }
        self.collected = true;
        debug!(key = %id, kind = self.kind, "key collected");
        ctx.emit(GameEvent::KeyCollected {
            site: Site::Object(id),
        });
    }

    pub(crate) fn tick(&mut self, state: &ObjectState, scope: &mut TickScope<'_>) {
        if !self.collected {
            self.carried = state.position;
            return;
        }
        if self.added {
            self.alpha = self.alpha.saturating_sub(KEY_FADE_PER_TICK);
            return;
        }

        let kind = self.kind;
        let goal = *self.goal.get_or_insert_with(|| {
            scope
                .others
                .find_door(kind)
                .map(|(_, door)| door.bounds().center() - Vec2::splat(0.5))
                .unwrap_or(state.position)
        });
        let diff = goal - self.carried;
        let length = diff.length();
        if length > Self::SPEED {
            self.carried += diff / length * Self::SPEED;
        } else {
            self.carried = goal;
            self.added = true;
            scope.commands.push(ObjectCommand::AddKey { kind });
        }
    }

    pub(crate) fn post_spawn(&mut self, state: &ObjectState) {
        self.carried = state.position;
    }

    pub(crate) fn reset(&mut self, state: &ObjectState) {
        self.collected = false;
        self.added = false;
        self.alpha = u8::MAX;
        self.carried = state.position;
        self.goal = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_counts_keys_and_resets() {
        let mut door = Door::new(Vec2::ONE, 1);
        door.add_key(2);
        assert_eq!(door.progress(), (1, 2));
        door.reset();
        assert_eq!(door.progress(), (0, 0));
        assert!(door.is_solid());
    }

    #[test]
    fn collected_key_stops_colliding() {
        let state = ObjectState::at(Vec2::new(2.0, 2.0));
        let mut key = Key::new(0);
        let player = Bounds::new(Vec2::new(2.5, 2.5), Vec2::splat(0.8));
        assert!(key.collides_with(&state, player));
        key.collected = true;
        assert!(!key.collides_with(&state, player));
        key.reset(&state);
        assert!(key.collides_with(&state, player));
    }
}
