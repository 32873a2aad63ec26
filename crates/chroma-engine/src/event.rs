//! Gameplay events emitted during a tick.
//!
//! Events are collected in the [`SimContext`](crate::context::SimContext)
//! while a tick runs and stamped with the tick number when it completes, so a
//! frontend can react to them (sounds, UI) without being called back from
//! inside the simulation.

use chroma_grid::prelude::{Face, TileId};
use serde::{Deserialize, Serialize};

use crate::entity::ObjectId;
use crate::player::Ability;

/// Where something happened: on a grid cell or at a registered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Site {
    Cell { x: i32, y: i32 },
    Object(ObjectId),
}

/// What killed the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    /// A spike tile touched on its pointed side.
    Spike { x: i32, y: i32, tile: TileId },
    /// A spiky face of an object.
    Hazard(ObjectId),
    /// Pushed by a moving object into something it could not escape.
    Crushed(ObjectId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    KeyCollected { site: Site },
    /// The last key tile of the grid was collected; door tiles open.
    AllKeysCollected,
    /// A door object finished fading and stopped being solid.
    DoorOpened { door: ObjectId },
    PickupCollected { object: ObjectId },
    Killed { cause: KillCause },
    Respawned,
    GoalReached { x: i32, y: i32, face: Face },
    WorldSwitched { inverted: bool },
    /// A world switch was refused because the player would end up inside
    /// something solid.
    WorldSwitchBlocked,
    AbilitiesChanged { dark: Ability, light: Ability },
    LevelSelected { level: u32 },
}

/// An event with the tick it happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub tick: u64,
    pub event: GameEvent,
}
