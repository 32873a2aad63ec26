//! Chroma Engine -- deterministic platformer simulation on top of
//! [`chroma_grid`].
//!
//! The engine adds the dynamic half of a level to the static tile grid: a
//! sub-stepped movement integrator ([`body`]), the player controller
//! ([`player`]), an arena of game objects addressed by generational ids
//! ([`registry`], [`object`]) and a fixed-timestep driver ([`tick`]). All
//! shared state lives in an explicit
//! [`SimContext`](context::SimContext) handed to every callback.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use chroma_engine::prelude::*;
//!
//! let (w, a, s) = (standard::WALL, standard::AIR, standard::SPAWN);
//! let level = LevelData {
//!     width: 5,
//!     height: 4,
//!     tiles: vec![
//!         w, w, w, w, w,
//!         w, a, a, a, w,
//!         w, s, a, a, w,
//!         w, w, w, w, w,
//!     ],
//!     spawn: None,
//!     prototypes: Vec::new(),
//!     placements: Vec::new(),
//! };
//! let table = Arc::new(TileTable::standard());
//! let mut sim = Simulation::from_level(
//!     &level,
//!     table,
//!     PlayerConfig::default(),
//!     TickConfig::default(),
//! )
//! .unwrap();
//!
//! sim.run_ticks(30);
//! assert!(sim.player().contact(Face::Down));
//! ```

#![deny(unsafe_code)]

pub mod body;
pub mod context;
pub mod entity;
pub mod event;
pub mod level;
pub mod object;
pub mod player;
pub mod registry;
pub mod tick;

/// Re-export the grid crate for convenience.
pub use chroma_grid;

use chroma_grid::GridError;

use crate::entity::ObjectId;
use crate::object::PrototypeId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building or mutating a simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A spawn request named a prototype that was never registered.
    #[error("prototype {prototype} is not registered ({registered} prototypes)")]
    UnknownPrototype {
        prototype: PrototypeId,
        registered: usize,
    },

    /// A prototype payload failed validation.
    #[error("prototype {prototype} is invalid: {reason}")]
    InvalidPrototype {
        prototype: PrototypeId,
        reason: String,
    },

    #[error(transparent)]
    Grid(#[from] GridError),

    /// An object id whose object no longer exists.
    #[error("object {id} no longer exists")]
    StaleObject { id: ObjectId },

    /// A configuration value out of range.
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The level has neither a spawn tile nor an explicit spawn point.
    #[error("level has no spawn point")]
    MissingSpawn,
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use chroma_grid::prelude::*;

    pub use crate::body::{Body, Collider, GridCollider, MoveOutcome, MAX_SUBSTEPS, STEP};
    pub use crate::context::{PlayerEffect, PlayerView, SimContext, WindAudio};
    pub use crate::entity::{IdAllocator, ObjectId};
    pub use crate::event::{EventRecord, GameEvent, KillCause, Site};
    pub use crate::level::{LevelData, Placement};
    pub use crate::object::{
        ColorBlock, Door, Emitter, EmitterConfig, GameObject, Key, LevelTag, MovingPlatform,
        ObjectKind, Particle, Pickup, PrototypeId, Wind,
    };
    pub use crate::player::{Ability, Player, PlayerConfig};
    pub use crate::registry::{Objects, SceneCollider};
    pub use crate::tick::{
        Button, FixedStepClock, InputFrame, Simulation, TickConfig, TickDiagnostics,
    };
    pub use crate::EngineError;
}
