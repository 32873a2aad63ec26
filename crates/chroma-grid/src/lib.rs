//! Chroma Grid -- tile table, tile grid and collision probing.
//!
//! This crate holds the static half of the platformer core: the registered
//! tile definitions, the row-major grid of tile ids that makes up a level, and
//! the box-versus-grid collision queries the movement integrator runs every
//! sub-step. Solidity of some tiles depends on the [`WorldSwitch`], so every
//! query takes the current world state explicitly.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use chroma_grid::prelude::*;
//!
//! let table = Arc::new(TileTable::standard());
//! let w = standard::WALL;
//! let a = standard::AIR;
//! let grid = TileGrid::from_ids(3, 3, vec![w, w, w, w, a, w, w, w, w], table).unwrap();
//!
//! let world = WorldSwitch::default();
//! let inside = Bounds::new(glam::Vec2::new(1.1, 1.1), glam::Vec2::new(0.8, 0.8));
//! assert!(!probe::is_colliding(&grid, inside, world));
//!
//! // Leaving the grid counts as hitting a wall.
//! let outside = inside.translated(glam::Vec2::new(-5.0, 0.0));
//! assert!(probe::is_colliding(&grid, outside, world));
//! ```

#![deny(unsafe_code)]

pub mod color;
pub mod geometry;
pub mod grid;
pub mod probe;
pub mod tile;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by tile table and grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A cell coordinate outside the grid was addressed directly.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// Bulk construction received the wrong number of tile ids.
    #[error("grid of {width}x{height} needs {expected} tile ids, got {actual}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// A tile id that is not registered in the table.
    #[error("tile id {id} is not registered (table holds {registered} tiles)")]
    UnknownTile { id: u8, registered: usize },

    /// A tile with the same name was already registered.
    #[error("tile '{name}' is already registered as id {existing}")]
    DuplicateTile { name: String, existing: u8 },

    /// The table has no ids left to hand out.
    #[error("tile table is full ({capacity} tiles)")]
    TableFull { capacity: usize },

    /// A grid with zero width or height.
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::geometry::{Bounds, CellRange, Face};
    pub use crate::grid::TileGrid;
    pub use crate::probe;
    pub use crate::tile::{
        standard, SpikeFacing, TileDef, TileEffect, TileId, TileKind, TileTable,
    };
    pub use crate::world::WorldSwitch;
    pub use crate::GridError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
