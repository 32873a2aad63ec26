//! Tile definitions and the registered tile table.
//!
//! Tiles are interned: a level stores only [`TileId`]s and resolves them
//! through a shared [`TileTable`]. Behavior is a closed set of variants
//! ([`TileKind`]) dispatched with `match`, so adding a tile kind means
//! touching every reaction in one place.
//!
//! Id 0 is always "air". Ids are handed out by [`TileTable::register`] in
//! registration order and names are unique within a table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::Face;
use crate::GridError;

/// Maximum number of tiles a table can hold (ids are one byte).
pub const MAX_TILES: usize = 256;

// ---------------------------------------------------------------------------
// TileId
// ---------------------------------------------------------------------------

/// Index of a registered tile.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u8);

impl TileId {
    pub const AIR: TileId = TileId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileId({})", self.0)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TileKind
// ---------------------------------------------------------------------------

/// Which faces of a spike tile are lethal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpikeFacing {
    /// Spikes point out of one side of the tile.
    Fixed(Face),
    /// Every side is lethal.
    Omni,
    /// Sides without a solid neighbor are lethal, evaluated at collision time.
    Auto,
}

/// Behavior variant of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Air,
    Wall,
    Spike(SpikeFacing),
    /// Collectible; touching it swaps the cell to the collected key tile.
    Key,
    CollectedKey,
    /// Solid while the grid still holds uncollected keys.
    Door,
    /// Level exit, opening towards the given face.
    Goal(Face),
    Spawn,
    /// Solid only while `seen` matches the world's inverted flag.
    Switch { seen: bool },
}

/// Coarse shape a renderer should draw for a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileShape {
    Empty,
    Block,
    Spikes(SpikeFacing),
    Diamond,
    Arrow(Face),
    Marker,
}

impl TileKind {
    pub fn shape(self) -> TileShape {
        match self {
            TileKind::Air | TileKind::CollectedKey => TileShape::Empty,
            TileKind::Wall | TileKind::Door | TileKind::Switch { .. } => TileShape::Block,
            TileKind::Spike(facing) => TileShape::Spikes(facing),
            TileKind::Key => TileShape::Diamond,
            TileKind::Goal(face) => TileShape::Arrow(face),
            TileKind::Spawn => TileShape::Marker,
        }
    }
}

// ---------------------------------------------------------------------------
// TileDef
// ---------------------------------------------------------------------------

/// A registered tile type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDef {
    /// Unique name within the table.
    pub name: String,
    /// Color in the normal world; inverted while the world is inverted.
    pub color: Color,
    /// Base solidity. Doors and switch tiles refine it at query time.
    pub solid: bool,
    pub kind: TileKind,
    /// Editor palette group.
    pub group: String,
}

impl TileDef {
    pub fn new(name: impl Into<String>, color: Color, solid: bool, kind: TileKind) -> Self {
        Self {
            name: name.into(),
            color,
            solid,
            kind,
            group: "default".to_owned(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Whether a wall jump can push off this tile. Spikes and goals are solid
    /// but never count as walls.
    pub fn is_wall(&self) -> bool {
        self.solid && !matches!(self.kind, TileKind::Spike(_) | TileKind::Goal(_))
    }

    fn air() -> Self {
        Self::new("air", Color::WHITE, false, TileKind::Air)
    }

    fn fallback() -> Self {
        Self::new("fallback", Color::FALLBACK, false, TileKind::Air)
    }
}

// ---------------------------------------------------------------------------
// TileEffect
// ---------------------------------------------------------------------------

/// Gameplay consequence of a tile reaction, handed back to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TileEffect {
    /// A spike at `(x, y)` was hit on the player's `face`.
    Kill { x: i32, y: i32, face: Face },
    /// The key tile at `(x, y)` was collected.
    KeyCollected { x: i32, y: i32 },
    /// The goal tile at `(x, y)` was entered.
    GoalReached { x: i32, y: i32, face: Face },
}

// ---------------------------------------------------------------------------
// TileTable
// ---------------------------------------------------------------------------

/// The registered tile types of a game, shared read-only by grids.
#[derive(Debug, Clone)]
pub struct TileTable {
    defs: Vec<TileDef>,
    fallback: TileDef,
    key: Option<TileId>,
    collected_key: Option<TileId>,
}

impl TileTable {
    /// A table holding only air at id 0.
    pub fn new() -> Self {
        Self {
            defs: vec![TileDef::air()],
            fallback: TileDef::fallback(),
            key: None,
            collected_key: None,
        }
    }

    /// The built-in tile set; ids match the constants in [`standard`].
    pub fn standard() -> Self {
        let mut table = Self::new();
        for def in standard::definitions() {
            table.push(def);
        }
        table
    }

    /// Register a tile and return its id.
    ///
    /// # Errors
    ///
    /// [`GridError::DuplicateTile`] if the name is taken,
    /// [`GridError::TableFull`] once all byte ids are used.
    pub fn register(&mut self, def: TileDef) -> Result<TileId, GridError> {
        if let Some(existing) = self.id_of(&def.name) {
            return Err(GridError::DuplicateTile {
                name: def.name,
                existing: existing.0,
            });
        }
        if self.defs.len() >= MAX_TILES {
            return Err(GridError::TableFull {
                capacity: MAX_TILES,
            });
        }
        Ok(self.push(def))
    }

    fn push(&mut self, def: TileDef) -> TileId {
        let id = TileId(self.defs.len() as u8);
        match def.kind {
            TileKind::Key if self.key.is_none() => self.key = Some(id),
            TileKind::CollectedKey if self.collected_key.is_none() => {
                self.collected_key = Some(id)
            }
            _ => {}
        }
        self.defs.push(def);
        id
    }

    /// Resolve an id, falling back to the orange non-solid fallback tile for
    /// ids that were never registered.
    pub fn get(&self, id: TileId) -> &TileDef {
        self.defs.get(id.index()).unwrap_or(&self.fallback)
    }

    pub fn lookup(&self, id: TileId) -> Option<&TileDef> {
        self.defs.get(id.index())
    }

    pub fn contains(&self, id: TileId) -> bool {
        id.index() < self.defs.len()
    }

    pub fn id_of(&self, name: &str) -> Option<TileId> {
        self.defs
            .iter()
            .position(|d| d.name == name)
            .map(|i| TileId(i as u8))
    }

    /// First registered [`TileKind::Key`] tile.
    pub fn key_tile(&self) -> Option<TileId> {
        self.key
    }

    /// First registered [`TileKind::CollectedKey`] tile.
    pub fn collected_key_tile(&self) -> Option<TileId> {
        self.collected_key
    }

    pub fn fallback(&self) -> &TileDef {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, &TileDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, d)| (TileId(i as u8), d))
    }
}

impl Default for TileTable {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Standard tile set
// ---------------------------------------------------------------------------

/// Ids of the built-in tile set registered by [`TileTable::standard`].
pub mod standard {
    use super::{SpikeFacing, TileDef, TileId, TileKind};
    use crate::color::Color;
    use crate::geometry::Face;

    pub const AIR: TileId = TileId(0);
    pub const WALL: TileId = TileId(1);
    pub const SPIKES_LEFT: TileId = TileId(2);
    pub const SPIKES_RIGHT: TileId = TileId(3);
    pub const SPIKES_UP: TileId = TileId(4);
    pub const SPIKES_DOWN: TileId = TileId(5);
    pub const SPAWN: TileId = TileId(6);
    pub const GOAL_LEFT: TileId = TileId(7);
    pub const GOAL_RIGHT: TileId = TileId(8);
    pub const GOAL_UP: TileId = TileId(9);
    pub const GOAL_DOWN: TileId = TileId(10);
    pub const KEY: TileId = TileId(11);
    pub const COLLECTED_KEY: TileId = TileId(12);
    pub const DOOR: TileId = TileId(13);
    pub const SPIKES_OMNI: TileId = TileId(14);
    pub const SPIKES_AUTO: TileId = TileId(15);
    pub const DARK_BLOCK: TileId = TileId(16);
    pub const LIGHT_BLOCK: TileId = TileId(17);

    /// Definitions for ids 1.. in id order (air is implicit).
    pub(super) fn definitions() -> Vec<TileDef> {
        let spikes = |name: &str, facing| {
            TileDef::new(name, Color::BLACK, true, TileKind::Spike(facing)).with_group("spikes")
        };
        let goal = |name: &str, face| {
            TileDef::new(name, Color::BLACK, false, TileKind::Goal(face)).with_group("goal")
        };
        vec![
            TileDef::new("wall", Color::BLACK, true, TileKind::Wall),
            spikes("spikes_left", SpikeFacing::Fixed(Face::Left)),
            spikes("spikes_right", SpikeFacing::Fixed(Face::Right)),
            spikes("spikes_up", SpikeFacing::Fixed(Face::Up)),
            spikes("spikes_down", SpikeFacing::Fixed(Face::Down)),
            TileDef::new("spawn", Color::MAGENTA, false, TileKind::Spawn),
            goal("goal_left", Face::Left),
            goal("goal_right", Face::Right),
            goal("goal_up", Face::Up),
            goal("goal_down", Face::Down),
            TileDef::new("key", Color::GRAY, false, TileKind::Key).with_group("key"),
            TileDef::new(
                "collected_key",
                Color::LIGHT_GRAY.with_alpha(0x50),
                false,
                TileKind::CollectedKey,
            )
            .with_group("key"),
            TileDef::new("door", Color::GRAY, true, TileKind::Door).with_group("key"),
            spikes("spikes_omni", SpikeFacing::Omni),
            spikes("spikes_auto", SpikeFacing::Auto),
            TileDef::new(
                "dark_block",
                Color::DARK_GRAY,
                true,
                TileKind::Switch { seen: false },
            )
            .with_group("switch"),
            TileDef::new(
                "light_block",
                Color::LIGHT_GRAY,
                true,
                TileKind::Switch { seen: true },
            )
            .with_group("switch"),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
