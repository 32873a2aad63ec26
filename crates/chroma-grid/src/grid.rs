//! The tile grid of a level.
//!
//! A [`TileGrid`] is a fixed-size row-major array of [`TileId`]s backed by a
//! shared [`TileTable`]. Besides plain lookups it tracks two pieces of derived
//! state: the number of uncollected key tiles (doors stay solid while it is
//! non-zero) and a dirty flag that tells a renderer to rebuild its tile cache.

use std::sync::Arc;

use glam::Vec2;
use tracing::{debug, warn};

use crate::color::Color;
use crate::geometry::{Bounds, Face};
use crate::tile::{SpikeFacing, TileDef, TileEffect, TileId, TileKind, TileTable};
use crate::world::WorldSwitch;
use crate::GridError;

/// Gap left between a spawned body and the floor below the spawn tile.
pub const SPAWN_CLEARANCE: f32 = 0.01;

/// A width x height array of tile ids.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<TileId>,
    table: Arc<TileTable>,
    /// Number of cells holding a [`TileKind::Key`] tile.
    keys: usize,
    dirty: bool,
}

impl TileGrid {
    /// An all-air grid.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] if either dimension is zero.
    pub fn new(width: usize, height: usize, table: Arc<TileTable>) -> Result<Self, GridError> {
        Self::from_ids(width, height, vec![TileId::AIR; width * height], table)
    }

    /// Bulk construction from row-major ids, as produced by a level loader.
    ///
    /// # Errors
    ///
    /// Fails without building anything if the dimensions are zero, the id
    /// count does not match, or any id is not registered in `table`.
    pub fn from_ids(
        width: usize,
        height: usize,
        tiles: Vec<TileId>,
        table: Arc<TileTable>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        let expected = width.checked_mul(height).ok_or(GridError::SizeMismatch {
            width,
            height,
            expected: usize::MAX,
            actual: tiles.len(),
        })?;
        if tiles.len() != expected {
            return Err(GridError::SizeMismatch {
                width,
                height,
                expected,
                actual: tiles.len(),
            });
        }
        if let Some(bad) = tiles.iter().find(|id| !table.contains(**id)) {
            return Err(GridError::UnknownTile {
                id: bad.0,
                registered: table.len(),
            });
        }

        let keys = tiles
            .iter()
            .filter(|id| table.get(**id).kind == TileKind::Key)
            .count();

        Ok(Self {
            width,
            height,
            tiles,
            table,
            keys,
            dirty: true,
        })
    }

    // -- dimensions ---------------------------------------------------------

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn table(&self) -> &Arc<TileTable> {
        &self.table
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    // -- lookups ------------------------------------------------------------

    pub fn tile_id(&self, x: i32, y: i32) -> Option<TileId> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    /// The tile definition at `(x, y)`, or `None` outside the grid.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&TileDef> {
        self.tile_id(x, y).map(|id| self.table.get(id))
    }

    /// Effective solidity of a cell. Cells outside the grid are solid.
    pub fn is_solid(&self, x: i32, y: i32, world: WorldSwitch) -> bool {
        match self.tile_at(x, y) {
            None => true,
            Some(def) => self.def_is_solid(def, world),
        }
    }

    fn def_is_solid(&self, def: &TileDef, world: WorldSwitch) -> bool {
        match def.kind {
            TileKind::Door => def.solid && self.keys != 0,
            TileKind::Switch { seen } => def.solid && seen == world.is_inverted(),
            _ => def.solid,
        }
    }

    /// Solid and usable for wall jumps. Cells outside the grid count as walls.
    pub fn is_wall(&self, x: i32, y: i32, world: WorldSwitch) -> bool {
        match self.tile_at(x, y) {
            None => true,
            Some(def) => def.is_wall() && self.def_is_solid(def, world),
        }
    }

    /// Display color of a cell, inverted while the world is inverted.
    pub fn color_at(&self, x: i32, y: i32, world: WorldSwitch) -> Option<Color> {
        self.tile_at(x, y).map(|def| {
            if world.is_inverted() {
                def.color.invert()
            } else {
                def.color
            }
        })
    }

    /// Sides of the cell whose neighbor is not solid. Neighbors outside the
    /// grid are solid, so border cells never expose their outer side.
    ///
    /// Recomputed on every call so runtime edits to the neighborhood are
    /// reflected immediately.
    pub fn exposed_faces(&self, x: i32, y: i32, world: WorldSwitch) -> [bool; 4] {
        let mut exposed = [false; 4];
        for face in Face::ALL {
            let (dx, dy) = face.offset();
            exposed[face.index()] = !self.is_solid(x + dx, y + dy, world);
        }
        exposed
    }

    /// Whether a spike at `(x, y)` kills a body touching it on `player_face`.
    pub fn is_lethal(&self, x: i32, y: i32, player_face: Face, world: WorldSwitch) -> bool {
        let Some(TileDef {
            kind: TileKind::Spike(facing),
            ..
        }) = self.tile_at(x, y)
        else {
            return false;
        };
        // The spike side being hit is the one facing the player.
        let side = player_face.opposite();
        match facing {
            SpikeFacing::Fixed(points) => *points == side,
            SpikeFacing::Omni => true,
            SpikeFacing::Auto => self.exposed_faces(x, y, world)[side.index()],
        }
    }

    /// Top-left cell of the first spawn tile in row-major order.
    pub fn spawn_cell(&self) -> Option<(i32, i32)> {
        self.tiles
            .iter()
            .position(|id| self.table.get(*id).kind == TileKind::Spawn)
            .map(|i| ((i % self.width) as i32, (i / self.width) as i32))
    }

    /// Position at which a body of `size` stands on the spawn tile: centered
    /// horizontally, bottom edge just above the cell below so the body does
    /// not start inside the floor.
    pub fn spawn_point(&self, size: Vec2) -> Option<Vec2> {
        self.spawn_cell().map(|(x, y)| {
            Vec2::new(
                x as f32 + (1.0 - size.x) * 0.5,
                y as f32 + 1.0 - size.y - SPAWN_CLEARANCE,
            )
        })
    }

    /// Number of uncollected key tiles.
    pub fn key_count(&self) -> usize {
        self.keys
    }

    /// Iterate all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, TileId)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, id)| ((i % width) as i32, (i / width) as i32, *id))
    }

    pub fn ids(&self) -> &[TileId] {
        &self.tiles
    }

    // -- mutation -----------------------------------------------------------

    /// Replace the tile at `(x, y)` and mark the grid dirty.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] or [`GridError::UnknownTile`]; the grid is
    /// left untouched on error.
    pub fn set_tile(&mut self, x: i32, y: i32, id: TileId) -> Result<(), GridError> {
        let index = self.index(x, y).ok_or(GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        if !self.table.contains(id) {
            return Err(GridError::UnknownTile {
                id: id.0,
                registered: self.table.len(),
            });
        }

        let was_key = self.table.get(self.tiles[index]).kind == TileKind::Key;
        let is_key = self.table.get(id).kind == TileKind::Key;
        match (was_key, is_key) {
            (true, false) => self.keys -= 1,
            (false, true) => self.keys += 1,
            _ => {}
        }

        self.tiles[index] = id;
        self.dirty = true;
        Ok(())
    }

    /// Turn collected keys back into keys for a level restart.
    pub fn reset(&mut self) {
        let (Some(key), Some(collected)) = (self.table.key_tile(), self.table.collected_key_tile())
        else {
            return;
        };
        let mut restored = 0usize;
        for id in self.tiles.iter_mut().filter(|id| **id == collected) {
            *id = key;
            restored += 1;
        }
        if restored > 0 {
            self.keys += restored;
            self.dirty = true;
            debug!(restored, "grid reset restored keys");
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the render cache as stale (the world was switched, for example).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // -- tile reactions -----------------------------------------------------

    /// Probe a face box against the grid and run face reactions.
    ///
    /// Returns `true` if the box is blocked: it leaves the grid or overlaps a
    /// solid cell. Leaving the grid short-circuits before any tile reacts.
    /// Every solid cell covered gets its face reaction (spikes push a
    /// [`TileEffect::Kill`]).
    pub fn face_collision(
        &self,
        bounds: Bounds,
        face: Face,
        world: WorldSwitch,
        effects: &mut Vec<TileEffect>,
    ) -> bool {
        let cells = bounds.cells();
        if !cells.within(self.width, self.height) {
            return true;
        }
        let mut blocked = false;
        for (x, y) in cells.iter() {
            if !self.is_solid(x, y, world) {
                continue;
            }
            blocked = true;
            if self.is_lethal(x, y, face, world) {
                effects.push(TileEffect::Kill { x, y, face });
            }
        }
        blocked
    }

    /// Run touch reactions for every in-grid cell the box covers.
    ///
    /// Keys are swapped for the collected key tile; goals report completion.
    pub fn touch(&mut self, bounds: Bounds, effects: &mut Vec<TileEffect>) {
        let Some(cells) = bounds.cells().clamped(self.width, self.height) else {
            return;
        };
        for (x, y) in cells.iter() {
            let Some(kind) = self.tile_at(x, y).map(|def| def.kind) else {
                continue;
            };
            match kind {
                TileKind::Key => {
                    let Some(collected) = self.table.collected_key_tile() else {
                        warn!(x, y, "key touched but no collected key tile is registered");
                        continue;
                    };
                    if self.set_tile(x, y, collected).is_ok() {
                        effects.push(TileEffect::KeyCollected { x, y });
                    }
                }
                TileKind::Goal(face) => effects.push(TileEffect::GoalReached { x, y, face }),
                _ => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
