//! Level data as loaded from disk.
//!
//! A [`LevelData`] is plain serde data: grid dimensions and tile ids, an
//! optional explicit spawn point, the prototype list and where to place
//! clones of them. [`LevelData::build`] validates all of it before
//! constructing anything, so a malformed level never produces a partially
//! populated registry.

use std::sync::Arc;

use chroma_grid::prelude::{TileGrid, TileId, TileTable};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::object::{ObjectKind, PrototypeId};
use crate::registry::Objects;
use crate::EngineError;

/// One prototype clone to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub prototype: PrototypeId,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` ids.
    pub tiles: Vec<TileId>,
    /// Overrides the spawn tile.
    #[serde(default)]
    pub spawn: Option<Vec2>,
    #[serde(default)]
    pub prototypes: Vec<ObjectKind>,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

impl LevelData {
    /// Parse a level from JSON.
    ///
    /// # Errors
    ///
    /// The `serde_json` error if the text is not a valid level.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Build the tile grid and a registry holding the prototypes and their
    /// placed clones.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Grid`] for bad dimensions or unknown tile ids.
    /// - [`EngineError::InvalidPrototype`] for a prototype that fails
    ///   validation.
    /// - [`EngineError::UnknownPrototype`] for a placement naming a
    ///   prototype that does not exist.
    /// - [`EngineError::InvalidConfig`] for a non-finite spawn or placement.
    pub fn build(&self, table: Arc<TileTable>) -> Result<(TileGrid, Objects), EngineError> {
        let grid = TileGrid::from_ids(self.width, self.height, self.tiles.clone(), table)?;

        if let Some(spawn) = self.spawn {
            if !spawn.is_finite() {
                return Err(EngineError::InvalidConfig {
                    field: "spawn",
                    reason: format!("spawn {spawn} is not finite"),
                });
            }
        }
        for (index, kind) in self.prototypes.iter().enumerate() {
            kind.validate().map_err(|reason| EngineError::InvalidPrototype {
                prototype: PrototypeId(index as u32),
                reason,
            })?;
        }
        for placement in &self.placements {
            if placement.prototype.0 as usize >= self.prototypes.len() {
                return Err(EngineError::UnknownPrototype {
                    prototype: placement.prototype,
                    registered: self.prototypes.len(),
                });
            }
            if !placement.position.is_finite() {
                return Err(EngineError::InvalidConfig {
                    field: "placements",
                    reason: format!(
                        "placement of {} at {} is not finite",
                        placement.prototype, placement.position
                    ),
                });
            }
        }

        let mut objects = Objects::new();
        for kind in &self.prototypes {
            objects.add_prototype(kind.clone())?;
        }
        for placement in &self.placements {
            objects.spawn(placement.prototype, placement.position)?;
        }
        info!(
            width = self.width,
            height = self.height,
            prototypes = self.prototypes.len(),
            objects = objects.len(),
            "level built"
        );
        Ok((grid, objects))
    }
}
