//! Ability blocks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::context::{PlayerEffect, SimContext};
use crate::player::Ability;

/// A solid block that hands the player one ability per world state when
/// bumped on any side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBlock {
    pub size: Vec2,
    /// `[dark, light]`, indexed by [`WorldSwitch::index`](chroma_grid::prelude::WorldSwitch::index).
    pub abilities: [Ability; 2],
}

impl ColorBlock {
    pub fn new(size: Vec2, dark: Ability, light: Ability) -> Self {
        Self {
            size,
            abilities: [dark, light],
        }
    }

    pub(crate) fn on_face_collision(&mut self, ctx: &mut SimContext) {
        ctx.push_effect(PlayerEffect::SetAbilities {
            dark: self.abilities[0],
            light: self.abilities[1],
        });
    }
}
