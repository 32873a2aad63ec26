//! The explicit per-simulation context passed to every callback.
//!
//! [`SimContext`] replaces process-wide singletons: it owns the tile grid and
//! the world state, carries a read-only [`PlayerView`] for objects to inspect,
//! and collects the side effects objects want applied to the player. Effects
//! are queued and applied by the simulation after the callback returns, so no
//! object ever holds a mutable reference to the player.

use chroma_grid::prelude::{Bounds, TileEffect, TileGrid, WorldSwitch};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::ObjectId;
use crate::event::{GameEvent, KillCause, Site};
use crate::player::Ability;

// ---------------------------------------------------------------------------
// PlayerView / PlayerEffect
// ---------------------------------------------------------------------------

/// What objects may observe about the player during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub bounds: Bounds,
    pub velocity: Vec2,
    pub gliding: bool,
    pub alive: bool,
}

impl Default for PlayerView {
    fn default() -> Self {
        Self {
            bounds: Bounds::new(Vec2::ZERO, Vec2::ZERO),
            velocity: Vec2::ZERO,
            gliding: false,
            alive: true,
        }
    }
}

/// A change an object requests on the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerEffect {
    Kill(KillCause),
    AddForce(Vec2),
    /// Velocity inherited from a carrying object, blended in by drag.
    AddBaseVelocity(Vec2),
    SetAbilities { dark: Ability, light: Ability },
    /// Move the player out of the way of object `by`.
    Push { by: ObjectId, offset: Vec2 },
    SelectLevel(u32),
}

// ---------------------------------------------------------------------------
// WindAudio
// ---------------------------------------------------------------------------

/// Tracks the player's distance to every wind zone so only the nearest one
/// is heard.
///
/// Zones are kept in the order they first report, which is registration
/// order, so equal distances resolve to the earliest zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindAudio {
    /// `None` while the zone is out of earshot.
    zones: Vec<(ObjectId, Option<f32>)>,
}

impl WindAudio {
    /// Record the current distance of zone `id`. A non-finite distance
    /// means the player is out of earshot.
    pub fn report(&mut self, id: ObjectId, distance: f32) {
        let heard = distance.is_finite().then_some(distance);
        match self.zones.iter_mut().find(|(zone, _)| *zone == id) {
            Some(entry) => entry.1 = heard,
            None => self.zones.push((id, heard)),
        }
    }

    pub fn forget(&mut self, id: ObjectId) {
        self.zones.retain(|(zone, _)| *zone != id);
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    /// The audible zone and its distance, if any zone is in earshot.
    pub fn nearest(&self) -> Option<(ObjectId, f32)> {
        let mut best: Option<(ObjectId, f32)> = None;
        for &(id, heard) in &self.zones {
            let Some(distance) = heard else {
                continue;
            };
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }
        best
    }

    pub fn is_audible(&self, id: ObjectId) -> bool {
        self.nearest().is_some_and(|(zone, _)| zone == id)
    }
}

// ---------------------------------------------------------------------------
// SimContext
// ---------------------------------------------------------------------------

/// Everything a tick reads and writes besides the player and the registry.
#[derive(Debug, Clone)]
pub struct SimContext {
    pub grid: TileGrid,
    pub world: WorldSwitch,
    pub player: PlayerView,
    pub effects: Vec<PlayerEffect>,
    pub events: Vec<GameEvent>,
    /// Scratch buffer for grid reactions, drained by
    /// [`absorb_tile_effects`](Self::absorb_tile_effects).
    pub tile_effects: Vec<TileEffect>,
    pub wind: WindAudio,
}

impl SimContext {
    pub fn new(grid: TileGrid) -> Self {
        Self {
            grid,
            world: WorldSwitch::default(),
            player: PlayerView::default(),
            effects: Vec::new(),
            events: Vec::new(),
            tile_effects: Vec::new(),
            wind: WindAudio::default(),
        }
    }

    #[inline]
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn push_effect(&mut self, effect: PlayerEffect) {
        self.effects.push(effect);
    }

    /// Turn queued grid reactions into player effects and events.
    pub fn absorb_tile_effects(&mut self) {
        let mut key_collected = false;
        for effect in self.tile_effects.drain(..) {
            match effect {
                TileEffect::Kill { x, y, face } => {
                    trace!(x, y, %face, "spike contact");
                    let tile = self.grid.tile_id(x, y).unwrap_or_default();
                    self.effects
                        .push(PlayerEffect::Kill(KillCause::Spike { x, y, tile }));
                }
                TileEffect::KeyCollected { x, y } => {
                    key_collected = true;
                    self.events.push(GameEvent::KeyCollected {
                        site: Site::Cell { x, y },
                    });
                }
                TileEffect::GoalReached { x, y, face } => {
                    self.events.push(GameEvent::GoalReached { x, y, face });
                }
            }
        }
        if key_collected && self.grid.key_count() == 0 {
            self.events.push(GameEvent::AllKeysCollected);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_wind_prefers_earliest_on_ties() {
        let mut audio = WindAudio::default();
        let (a, b, c) = (ObjectId::new(0, 0), ObjectId::new(1, 0), ObjectId::new(2, 0));
        audio.report(a, f32::INFINITY);
        audio.report(b, 2.0);
        audio.report(c, 2.0);
        assert_eq!(audio.nearest(), Some((b, 2.0)));

        audio.report(c, 1.5);
        assert!(audio.is_audible(c));

        audio.forget(c);
        assert!(audio.is_audible(b));
        audio.report(b, f32::INFINITY);
        assert_eq!(audio.nearest(), None);
    }
}
