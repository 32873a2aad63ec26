//! The world-switch state: which of the two color worlds is active.

use serde::{Deserialize, Serialize};

/// The single "inverted" flag of a running level.
///
/// Tile colors, switch tiles and world-phased objects read it every tick. It
/// is only written by explicit gameplay events (the player's switch input or a
/// level reset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSwitch {
    inverted: bool,
}

impl WorldSwitch {
    pub fn new(inverted: bool) -> Self {
        Self { inverted }
    }

    #[inline]
    pub fn is_inverted(self) -> bool {
        self.inverted
    }

    /// Flip the world and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.inverted = !self.inverted;
        self.inverted
    }

    pub fn set(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    /// `0` for the normal world, `1` for the inverted one. Indexes
    /// per-world pairs such as the player's abilities.
    #[inline]
    pub fn index(self) -> usize {
        self.inverted as usize
    }
}
