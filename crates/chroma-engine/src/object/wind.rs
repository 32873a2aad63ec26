//! Wind zones.
//!
//! A [`Wind`] zone pushes a gliding player with a constant force. Every tick
//! it also reports how far the player is from it to the context's
//! [`WindAudio`](crate::context::WindAudio), so only the nearest zone plays
//! its sound.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{ObjectState, TickScope};
use crate::context::{PlayerEffect, SimContext};

/// Beyond this distance a wind zone is not heard.
pub const EARSHOT: f32 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub size: Vec2,
    pub force: Vec2,
}

impl Wind {
    pub fn new(size: Vec2, force: Vec2) -> Self {
        Self { size, force }
    }

    /// Signed distance from the zone to `point` along one axis; zero while
    /// the point lies within the zone's extent on that axis.
    pub fn axis_distance(&self, state: &ObjectState, point: Vec2, axis: usize) -> f32 {
        let min = state.position[axis];
        let max = min + self.size[axis];
        if point[axis] < min {
            point[axis] - min
        } else if point[axis] > max {
            point[axis] - max
        } else {
            0.0
        }
    }

    /// The larger of the two axis distances, keeping its sign.
    pub fn distance(&self, state: &ObjectState, point: Vec2) -> f32 {
        let dx = self.axis_distance(state, point, 0);
        let dy = self.axis_distance(state, point, 1);
        if dx.abs() > dy.abs() {
            dx
        } else {
            dy
        }
    }

    pub(crate) fn on_collision(&mut self, ctx: &mut SimContext) {
        if ctx.player.gliding {
            ctx.push_effect(PlayerEffect::AddForce(self.force));
        }
    }

    pub(crate) fn tick(&mut self, state: &ObjectState, scope: &mut TickScope<'_>) {
        let distance = self
            .distance(state, scope.ctx.player.bounds.position)
            .abs();
        let heard = if distance < EARSHOT {
            distance
        } else {
            f32::INFINITY
        };
        scope.ctx.wind.report(scope.id, heard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_uses_dominant_axis() {
        let wind = Wind::new(Vec2::new(2.0, 1.0), Vec2::X);
        let state = ObjectState::at(Vec2::new(4.0, 4.0));
        assert_eq!(wind.distance(&state, Vec2::new(5.0, 4.5)), 0.0);
        assert_eq!(wind.distance(&state, Vec2::new(1.0, 4.5)), -3.0);
        assert_eq!(wind.distance(&state, Vec2::new(7.0, 0.0)), -4.0);
        assert_eq!(wind.distance(&state, Vec2::new(6.5, 4.0)), 0.5);
    }
}
