//! Sub-stepped box movement with per-face contact flags.
//!
//! A [`Body`] moves through the world in sub-steps of at most [`STEP`] per
//! axis, so it can never skip over a cell no matter how fast it travels. The
//! axes are advanced independently inside the same loop: a body sliding along
//! a wall keeps its velocity along the wall and only loses the blocked axis.
//!
//! What counts as "blocked" is decided by a [`Collider`], which lets the same
//! integrator serve the player (grid plus solid objects) and forced pushes
//! that must ignore the object doing the pushing.

use chroma_grid::prelude::{probe, Bounds, Face, TileGrid, WorldSwitch};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Largest distance moved per axis before probing again.
pub const STEP: f32 = 0.0025;

/// Upper bound on sub-steps in one [`Body::move_by`], about 655 units.
/// Past this point subtracting [`STEP`] no longer changes a large `f32`.
pub const MAX_SUBSTEPS: u32 = 1 << 18;

// ---------------------------------------------------------------------------
// Collider
// ---------------------------------------------------------------------------

/// Something a moving box can be blocked by.
pub trait Collider {
    fn collides(&self, bounds: Bounds) -> bool;
}

/// Blocking by the tile grid alone.
#[derive(Debug, Clone, Copy)]
pub struct GridCollider<'a> {
    pub grid: &'a TileGrid,
    pub world: WorldSwitch,
}

impl Collider for GridCollider<'_> {
    fn collides(&self, bounds: Bounds) -> bool {
        probe::is_colliding(self.grid, bounds, self.world)
    }
}

impl<F: Fn(Bounds) -> bool> Collider for F {
    fn collides(&self, bounds: Bounds) -> bool {
        self(bounds)
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Result of a [`Body::move_by`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub blocked_x: bool,
    pub blocked_y: bool,
    /// The vertical axis was blocked while moving down.
    pub grounded: bool,
}

/// A moving axis-aligned box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub last_position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    /// Forces gathered this tick, folded into velocity by [`accumulate`](Self::accumulate).
    pub acceleration: Vec2,
    contacts: [bool; 4],
    last_contacts: [bool; 4],
    grounded: bool,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        debug_assert!(
            size.x > 0.0 && size.y > 0.0,
            "body size must be positive, got {size}"
        );
        Self {
            position,
            last_position: position,
            size,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            contacts: [false; 4],
            last_contacts: [false; 4],
            grounded: false,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.size)
    }

    /// Place the body without any interpolation trail.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.last_position = position;
    }

    /// Start a tick: remember where the body was for interpolation.
    #[inline]
    pub fn begin_tick(&mut self) {
        self.last_position = self.position;
    }

    #[inline]
    pub fn add_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Fold the gathered forces into velocity.
    pub fn accumulate(&mut self) {
        self.velocity += self.acceleration;
        self.acceleration = Vec2::ZERO;
    }

    /// Integrate the current velocity through `collider`.
    pub fn step(&mut self, collider: &impl Collider) -> MoveOutcome {
        self.move_by(self.velocity, collider)
    }

    /// Move by `delta` in sub-steps, stopping each axis at the first
    /// blocked sub-step.
    ///
    /// A blocked axis keeps its last free position and loses both its
    /// remaining motion and its velocity. Non-finite input or a degenerate
    /// box leaves the body untouched. Travel stops after [`MAX_SUBSTEPS`].
    pub fn move_by(&mut self, delta: Vec2, collider: &impl Collider) -> MoveOutcome {
        debug_assert!(delta.is_finite(), "non-finite movement {delta}");
        debug_assert!(
            self.size.x > 0.0 && self.size.y > 0.0,
            "body size must be positive, got {}",
            self.size
        );
        let mut outcome = MoveOutcome::default();
        if !delta.is_finite() || !self.position.is_finite() || self.size.cmple(Vec2::ZERO).any()
        {
            return outcome;
        }

        let mut energy = delta;
        let mut substeps = 0u32;
        while energy != Vec2::ZERO {
            if substeps == MAX_SUBSTEPS {
                warn!(%delta, remaining = %energy, "movement cut short after max sub-steps");
                break;
            }
            substeps += 1;
            for axis in 0..2 {
                if energy[axis] == 0.0 {
                    continue;
                }
                let old = self.position[axis];
                let step = energy[axis].clamp(-STEP, STEP);
                self.position[axis] += step;
                // The last partial step consumes the remainder exactly.
                energy[axis] = if step == energy[axis] {
                    0.0
                } else {
                    energy[axis] - step
                };
                if collider.collides(self.bounds()) {
                    self.position[axis] = old;
                    energy[axis] = 0.0;
                    self.velocity[axis] = 0.0;
                    if axis == 0 {
                        outcome.blocked_x = true;
                    } else {
                        outcome.blocked_y = true;
                        outcome.grounded = step > 0.0;
                    }
                }
            }
        }
        self.grounded = outcome.grounded;
        outcome
    }

    /// Probe one sub-step past every face and store the contact flags.
    pub fn probe_faces(&mut self, collider: &impl Collider) -> [bool; 4] {
        let mut flags = [false; 4];
        for face in Face::ALL {
            let nudged = self.bounds().translated(face.direction() * STEP);
            flags[face.index()] = collider.collides(nudged);
        }
        self.set_contacts(flags);
        flags
    }

    /// Store externally computed contact flags, keeping the previous set.
    pub fn set_contacts(&mut self, flags: [bool; 4]) {
        self.last_contacts = self.contacts;
        self.contacts = flags;
    }

    #[inline]
    pub fn contact(&self, face: Face) -> bool {
        self.contacts[face.index()]
    }

    /// Contact flag from the tick before.
    #[inline]
    pub fn had_contact(&self, face: Face) -> bool {
        self.last_contacts[face.index()]
    }

    pub fn contacts(&self) -> [bool; 4] {
        self.contacts
    }

    pub fn clear_contacts(&mut self) {
        self.contacts = [false; 4];
        self.last_contacts = [false; 4];
    }

    /// Whether the last move ended by hitting something below.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Render position between the previous and current tick.
    pub fn interpolated(&self, lag: f32) -> Bounds {
        let lag = lag.clamp(0.0, 1.0);
        Bounds::new(
            self.last_position.lerp(self.position, lag),
            self.size,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Solid everywhere at x >= 2.
    fn wall_at_two(b: Bounds) -> bool {
        b.max().x >= 2.0
    }

    #[test]
    fn free_move_consumes_delta_exactly() {
        let mut body = Body::new(Vec2::new(0.0, 0.0), Vec2::new(0.5, 0.5));
        let outcome = body.move_by(Vec2::new(0.0137, -0.004), &|_: Bounds| false);
        assert_eq!(outcome, MoveOutcome::default());
        assert!((body.position.x - 0.0137).abs() < 1e-6);
        assert!((body.position.y + 0.004).abs() < 1e-6);
    }

    #[test]
    fn blocked_axis_loses_velocity_only() {
        let mut body = Body::new(Vec2::new(1.0, 0.0), Vec2::new(0.5, 0.5));
        body.velocity = Vec2::new(1.0, 0.3);
        let outcome = body.step(&wall_at_two);
        assert!(outcome.blocked_x);
        assert!(!outcome.blocked_y);
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.velocity.y, 0.3);
        assert!(body.bounds().max().x < 2.0);
        assert!(body.bounds().max().x > 2.0 - STEP - 1e-4);
        assert!((body.position.y - 0.3).abs() < 1e-4);
    }

    #[test]
    fn zero_velocity_does_not_probe() {
        let mut body = Body::new(Vec2::new(3.0, 0.0), Vec2::ONE);
        let outcome = body.move_by(Vec2::ZERO, &|_: Bounds| -> bool {
            panic!("probed without moving")
        });
        assert_eq!(outcome, MoveOutcome::default());
    }

    #[test]
    fn downward_block_grounds() {
        let mut body = Body::new(Vec2::ZERO, Vec2::ONE);
        let floor = |b: Bounds| b.max().y >= 3.0;
        assert!(body.move_by(Vec2::new(0.0, 5.0), &floor).grounded);
        assert!(body.is_grounded());
        assert!(!body.move_by(Vec2::new(0.0, -0.5), &floor).grounded);
        assert!(!body.is_grounded());
    }

    #[test]
    fn face_probe_reports_touching_sides() {
        let mut body = Body::new(Vec2::new(1.0, 0.0), Vec2::new(0.5, 0.5));
        body.move_by(Vec2::new(2.0, 0.0), &wall_at_two);
        let flags = body.probe_faces(&wall_at_two);
        assert_eq!(flags, [false, true, false, false]);
        assert!(body.contact(Face::Right));

        body.probe_faces(&|_: Bounds| false);
        assert!(body.had_contact(Face::Right));
        assert!(!body.contact(Face::Right));
    }

    #[test]
    fn interpolation_does_not_move_the_body() {
        let mut body = Body::new(Vec2::ZERO, Vec2::ONE);
        body.begin_tick();
        body.move_by(Vec2::new(0.1, 0.0), &|_: Bounds| false);
        let mid = body.interpolated(0.5);
        assert!((mid.position.x - 0.05).abs() < 1e-5);
        assert!((body.position.x - 0.1).abs() < 1e-5);
        assert_eq!(body.interpolated(3.0).position, body.position);
    }

    #[test]
    fn huge_move_through_open_space_terminates() {
        let mut body = Body::new(Vec2::ZERO, Vec2::ONE);
        let outcome = body.move_by(Vec2::new(1.0e6, 0.0), &|_: Bounds| false);
        assert_eq!(outcome, MoveOutcome::default());
        let reach = STEP * MAX_SUBSTEPS as f32;
        assert!(body.position.x > reach * 0.9, "{}", body.position.x);
        assert!(body.position.x < reach * 1.1, "{}", body.position.x);
        assert_eq!(body.position.y, 0.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-finite movement")]
    fn nan_movement_asserts_in_debug() {
        let mut body = Body::new(Vec2::ZERO, Vec2::ONE);
        body.move_by(Vec2::new(f32::NAN, 0.0), &|_: Bounds| false);
    }
}
