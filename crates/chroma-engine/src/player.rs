//! The player controller.
//!
//! The player is a [`Body`] driven by an [`InputFrame`] and a set of tuning
//! constants ([`PlayerConfig`]). Each tick gathers forces (input, gravity,
//! jump impulses and their decaying boost, wall jumps), applies drag or the
//! dash curve, moves through the grid and the solid objects, and then probes
//! its four faces against both. Face probes run the objects' face callbacks
//! and the grid's spike checks; a final overlap pass runs touch callbacks
//! (keys, goals, wind zones).
//!
//! The player carries one [`Ability`] per world state; the active one is the
//! ability of the current [`WorldSwitch`] state.

use std::f32::consts::FRAC_PI_2;

use chroma_grid::prelude::{probe, Bounds, Color, Face, WorldSwitch};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body::{Body, STEP};
use crate::context::{PlayerEffect, PlayerView, SimContext};
use crate::entity::ObjectId;
use crate::event::{GameEvent, KillCause};
use crate::registry::{Objects, SceneCollider};
use crate::tick::InputFrame;
use crate::EngineError;

// ---------------------------------------------------------------------------
// Ability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    #[default]
    None,
    DoubleJump,
    Glider,
    Dash,
    WallJump,
}

impl Ability {
    /// Tint used for the player and ability blocks.
    pub fn color(self) -> Color {
        match self {
            Ability::None => Color::GRAY,
            Ability::DoubleJump => Color::rgb(0x3C, 0xB3, 0x71),
            Ability::Glider => Color::rgb(0xF2, 0xC1, 0x4E),
            Ability::Dash => Color::rgb(0xE0, 0x4F, 0x5F),
            Ability::WallJump => Color::rgb(0x4F, 0x8F, 0xE0),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerConfig
// ---------------------------------------------------------------------------

/// Movement tuning. Durations are in ticks, distances in cells per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: Vec2,
    pub move_speed: f32,
    /// Horizontal input is raised to this power before scaling.
    pub joystick_exponent: f32,
    pub jump_init: f32,
    pub jump_boost: f32,
    pub max_jump_ticks: u32,
    pub wall_jump_init: Vec2,
    pub wall_jump_boost: f32,
    pub max_wall_jump_ticks: u32,
    /// Vertical drag multiplier while sliding down a wall.
    pub wall_jump_drag: f32,
    pub wall_jump_move_cooldown: u32,
    /// Ticks after a ground jump before a wall jump is allowed.
    pub wall_jump_cooldown: u32,
    pub gravity: f32,
    pub glider_gravity: f32,
    pub coyote_ticks: u32,
    pub drag: Vec2,
    pub max_jump_buffer_ticks: u32,
    pub wall_jump_buffer_ticks: u32,
    /// How long a wall contact stays usable after leaving the wall.
    pub wall_buffer_ticks: u32,
    pub max_dash_ticks: u32,
    pub max_dash_cooldown: u32,
    pub dash_strength: f32,
    pub max_jump_count: u32,
    /// Ticks between a kill and the respawn.
    pub respawn_ticks: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(0.8, 0.8),
            move_speed: 0.04,
            joystick_exponent: 5.0,
            jump_init: 0.3,
            jump_boost: 0.1,
            max_jump_ticks: 40,
            wall_jump_init: Vec2::new(0.5, 0.4),
            wall_jump_boost: 0.1,
            max_wall_jump_ticks: 40,
            wall_jump_drag: 0.3,
            wall_jump_move_cooldown: 15,
            wall_jump_cooldown: 10,
            gravity: 0.0275,
            glider_gravity: 0.005,
            coyote_ticks: 5,
            drag: Vec2::new(0.7, 0.9),
            max_jump_buffer_ticks: 6,
            wall_jump_buffer_ticks: 4,
            wall_buffer_ticks: 5,
            max_dash_ticks: 24,
            max_dash_cooldown: 24,
            dash_strength: 0.35,
            max_jump_count: 2,
            respawn_ticks: 30,
        }
    }
}

impl PlayerConfig {
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> EngineError {
            EngineError::InvalidConfig {
                field,
                reason: reason.into(),
            }
        }

        if !self.size.is_finite() || self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Err(invalid("size", format!("must be positive, got {}", self.size)));
        }
        if !self.drag.is_finite() || self.drag.cmplt(Vec2::ZERO).any() || self.drag.cmpgt(Vec2::ONE).any() {
            return Err(invalid("drag", format!("must lie in [0, 1], got {}", self.drag)));
        }
        if !self.wall_jump_init.is_finite() || self.wall_jump_init == Vec2::ZERO {
            return Err(invalid("wall_jump_init", "must be finite and non-zero"));
        }
        let scalars = [
            ("move_speed", self.move_speed),
            ("joystick_exponent", self.joystick_exponent),
            ("jump_init", self.jump_init),
            ("jump_boost", self.jump_boost),
            ("wall_jump_boost", self.wall_jump_boost),
            ("wall_jump_drag", self.wall_jump_drag),
            ("gravity", self.gravity),
            ("glider_gravity", self.glider_gravity),
            ("dash_strength", self.dash_strength),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }
        if self.max_dash_ticks == 0 {
            return Err(invalid("max_dash_ticks", "must be positive"));
        }
        if self.wall_jump_move_cooldown == 0 {
            return Err(invalid("wall_jump_move_cooldown", "must be positive"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Player state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct JumpState {
    /// Ticks a jump press stays queued.
    buffer: u32,
    /// Remaining ticks of held-jump boost.
    ticks: u32,
    count: u32,
    /// Ticks the player still counts as grounded after leaving the floor.
    coyote: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct WallState {
    left: bool,
    right: bool,
    left_buffer: u32,
    right_buffer: u32,
    left_jump_buffer: u32,
    right_jump_buffer: u32,
    left_move_cooldown: u32,
    right_move_cooldown: u32,
    jump_cooldown: u32,
    jump_ticks: u32,
    direction: Vec2,
    sticking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct DashState {
    ticks: u32,
    cooldown: u32,
    velocity: Vec2,
    direction: f32,
    usable: bool,
}

impl Default for DashState {
    fn default() -> Self {
        Self {
            ticks: 0,
            cooldown: 0,
            velocity: Vec2::ZERO,
            direction: 1.0,
            usable: false,
        }
    }
}

#[inline]
fn count_down(counter: &mut u32) {
    *counter = counter.saturating_sub(1);
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub config: PlayerConfig,
    pub body: Body,
    base_velocity: Vec2,
    last_base_velocity: Vec2,
    abilities: [Ability; 2],
    jump: JumpState,
    wall: WallState,
    dash: DashState,
    /// Remaining ticks until respawn; zero while alive.
    dead: u32,
    deaths: u32,
    pub allowed_to_move: bool,
    pub gravity_enabled: bool,
}

impl Player {
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: PlayerConfig, spawn: Vec2) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            body: Body::new(spawn, config.size),
            config,
            base_velocity: Vec2::ZERO,
            last_base_velocity: Vec2::ZERO,
            abilities: [Ability::None; 2],
            jump: JumpState::default(),
            wall: WallState::default(),
            dash: DashState::default(),
            dead: 0,
            deaths: 0,
            allowed_to_move: true,
            gravity_enabled: true,
        })
    }

    // -- queries ------------------------------------------------------------

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.body.bounds()
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    pub fn is_dead(&self) -> bool {
        self.dead > 0
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    /// The ability of the current world state.
    pub fn ability(&self, world: WorldSwitch) -> Ability {
        self.abilities[world.index()]
    }

    /// The ability of the other world state.
    pub fn passive_ability(&self, world: WorldSwitch) -> Ability {
        self.abilities[1 - world.index()]
    }

    pub fn has_ability(&self, ability: Ability, world: WorldSwitch) -> bool {
        self.ability(world) == ability
    }

    pub fn abilities(&self) -> [Ability; 2] {
        self.abilities
    }

    pub fn is_grounded(&self) -> bool {
        self.jump.coyote > 0
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.ticks > 0
    }

    pub fn is_wall_sticking(&self) -> bool {
        self.wall.sticking
    }

    pub fn is_gliding(&self, input: &InputFrame, world: WorldSwitch) -> bool {
        self.has_ability(Ability::Glider, world) && input.ability.pressed && self.allowed_to_move
    }

    pub fn contact(&self, face: Face) -> bool {
        self.body.contact(face)
    }

    /// What objects get to see of the player this tick.
    pub fn view(&self, input: &InputFrame, world: WorldSwitch) -> PlayerView {
        PlayerView {
            bounds: self.bounds(),
            velocity: self.body.velocity,
            gliding: self.is_gliding(input, world),
            alive: !self.is_dead(),
        }
    }

    // -- state changes ------------------------------------------------------

    /// Give the player an ability pair.
    ///
    /// A full pair is only taken if the player holds neither of its
    /// abilities in the current world; a pair with a `None` side only
    /// clears abilities the player actually has. Returns whether anything
    /// changed.
    pub fn set_abilities(&mut self, dark: Ability, light: Ability, world: WorldSwitch) -> bool {
        let take = if dark != Ability::None && light != Ability::None {
            !self.has_ability(dark, world) && !self.has_ability(light, world)
        } else {
            !self.has_ability(Ability::None, world)
        };
        if take && self.abilities != [dark, light] {
            self.abilities = [dark, light];
            return true;
        }
        false
    }

    pub fn reset_dash(&mut self) {
        self.dash.ticks = 0;
        self.dash.cooldown = 0;
        self.dash.usable = true;
    }

    pub fn reset_velocity(&mut self) {
        self.body.velocity = Vec2::ZERO;
        self.base_velocity = Vec2::ZERO;
    }

    /// Start the respawn countdown. Returns `false` if already dead.
    pub fn kill(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.dead = self.config.respawn_ticks.max(1);
        self.deaths += 1;
        self.reset_velocity();
        true
    }

    /// Advance the respawn countdown. Returns `true` on the tick it expires.
    pub fn tick_death(&mut self) -> bool {
        if self.dead == 0 {
            return false;
        }
        self.dead -= 1;
        self.dead == 0
    }

    /// Put the player back at `spawn` with every transient state cleared.
    pub fn respawn(&mut self, spawn: Vec2) {
        let config = self.config;
        let deaths = self.deaths;
        self.body = Body::new(spawn, config.size);
        self.base_velocity = Vec2::ZERO;
        self.last_base_velocity = Vec2::ZERO;
        self.abilities = [Ability::None; 2];
        self.jump = JumpState::default();
        self.wall = WallState::default();
        self.dash = DashState::default();
        self.dead = 0;
        self.deaths = deaths;
        self.allowed_to_move = true;
        self.gravity_enabled = true;
    }

    /// Apply one queued effect. Kills and ability changes are reported as
    /// events; level selection is left to the caller.
    pub fn apply_effect(&mut self, effect: PlayerEffect, ctx: &mut SimContext, objects: &Objects) {
        match effect {
            PlayerEffect::Kill(cause) => {
                if self.kill() {
                    debug!(?cause, deaths = self.deaths, "player killed");
                    ctx.emit(GameEvent::Killed { cause });
                }
            }
            PlayerEffect::AddForce(force) => self.body.add_force(force),
            PlayerEffect::AddBaseVelocity(velocity) => self.base_velocity += velocity,
            PlayerEffect::SetAbilities { dark, light } => {
                if self.set_abilities(dark, light, ctx.world) {
                    debug!(?dark, ?light, "abilities changed");
                    ctx.emit(GameEvent::AbilitiesChanged { dark, light });
                }
            }
            PlayerEffect::Push { by, offset } => self.push(by, offset, ctx, objects),
            PlayerEffect::SelectLevel(_) => {}
        }
    }

    /// Move the player by `offset` on behalf of object `by`. If the move is
    /// blocked and the player is still inside the pusher, it is crushed.
    fn push(&mut self, by: ObjectId, offset: Vec2, ctx: &mut SimContext, objects: &Objects) {
        if self.is_dead() {
            return;
        }
        let collider = SceneCollider::new(&ctx.grid, ctx.world, objects).ignoring(by);
        self.body.move_by(offset, &collider);
        let crushed = objects
            .get(by)
            .is_some_and(|pusher| pusher.collides_with(self.bounds()));
        if crushed && self.kill() {
            debug!(pusher = %by, "player crushed");
            ctx.emit(GameEvent::Killed {
                cause: KillCause::Crushed(by),
            });
        }
        ctx.player.bounds = self.bounds();
    }

    // -- tick ---------------------------------------------------------------

    /// One tick of input, forces, movement and collision callbacks.
    ///
    /// Effects queued by callbacks are left on `ctx` for the caller to
    /// apply.
    pub fn tick(&mut self, input: &InputFrame, ctx: &mut SimContext, objects: &mut Objects) {
        let cfg = self.config;
        let world = ctx.world;
        let movable = self.allowed_to_move;
        let horizontal = input.horizontal.clamp(-1.0, 1.0);

        self.body.begin_tick();
        count_down(&mut self.wall.left_move_cooldown);
        count_down(&mut self.wall.right_move_cooldown);

        if movable {
            // Steering back toward a wall just jumped off is ignored until
            // its cooldown runs out.
            let sign = if horizontal < 0.0 {
                if self.wall.left_move_cooldown > 0 { 0.0 } else { -1.0 }
            } else if self.wall.right_move_cooldown > 0 {
                0.0
            } else {
                1.0
            };
            let strength = horizontal.abs().powf(cfg.joystick_exponent) * cfg.move_speed * sign;
            self.body.add_force(Face::Right.direction() * strength);
        }

        if self.gravity_enabled {
            let gliding = self.is_gliding(input, world) && self.body.velocity.y > 0.0;
            let gravity = if gliding { cfg.glider_gravity } else { cfg.gravity };
            self.body.add_force(Face::Down.direction() * gravity);
        }

        if horizontal > 0.0 {
            self.dash.direction = 1.0;
        } else if horizontal < 0.0 {
            self.dash.direction = -1.0;
        }

        if self.has_ability(Ability::Dash, world)
            && input.ability.pressed_first_frame
            && self.dash.ticks == 0
            && self.dash.cooldown == 0
            && self.dash.usable
            && movable
        {
            self.dash.ticks = cfg.max_dash_ticks;
            self.dash.usable = false;
            self.dash.cooldown = cfg.max_dash_cooldown + self.dash.ticks;
            self.dash.velocity = Vec2::new(cfg.dash_strength * self.dash.direction, 0.0);
        }

        self.tick_jumps(input, movable, world);

        self.body.accumulate();
        let drag = self.tick_drag(input, movable, world);

        count_down(&mut self.dash.ticks);
        count_down(&mut self.dash.cooldown);
        if self.dash.ticks > 0 {
            let progress = 1.0 - self.dash.ticks as f32 / cfg.max_dash_ticks as f32;
            self.body.velocity = self.dash.velocity * (FRAC_PI_2 * progress).cos();
        } else {
            self.body.velocity *= drag;
            self.body.velocity += (Vec2::ONE - drag) * self.base_velocity;
            self.last_base_velocity = self.base_velocity;
            self.base_velocity = Vec2::ZERO;
        }

        {
            let collider = SceneCollider::new(&ctx.grid, world, objects);
            self.body.step(&collider);
        }
        self.tick_collision(input, ctx, objects);

        if self.body.contact(Face::Down) {
            self.jump.coyote = cfg.coyote_ticks;
            self.dash.usable = true;
        }
        count_down(&mut self.jump.coyote);
        if self.jump.coyote > 0 {
            self.jump.count = 0;
        }
        if self.body.contact(Face::Up) {
            self.jump.ticks = 0;
            self.wall.jump_ticks = 0;
        }
    }

    fn tick_jumps(&mut self, input: &InputFrame, movable: bool, world: WorldSwitch) {
        let cfg = self.config;

        if input.jump.pressed_first_frame && movable {
            self.jump.buffer = cfg.max_jump_buffer_ticks;
        }
        count_down(&mut self.jump.buffer);

        if self.wall.left_buffer > 0 && input.left() && movable {
            self.wall.left_jump_buffer = cfg.wall_jump_buffer_ticks;
        } else if self.wall.right_buffer > 0 && input.right() && movable {
            self.wall.right_jump_buffer = cfg.wall_jump_buffer_ticks;
        }

        if self.jump.buffer > 0 {
            let grounded = self.jump.coyote > 0;
            let air_jump = self.has_ability(Ability::DoubleJump, world) && self.jump.count < cfg.max_jump_count;
            if (grounded || air_jump) && self.dash.ticks == 0 {
                self.body.add_force(Face::Up.direction() * cfg.jump_init);
                self.jump.ticks = cfg.max_jump_ticks;
                self.wall.jump_cooldown = cfg.wall_jump_cooldown;
                self.jump.buffer = 0;
                self.jump.count += if grounded { 1 } else { 2 };
                self.body.velocity.y = 0.0;
                self.jump.coyote = 0;
            } else if self.has_ability(Ability::WallJump, world) && self.wall.jump_cooldown == 0 {
                let direction = if self.wall.left_jump_buffer > 0 {
                    Some(Vec2::new(1.0, -1.0))
                } else if self.wall.right_jump_buffer > 0 {
                    Some(Vec2::new(-1.0, -1.0))
                } else {
                    None
                };
                if let Some(direction) = direction {
                    if direction.x > 0.0 {
                        self.wall.left_move_cooldown = cfg.wall_jump_move_cooldown;
                    } else {
                        self.wall.right_move_cooldown = cfg.wall_jump_move_cooldown;
                    }
                    self.wall.direction = direction;
                    self.body.add_force(direction * cfg.wall_jump_init);
                    self.wall.jump_ticks = cfg.max_wall_jump_ticks;
                    self.jump.buffer = 0;
                    self.wall.left_jump_buffer = 0;
                    self.wall.right_jump_buffer = 0;
                    self.wall.left_buffer = 0;
                    self.wall.right_buffer = 0;
                }
            }
        }

        count_down(&mut self.wall.left_buffer);
        count_down(&mut self.wall.right_buffer);
        count_down(&mut self.wall.left_jump_buffer);
        count_down(&mut self.wall.right_jump_buffer);

        if !input.jump.pressed && movable {
            self.jump.ticks = 0;
            self.wall.jump_ticks = 0;
        }
        if self.jump.ticks > 0 {
            let decay = 1.1f32.powi((cfg.max_jump_ticks + 1 - self.jump.ticks) as i32);
            self.body
                .add_force(Face::Up.direction() * cfg.jump_boost / decay);
            self.jump.ticks -= 1;
        }
        if self.wall.jump_ticks > 0 {
            let decay = 1.1f32.powi((cfg.max_wall_jump_ticks + 1 - self.wall.jump_ticks) as i32);
            let angle = cfg.wall_jump_init.normalize_or_zero();
            self.body
                .add_force(self.wall.direction * angle * cfg.wall_jump_boost / decay);
            self.wall.jump_ticks -= 1;
            self.dash.direction = self.wall.direction.x;
        }

        count_down(&mut self.wall.jump_cooldown);
    }

    /// Drag for this tick; holding into a wall while falling slows the fall.
    fn tick_drag(&mut self, input: &InputFrame, movable: bool, world: WorldSwitch) -> Vec2 {
        let mut drag = self.config.drag;
        let wall_jump = self.has_ability(Ability::WallJump, world);
        self.wall.sticking = false;
        if wall_jump && self.body.velocity.y > 0.0 && movable {
            let holding = (self.wall.left && input.left()) || (self.wall.right && input.right());
            if holding {
                drag.y *= self.config.wall_jump_drag;
                self.reset_dash();
                self.wall.sticking = true;
            }
        }
        if wall_jump && (self.wall.left || self.wall.right) {
            self.reset_dash();
        }
        drag
    }

    /// Probe the four faces, the two wall sides, then run touch callbacks.
    fn tick_collision(&mut self, input: &InputFrame, ctx: &mut SimContext, objects: &mut Objects) {
        let world = ctx.world;
        let bounds = self.bounds();

        let mut flags = [false; 4];
        for face in Face::ALL {
            let mut offset = face.direction() * STEP;
            if face == Face::Down {
                offset += face.direction() * self.last_base_velocity.y.max(0.0);
            }
            let probe_box = bounds.translated(offset);
            let mut hit = objects.handle_face_collision(probe_box, face, ctx);
            hit |= ctx
                .grid
                .face_collision(probe_box, face, world, &mut ctx.tile_effects);
            flags[face.index()] = hit;
        }
        self.body.set_contacts(flags);

        let wall_at = |face: Face| {
            let side = bounds.translated(face.direction() * STEP);
            objects.collides_with_solid(side, world, None)
                || probe::touches_wall(&ctx.grid, side, world)
        };
        self.wall.left = wall_at(Face::Left);
        self.wall.right = wall_at(Face::Right);
        if self.wall.left {
            self.wall.left_buffer = self.config.wall_buffer_ticks;
        }
        if self.wall.right {
            self.wall.right_buffer = self.config.wall_buffer_ticks;
        }

        ctx.grid.touch(bounds, &mut ctx.tile_effects);
        ctx.player = self.view(input, world);
        objects.handle_collision(bounds, ctx);
        ctx.absorb_tile_effects();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(PlayerConfig::default(), Vec2::ZERO).unwrap()
    }

    #[test]
    fn full_pair_is_taken_only_without_either_ability() {
        let world = WorldSwitch::default();
        let mut p = player();
        assert!(p.set_abilities(Ability::WallJump, Ability::Dash, world));
        assert_eq!(p.ability(world), Ability::WallJump);
        assert_eq!(p.passive_ability(world), Ability::Dash);

        // Already holding WallJump in this world: the same pair is ignored.
        assert!(!p.set_abilities(Ability::WallJump, Ability::Dash, world));
        // A pair sharing an ability with the current one is refused.
        assert!(!p.set_abilities(Ability::DoubleJump, Ability::WallJump, WorldSwitch::new(true)));
        assert!(p.set_abilities(Ability::DoubleJump, Ability::Glider, world));
    }

    #[test]
    fn empty_pair_clears_only_when_holding_something() {
        let world = WorldSwitch::default();
        let mut p = player();
        assert!(!p.set_abilities(Ability::None, Ability::None, world));
        p.set_abilities(Ability::Dash, Ability::Glider, world);
        assert!(p.set_abilities(Ability::None, Ability::None, world));
        assert_eq!(p.abilities(), [Ability::None; 2]);
    }

    #[test]
    fn kill_counts_once_until_respawn() {
        let mut p = player();
        assert!(p.kill());
        assert!(!p.kill());
        assert_eq!(p.deaths(), 1);
        let ticks = p.config.respawn_ticks;
        for _ in 1..ticks {
            assert!(!p.tick_death());
        }
        assert!(p.tick_death());
        p.respawn(Vec2::new(3.0, 4.0));
        assert!(!p.is_dead());
        assert_eq!(p.position(), Vec2::new(3.0, 4.0));
        assert_eq!(p.deaths(), 1);
    }

    #[test]
    fn config_validation_names_the_field() {
        let config = PlayerConfig {
            max_dash_ticks: 0,
            ..PlayerConfig::default()
        };
        match config.validate() {
            Err(EngineError::InvalidConfig { field, .. }) => assert_eq!(field, "max_dash_ticks"),
            other => panic!("unexpected {other:?}"),
        }
        let config = PlayerConfig {
            drag: Vec2::new(1.5, 0.9),
            ..PlayerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
