//! Fixed-timestep simulation driver.
//!
//! [`Simulation`] owns the whole game state: the [`SimContext`] (grid, world
//! state, effect queues), the object registry and the player. Each tick:
//!
//! 1. A world-switch request flips the [`WorldSwitch`], unless doing so would
//!    embed the player in something that becomes solid.
//! 2. A dead player counts down to respawn; when the countdown expires the
//!    level restarts. A live player runs its controller and collision pass.
//! 3. Every object ticks in insertion order.
//! 4. Queued player effects are applied after each phase, objects flagged
//!    for destruction are swept, and the events of the tick are stamped with
//!    the tick number.
//!
//! Nothing in a tick reads the wall clock, so the same initial state plus the
//! same input frames always produce the same final state. [`FixedStepClock`]
//! turns wall-clock deltas into a tick count and a render lag fraction
//! outside of the simulation itself.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chroma_grid::prelude::{Bounds, TileGrid, TileTable, WorldSwitch};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::body::Collider;
use crate::context::{PlayerEffect, SimContext};
use crate::event::{EventRecord, GameEvent};
use crate::level::LevelData;
use crate::player::{Player, PlayerConfig};
use crate::registry::{Objects, SceneCollider};
use crate::EngineError;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-timestep loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickConfig {
    /// Seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// Headless mode: no rendering, tick as fast as possible.
    pub headless: bool,
}

impl Default for TickConfig {
    /// 60 Hz, headless off.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            headless: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing and counts for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    pub player_time: Duration,
    pub objects_time: Duration,
    pub total_time: Duration,
    /// Live objects after the sweep.
    pub objects: usize,
    pub destroyed: usize,
    pub events: usize,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// State of one digital input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Button {
    pub pressed: bool,
    /// Pressed this tick but not the previous one.
    pub pressed_first_frame: bool,
}

impl Button {
    pub const RELEASED: Button = Button {
        pressed: false,
        pressed_first_frame: false,
    };

    /// Pressed on this very tick.
    pub const TAPPED: Button = Button {
        pressed: true,
        pressed_first_frame: true,
    };

    /// Held since an earlier tick.
    pub const HELD: Button = Button {
        pressed: true,
        pressed_first_frame: false,
    };

    /// The button state after this one, given whether it is down now.
    pub fn next(self, down: bool) -> Button {
        Button {
            pressed: down,
            pressed_first_frame: down && !self.pressed,
        }
    }
}

/// The player's input for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Horizontal intention in `[-1, 1]`; negative is left.
    pub horizontal: f32,
    pub jump: Button,
    pub ability: Button,
    /// Toggles the world state on its first frame.
    pub switch: Button,
}

impl InputFrame {
    pub fn is_empty(&self) -> bool {
        *self == InputFrame::default()
    }

    pub fn left(&self) -> bool {
        self.horizontal < 0.0
    }

    pub fn right(&self) -> bool {
        self.horizontal > 0.0
    }
}

// ---------------------------------------------------------------------------
// FixedStepClock
// ---------------------------------------------------------------------------

/// Accumulates wall-clock time into whole ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepClock {
    fixed_dt: f64,
    accumulator: f64,
    /// Upper bound on ticks per [`advance`](Self::advance); time beyond it
    /// is dropped so a long stall does not snowball.
    pub max_ticks: u32,
}

impl FixedStepClock {
    pub fn new(fixed_dt: f64) -> Self {
        assert!(
            fixed_dt > 0.0 && fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {fixed_dt}"
        );
        Self {
            fixed_dt,
            accumulator: 0.0,
            max_ticks: 8,
        }
    }

    /// Add `elapsed` and return how many ticks are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed.as_secs_f64();
        let due = (self.accumulator / self.fixed_dt).floor();
        if due >= f64::from(self.max_ticks) {
            self.accumulator = 0.0;
            return self.max_ticks;
        }
        self.accumulator -= due * self.fixed_dt;
        due as u32
    }

    /// Fraction of a tick accumulated but not yet simulated, in `[0, 1]`.
    pub fn lag(&self) -> f32 {
        (self.accumulator / self.fixed_dt).clamp(0.0, 1.0) as f32
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

pub struct Simulation {
    ctx: SimContext,
    objects: Objects,
    player: Player,
    /// Where the player respawns.
    spawn: Vec2,
    config: TickConfig,
    clock: FixedStepClock,
    tick_counter: u64,
    current_input: InputFrame,
    selected_level: Option<u32>,
    events: Vec<EventRecord>,
    last_diagnostics: TickDiagnostics,
}

impl Simulation {
    /// Build a simulation from a grid and a populated registry.
    ///
    /// The player spawns at `spawn` if given, otherwise on the grid's spawn
    /// tile.
    ///
    /// # Errors
    ///
    /// [`EngineError::MissingSpawn`] if there is neither; any
    /// [`EngineError::InvalidConfig`] from the player configuration.
    ///
    /// # Panics
    ///
    /// If `config.fixed_dt` is not positive and finite.
    pub fn new(
        grid: TileGrid,
        objects: Objects,
        spawn: Option<Vec2>,
        player_config: PlayerConfig,
        config: TickConfig,
    ) -> Result<Self, EngineError> {
        let spawn = spawn
            .or_else(|| grid.spawn_point(player_config.size))
            .ok_or(EngineError::MissingSpawn)?;
        let player = Player::new(player_config, spawn)?;
        let mut ctx = SimContext::new(grid);
        ctx.player = player.view(&InputFrame::default(), ctx.world);
        info!(
            width = ctx.grid.width(),
            height = ctx.grid.height(),
            objects = objects.len(),
            "simulation created"
        );
        Ok(Self {
            ctx,
            objects,
            player,
            spawn,
            clock: FixedStepClock::new(config.fixed_dt),
            config,
            tick_counter: 0,
            current_input: InputFrame::default(),
            selected_level: None,
            events: Vec::new(),
            last_diagnostics: TickDiagnostics::default(),
        })
    }

    /// Build a simulation from level data.
    ///
    /// # Errors
    ///
    /// Anything [`LevelData::build`] or [`Simulation::new`] reports.
    pub fn from_level(
        level: &LevelData,
        table: Arc<TileTable>,
        player_config: PlayerConfig,
        config: TickConfig,
    ) -> Result<Self, EngineError> {
        let (grid, objects) = level.build(table)?;
        Self::new(grid, objects, level.spawn, player_config, config)
    }

    /// Replace the current level. Persistent objects survive; the player
    /// respawns in the new level with the world state reset.
    ///
    /// # Errors
    ///
    /// Anything [`LevelData::build`] reports, or
    /// [`EngineError::MissingSpawn`]. The simulation is untouched on error.
    pub fn load_level(&mut self, level: &LevelData) -> Result<(), EngineError> {
        let table = Arc::clone(self.ctx.grid.table());
        let (grid, fresh) = level.build(table)?;
        let spawn = level
            .spawn
            .or_else(|| grid.spawn_point(self.player.config.size))
            .ok_or(EngineError::MissingSpawn)?;

        let mut objects = std::mem::take(&mut self.objects);
        objects.clear_level();
        objects.clear_prototypes();
        objects.absorb(fresh);
        self.objects = objects;

        self.ctx.grid = grid;
        self.ctx.grid.mark_dirty();
        self.ctx.world = WorldSwitch::default();
        self.ctx.wind.clear();
        self.ctx.effects.clear();
        self.spawn = spawn;
        self.selected_level = None;
        self.player.respawn(spawn);
        self.ctx.player = self.player.view(&self.current_input, self.ctx.world);
        info!(
            width = self.ctx.grid.width(),
            height = self.ctx.grid.height(),
            objects = self.objects.len(),
            "level loaded"
        );
        Ok(())
    }

    // -- ticking ------------------------------------------------------------

    /// Execute one tick with the current input frame.
    pub fn tick(&mut self) {
        let tick_start = Instant::now();
        let input = self.current_input;

        if input.switch.pressed_first_frame && !self.player.is_dead() && self.player.allowed_to_move
        {
            self.toggle_world();
        }

        let player_start = Instant::now();
        if self.player.is_dead() {
            if self.player.tick_death() {
                self.restart_level();
            }
        } else {
            self.player.tick(&input, &mut self.ctx, &mut self.objects);
            self.apply_effects();
        }
        let player_time = player_start.elapsed();

        let objects_start = Instant::now();
        self.ctx.player = self.player.view(&input, self.ctx.world);
        self.objects.tick_all(&mut self.ctx);
        self.apply_effects();
        let destroyed = self.objects.destroy_marked();
        for &id in &destroyed {
            self.ctx.wind.forget(id);
        }
        let objects_time = objects_start.elapsed();

        let tick = self.tick_counter;
        let before = self.events.len();
        self.events.extend(
            self.ctx
                .events
                .drain(..)
                .map(|event| EventRecord { tick, event }),
        );
        self.tick_counter += 1;

        self.last_diagnostics = TickDiagnostics {
            player_time,
            objects_time,
            total_time: tick_start.elapsed(),
            objects: self.objects.len(),
            destroyed: destroyed.len(),
            events: self.events.len() - before,
        };
    }

    /// Set the input and run one tick.
    pub fn step(&mut self, input: InputFrame) {
        self.set_input(input);
        self.tick();
    }

    /// Run `count` ticks with the current input.
    pub fn run_ticks(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Feed wall-clock time and run every tick that became due. Returns the
    /// number of ticks run.
    pub fn advance(&mut self, elapsed: Duration, input: InputFrame) -> u32 {
        self.set_input(input);
        let due = self.clock.advance(elapsed);
        for _ in 0..due {
            self.tick();
        }
        due
    }

    fn toggle_world(&mut self) {
        let mut next = self.ctx.world;
        next.toggle();
        let blocked = SceneCollider::new(&self.ctx.grid, next, &self.objects)
            .collides(self.player.bounds());
        if blocked {
            debug!(inverted = next.is_inverted(), "world switch blocked");
            self.ctx.emit(GameEvent::WorldSwitchBlocked);
            return;
        }
        self.ctx.world = next;
        self.ctx.grid.mark_dirty();
        debug!(inverted = next.is_inverted(), "world switched");
        self.ctx.emit(GameEvent::WorldSwitched {
            inverted: next.is_inverted(),
        });
    }

    /// Reset grid, objects and world state, and respawn the player.
    pub fn restart_level(&mut self) {
        self.ctx.grid.reset();
        self.ctx.world = WorldSwitch::default();
        self.ctx.wind.clear();
        self.ctx.effects.clear();
        self.objects.reset();
        self.player.respawn(self.spawn);
        self.ctx.player = self.player.view(&self.current_input, self.ctx.world);
        info!(deaths = self.player.deaths(), "level restarted");
        self.ctx.emit(GameEvent::Respawned);
    }

    fn apply_effects(&mut self) {
        let effects = std::mem::take(&mut self.ctx.effects);
        for effect in effects {
            match effect {
                PlayerEffect::SelectLevel(level) => {
                    if self.selected_level != Some(level) {
                        self.selected_level = Some(level);
                        self.ctx.emit(GameEvent::LevelSelected { level });
                    }
                }
                other => self
                    .player
                    .apply_effect(other, &mut self.ctx, &self.objects),
            }
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in seconds, `tick_count * fixed_dt`.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.config.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    pub fn is_headless(&self) -> bool {
        self.config.headless
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn grid(&self) -> &TileGrid {
        &self.ctx.grid
    }

    /// Mutable grid access for level editing between ticks.
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.ctx.grid
    }

    pub fn world(&self) -> WorldSwitch {
        self.ctx.world
    }

    pub fn objects(&self) -> &Objects {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut Objects {
        &mut self.objects
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn selected_level(&self) -> Option<u32> {
        self.selected_level
    }

    /// Every event since the last [`drain_events`](Self::drain_events).
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    pub fn set_input(&mut self, input: InputFrame) {
        self.current_input = input;
    }

    pub fn current_input(&self) -> &InputFrame {
        &self.current_input
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    /// Render lag fraction left over from [`advance`](Self::advance).
    pub fn lag(&self) -> f32 {
        self.clock.lag()
    }

    /// The player's box blended between the last two ticks.
    pub fn interpolated_player(&self, lag: f32) -> Bounds {
        self.player.body.interpolated(lag)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
