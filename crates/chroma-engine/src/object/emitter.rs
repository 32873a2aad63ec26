//! Particle emitters.
//!
//! Emitters are purely cosmetic, but they live in the simulation so that
//! moving platforms can sweep their particles along. Randomness comes from a
//! seeded [`Pcg32`] stored in the emitter itself, so two runs with the same
//! input emit the same particles.

use chroma_grid::prelude::Bounds;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ObjectState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Ticks of emission; `0` emits forever.
    pub duration: u32,
    /// Emit every `emission_interval` ticks; `0` emits every tick.
    pub emission_interval: u32,
    /// Particles per emission.
    pub emission_rate: u32,
    pub min_start_velocity: Vec2,
    pub max_start_velocity: Vec2,
    /// Added to each particle's vertical velocity every tick.
    pub gravity: f32,
    pub max_lifetime: u32,
    pub play_on_spawn: bool,
    /// Remove the emitter once it finished instead of just stopping.
    pub destroy_on_end: bool,
    pub seed: u64,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            duration: 0,
            emission_interval: 0,
            emission_rate: 1,
            min_start_velocity: Vec2::new(-0.05, -0.05),
            max_start_velocity: Vec2::new(0.05, 0.05),
            gravity: 0.0,
            max_lifetime: 60,
            play_on_spawn: true,
            destroy_on_end: false,
            seed: 0,
        }
    }
}

impl EmitterConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_lifetime == 0 {
            return Err("emitter max_lifetime must be positive".to_string());
        }
        if !self.min_start_velocity.is_finite()
            || !self.max_start_velocity.is_finite()
            || !self.gravity.is_finite()
        {
            return Err("emitter velocities and gravity must be finite".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec2,
    pub last_position: Vec2,
    pub velocity: Vec2,
    pub lifetime: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    pub config: EmitterConfig,
    #[serde(default)]
    particles: Vec<Particle>,
    #[serde(default)]
    elapsed: u32,
    #[serde(default)]
    playing: bool,
    #[serde(default = "unseeded")]
    rng: Pcg32,
}

fn unseeded() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Self {
        let rng = Pcg32::seed_from_u64(config.seed);
        Self {
            config,
            particles: Vec::new(),
            elapsed: 0,
            playing: false,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Restart emission from the beginning.
    pub fn play(&mut self) {
        self.playing = true;
        self.elapsed = 0;
    }

    /// Stop emitting; live particles run out their lifetime.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub(crate) fn post_spawn(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.config.seed);
        if self.config.play_on_spawn {
            self.play();
        }
    }

    /// Drop every particle and start over from the seed.
    pub(crate) fn reset(&mut self) {
        self.particles.clear();
        self.elapsed = 0;
        self.playing = false;
        self.post_spawn();
    }

    pub(crate) fn tick(&mut self, state: &mut ObjectState) {
        let cfg = &self.config;
        let emitting = self.playing
            && (cfg.duration == 0 || self.elapsed < cfg.duration)
            && (cfg.emission_interval == 0 || self.elapsed % cfg.emission_interval == 0);
        if emitting {
            for _ in 0..cfg.emission_rate {
                let t = Vec2::new(self.rng.gen::<f32>(), self.rng.gen::<f32>());
                let velocity = cfg.min_start_velocity
                    + (cfg.max_start_velocity - cfg.min_start_velocity) * t;
                self.particles.push(Particle {
                    position: state.position,
                    last_position: state.position,
                    velocity,
                    lifetime: 0,
                });
            }
        }

        let (gravity, max_lifetime) = (cfg.gravity, cfg.max_lifetime);
        self.particles.retain_mut(|p| {
            p.last_position = p.position;
            p.velocity.y += gravity;
            p.position += p.velocity;
            p.lifetime += 1;
            p.lifetime < max_lifetime
        });

        if !self.playing {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(1);
        let finished = self.config.duration > 0
            && self.elapsed >= self.config.duration.saturating_add(self.config.max_lifetime);
        if finished {
            if self.config.destroy_on_end {
                state.should_destroy = true;
            } else {
                self.playing = false;
            }
        }
    }

    /// Move every particle inside `bounds` by `velocity`.
    pub(crate) fn push(&mut self, bounds: Bounds, velocity: Vec2) {
        let (min, max) = (bounds.position, bounds.max());
        for p in &mut self.particles {
            if p.position.cmpge(min).all() && p.position.cmple(max).all() {
                p.position += velocity;
            }
        }
    }
}
