//! Star particles
//!
//! A star drifts with a slowly decaying velocity, wraps around the surface
//! edges and occasionally flickers to a new opacity.

use rand::Rng;
use rand::seq::IndexedRandom;
use starfield_math::{Rgba, Size2, Vec2};

use crate::config::SimulationConfig;
use crate::random::uniform;
use crate::surface::DrawContext;

/// Smallest star radius (inclusive)
pub const MIN_RADIUS: f32 = 1.0;
/// Largest star radius (exclusive)
pub const MAX_RADIUS: f32 = 3.0;
/// Lowest opacity a star can roll (inclusive)
pub const MIN_OPACITY: f32 = 0.2;
/// Highest opacity a star can roll (exclusive)
pub const MAX_OPACITY: f32 = 1.0;

/// A single star
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Position in surface pixels, kept inside [0, width) x [0, height)
    pub position: Vec2,
    /// Velocity in pixels per frame
    pub velocity: Vec2,
    /// Disc radius, fixed at creation
    pub radius: f32,
    /// Base color, fixed at creation
    pub color: Rgba,
    /// Current opacity (alpha applied to `color`)
    pub opacity: f32,
}

impl Particle {
    /// Create a particle with explicit state
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: Rgba, opacity: f32) -> Self {
        Self { position, velocity, radius, color, opacity }
    }

    /// Create a randomized particle somewhere on a surface of the given size
    pub fn spawn<R: Rng>(bounds: Size2, config: &SimulationConfig, rng: &mut R) -> Self {
        let extent = bounds.extent();
        let half_speed = config.particle_speed * 0.5;

        let position = Vec2::new(uniform(rng, 0.0, extent.x), uniform(rng, 0.0, extent.y));
        let velocity = Vec2::new(
            uniform(rng, -half_speed, half_speed),
            uniform(rng, -half_speed, half_speed),
        );
        let radius = uniform(rng, MIN_RADIUS, MAX_RADIUS);
        let color = config.palette.choose(rng).copied().unwrap_or(Rgba::WHITE);
        let opacity = uniform(rng, MIN_OPACITY, MAX_OPACITY);

        Self::new(position, velocity, radius, color, opacity)
    }

    /// Advance one frame
    ///
    /// Integrates position, damps velocity, wraps around the surface edges and
    /// rolls for a flicker. Returns true if the opacity was re-rolled.
    pub fn update<R: Rng>(&mut self, bounds: Size2, config: &SimulationConfig, rng: &mut R) -> bool {
        self.position += self.velocity;
        self.velocity *= config.damping;

        let extent = bounds.extent();
        self.position.x = wrap(self.position.x, extent.x);
        self.position.y = wrap(self.position.y, extent.y);

        let flicker = rng.random::<f32>() < config.flicker_probability;
        if flicker {
            self.opacity = uniform(rng, MIN_OPACITY, MAX_OPACITY);
        }
        flicker
    }

    /// Fill a disc in the particle's color at its current opacity
    pub fn draw(&self, ctx: &mut dyn DrawContext) {
        ctx.fill_circle(self.position, self.radius, self.color.with_alpha(self.opacity));
    }
}

/// Toroidal wrap of a coordinate into [0, extent)
fn wrap(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    if (0.0..extent).contains(&value) {
        return value;
    }
    // rem_euclid can round up to `extent` for tiny negative inputs
    let wrapped = value.rem_euclid(extent);
    if wrapped < extent { wrapped } else { 0.0 }
}
