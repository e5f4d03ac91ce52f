//! Starfield simulation core
//!
//! This crate provides the animation model behind the starfield background:
//!
//! - [`Particle`] - A drifting, flickering, wrapping star
//! - [`Meteor`] - The single meteor streak and its respawn cycle
//! - [`render_connections`] - Proximity lines between stars
//! - [`Scheduler`] - Virtual-clock frame requests and one-shot timers
//! - [`Simulation`] - Owns all of the above and runs the frame loop
//! - [`Surface`] / [`DrawContext`] - What a host implements to be drawn on
//!
//! Rendering is immediate-mode through [`DrawContext`]; the crate never owns
//! pixels.

pub mod config;
pub mod connections;
pub mod meteor;
pub mod particle;
pub mod scheduler;
pub mod simulation;
pub mod surface;
mod random;

pub use config::{ConnectionMode, MeteorConfig, SimulationConfig, SimulationConfigError};
pub use connections::{connection_alpha, render_connections};
pub use meteor::{Meteor, MeteorState, SpawnEdge};
pub use particle::Particle;
pub use random::rng_from_seed;
pub use scheduler::{FiredTimer, FrameHandle, Scheduler, Task, TimerKey};
pub use simulation::{FrameStats, Simulation};
pub use surface::{DrawContext, GradientStop, Paint, Stroke, Surface};

// Re-export math types for convenience
pub use starfield_math::{Rgba, Size2, Vec2};
