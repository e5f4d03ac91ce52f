//! Simulation tuning parameters
//!
//! Every constant of the animation is exposed here so hosts and tests can
//! tune or pin it. Defaults reproduce the stock starfield.

use std::fmt;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use starfield_math::Rgba;

/// Default number of stars
pub const DEFAULT_PARTICLE_COUNT: usize = 60;
/// Default distance under which two stars are joined
pub const DEFAULT_CONNECT_DISTANCE: f32 = 150.0;
/// Default per-frame velocity damping
pub const DEFAULT_DAMPING: f32 = 0.99;
/// Default per-frame flicker probability
pub const DEFAULT_FLICKER_PROBABILITY: f32 = 0.01;
/// Default initial star speed spread
pub const DEFAULT_PARTICLE_SPEED: f32 = 0.3;
/// Default meteor respawn delay in milliseconds
pub const DEFAULT_RESPAWN_DELAY_MS: u64 = 3000;

/// Which particle pairs the connection pass considers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// Distinct ordered pairs only; a star is never joined to itself
    #[default]
    SkipSelf,
    /// Every ordered pair including (p, p), which strokes a zero-length line
    /// per star per frame
    AllOrderedPairs,
}

/// Configuration of the whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of stars, fixed for the lifetime of a run
    pub particle_count: usize,
    /// Spread of initial star velocity (each axis in [-speed/2, speed/2))
    pub particle_speed: f32,
    /// Distance under which two stars are joined
    pub connect_distance: f32,
    /// Per-frame multiplicative velocity damping
    pub damping: f32,
    /// Per-frame probability that a star re-rolls its opacity
    pub flicker_probability: f32,
    /// Star colors
    pub palette: Vec<Rgba>,
    /// Self-pair handling of the connection pass
    pub connection_mode: ConnectionMode,
    /// Fixed RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Meteor settings
    pub meteor: MeteorConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            particle_speed: DEFAULT_PARTICLE_SPEED,
            connect_distance: DEFAULT_CONNECT_DISTANCE,
            damping: DEFAULT_DAMPING,
            flicker_probability: DEFAULT_FLICKER_PROBABILITY,
            palette: default_palette(),
            connection_mode: ConnectionMode::default(),
            seed: None,
            meteor: MeteorConfig::default(),
        }
    }
}

/// White through gold to orange
pub fn default_palette() -> Vec<Rgba> {
    vec![
        Rgba::rgb(1.0, 1.0, 1.0),
        Rgba::rgb(247.0 / 255.0, 247.0 / 255.0, 168.0 / 255.0),
        Rgba::rgb(240.0 / 255.0, 230.0 / 255.0, 140.0 / 255.0),
        Rgba::rgb(1.0, 215.0 / 255.0, 0.0),
        Rgba::rgb(1.0, 165.0 / 255.0, 0.0),
    ]
}

impl SimulationConfig {
    /// Set the star count
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the connect distance
    pub fn with_connect_distance(mut self, distance: f32) -> Self {
        self.connect_distance = distance;
        self
    }

    /// Set the flicker probability
    pub fn with_flicker_probability(mut self, probability: f32) -> Self {
        self.flicker_probability = probability;
        self
    }

    /// Set the connection mode
    pub fn with_connection_mode(mut self, mode: ConnectionMode) -> Self {
        self.connection_mode = mode;
        self
    }

    /// Pin the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<(), SimulationConfigError> {
        if self.particle_count == 0 {
            return Err(SimulationConfigError::NoParticles);
        }
        if !(self.particle_speed.is_finite() && self.particle_speed >= 0.0) {
            return Err(SimulationConfigError::InvalidSpeed(self.particle_speed));
        }
        if !(self.connect_distance.is_finite() && self.connect_distance > 0.0) {
            return Err(SimulationConfigError::InvalidConnectDistance(self.connect_distance));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(SimulationConfigError::DampingOutOfRange(self.damping));
        }
        if !(0.0..=1.0).contains(&self.flicker_probability) {
            return Err(SimulationConfigError::ProbabilityOutOfRange(self.flicker_probability));
        }
        if self.palette.is_empty() {
            return Err(SimulationConfigError::EmptyPalette);
        }
        self.meteor.validate()
    }
}

/// Meteor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteorConfig {
    /// Wait between leaving the screen and the next activation
    pub respawn_delay_ms: u64,
    /// Per-frame multiplicative opacity decay
    pub opacity_decay: f32,
    /// How far outside the surface a meteor spawns
    pub spawn_margin: f32,
    /// Shortest tail (inclusive)
    pub min_tail_length: f32,
    /// Longest tail (exclusive)
    pub max_tail_length: f32,
    /// Drawn streak length as a multiple of velocity
    pub streak_scale: f32,
    /// Stroke width of the streak
    pub line_width: f32,
    /// Alpha at the head of the streak gradient
    pub head_alpha: f32,
}

impl Default for MeteorConfig {
    fn default() -> Self {
        Self {
            respawn_delay_ms: DEFAULT_RESPAWN_DELAY_MS,
            opacity_decay: 0.98,
            spawn_margin: 50.0,
            min_tail_length: 50.0,
            max_tail_length: 100.0,
            streak_scale: 10.0,
            line_width: 2.0,
            head_alpha: 1.0,
        }
    }
}

impl MeteorConfig {
    /// Respawn delay as a duration
    pub fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_delay_ms)
    }

    fn validate(&self) -> Result<(), SimulationConfigError> {
        if !(self.min_tail_length >= 0.0 && self.min_tail_length <= self.max_tail_length) {
            return Err(SimulationConfigError::InvalidTailRange {
                min: self.min_tail_length,
                max: self.max_tail_length,
            });
        }
        if !(0.0..=1.0).contains(&self.opacity_decay) {
            return Err(SimulationConfigError::ProbabilityOutOfRange(self.opacity_decay));
        }
        if !(0.0..=1.0).contains(&self.head_alpha) {
            return Err(SimulationConfigError::ProbabilityOutOfRange(self.head_alpha));
        }
        Ok(())
    }
}

/// Reasons a [`SimulationConfig`] is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationConfigError {
    /// `particle_count` is zero
    NoParticles,
    /// `particle_speed` is negative or not finite
    InvalidSpeed(f32),
    /// `connect_distance` is not a positive finite number
    InvalidConnectDistance(f32),
    /// `damping` outside (0, 1]
    DampingOutOfRange(f32),
    /// A probability or ratio outside [0, 1]
    ProbabilityOutOfRange(f32),
    /// `palette` has no colors
    EmptyPalette,
    /// Meteor tail range is negative or inverted
    InvalidTailRange { min: f32, max: f32 },
}

impl fmt::Display for SimulationConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoParticles => write!(f, "particle_count must be at least 1"),
            Self::InvalidSpeed(v) => write!(f, "particle_speed must be >= 0, got {}", v),
            Self::InvalidConnectDistance(v) => {
                write!(f, "connect_distance must be > 0, got {}", v)
            }
            Self::DampingOutOfRange(v) => write!(f, "damping must be in (0, 1], got {}", v),
            Self::ProbabilityOutOfRange(v) => write!(f, "value must be in [0, 1], got {}", v),
            Self::EmptyPalette => write!(f, "palette must contain at least one color"),
            Self::InvalidTailRange { min, max } => {
                write!(f, "meteor tail range [{}, {}) is invalid", min, max)
            }
        }
    }
}

impl std::error::Error for SimulationConfigError {}
