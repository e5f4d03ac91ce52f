//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`STARFIELD_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use starfield_core::{SimulationConfig, SimulationConfigError};
use starfield_math::Size2;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Headless surface configuration
    #[serde(default)]
    pub surface: SurfaceConfig,
    /// Simulation tuning
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Frame runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`STARFIELD_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // STARFIELD_SIMULATION__PARTICLE_COUNT=80 -> simulation.particle_count = 80
        figment = figment.merge(Env::prefixed("STARFIELD_").split("__"));

        let config: Self = figment.extract()?;
        config.simulation.validate()?;
        Ok(config)
    }
}

/// Headless surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl SurfaceConfig {
    /// Viewport as a size
    pub fn viewport(&self) -> Size2 {
        Size2::new(self.width, self.height)
    }
}

/// Frame runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Number of frames to run before shutting down
    pub frames: u64,
    /// Nominal frame interval in milliseconds (~60 Hz)
    pub frame_interval_ms: u64,
    /// Sleep between frames and measure real elapsed time
    pub realtime: bool,
    /// Log a stats line every this many frames (0 disables)
    pub stats_every: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_interval_ms: 16,
            realtime: false,
            stats_every: 60,
        }
    }
}

impl RunnerConfig {
    /// Frame interval as a duration
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl From<SimulationConfigError> for ConfigError {
    fn from(e: SimulationConfigError) -> Self {
        ConfigError {
            message: format!("invalid simulation settings: {}", e),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
