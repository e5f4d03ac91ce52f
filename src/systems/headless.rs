//! Headless runner
//!
//! Runs the simulation against a [`RecordingSurface`] for a fixed number of
//! frames, without any window. Useful for smoke tests, profiling and checking
//! configuration changes.

use std::time::Duration;
use starfield_core::{FrameStats, Simulation, SimulationConfigError};
use starfield_render::{InstanceBatch, RecordingSurface};

use crate::config::AppConfig;
use crate::systems::frame_loop::{FrameLoopSystem, Pacing};

/// Totals collected over a headless run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Frames actually drawn (including the one drawn on init)
    pub frames_drawn: u64,
    /// Frames skipped because nothing was drawn
    pub frames_skipped: u64,
    /// Connection lines over all frames
    pub total_connections: u64,
    /// Frames in which the meteor was visible
    pub meteor_frames: u64,
    /// Number of meteor activations (initial spawn included)
    pub meteor_activations: u64,
    /// Simulated time covered by the run
    pub simulated: Duration,
    /// Size of the last frame's instance buffers in bytes
    pub last_frame_bytes: usize,
}

impl RunSummary {
    fn record(&mut self, stats: Option<FrameStats>) {
        match stats {
            Some(stats) => {
                self.frames_drawn += 1;
                self.total_connections += stats.connections as u64;
                if stats.meteor_drawn {
                    self.meteor_frames += 1;
                }
            }
            None => self.frames_skipped += 1,
        }
    }

    /// Mean connection lines per drawn frame
    pub fn mean_connections(&self) -> f64 {
        if self.frames_drawn == 0 {
            0.0
        } else {
            self.total_connections as f64 / self.frames_drawn as f64
        }
    }
}

/// Headless simulation runner
pub struct HeadlessRunner {
    config: AppConfig,
}

impl HeadlessRunner {
    /// Create a runner from application configuration
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the configured number of frames and destroy the simulation
    ///
    /// The first frame is the one drawn by init. Settings are validated even
    /// when no frames are requested.
    pub fn run(&self) -> Result<RunSummary, SimulationConfigError> {
        let runner = &self.config.runner;
        let mut simulation = Simulation::new(self.config.simulation.clone())?;
        let mut surface = RecordingSurface::new(self.config.surface.viewport());

        let pacing = if runner.realtime {
            Pacing::Realtime
        } else {
            Pacing::Fixed(runner.frame_interval())
        };
        let mut frame_loop = FrameLoopSystem::new(pacing);
        let mut summary = RunSummary::default();

        // init always draws a frame, so a zero-frame run never starts
        if runner.frames == 0 {
            log::info!("No frames requested, skipping headless run");
            return Ok(summary);
        }

        log::info!(
            "Starting headless run: {} frames on {}x{}",
            runner.frames,
            self.config.surface.width,
            self.config.surface.height
        );

        let first = simulation.init(&mut surface);
        summary.record(first);

        for frame in 1..runner.frames {
            // Only the latest frame is kept for packing
            surface.take_commands();
            let stats = frame_loop.step(&mut simulation, &mut surface);
            summary.record(stats);

            if runner.stats_every > 0 && frame % runner.stats_every == 0 {
                log::info!(
                    "frame {:>6}: {:>4} connections, meteor {}",
                    frame,
                    stats.map(|s| s.connections).unwrap_or(0),
                    if stats.is_some_and(|s| s.meteor_drawn) { "visible" } else { "waiting" }
                );
            }

            if runner.realtime {
                std::thread::sleep(runner.frame_interval());
            }
        }

        let batch = InstanceBatch::from_commands(surface.last_frame());
        summary.last_frame_bytes = batch.disc_bytes().len() + batch.line_bytes().len();
        log::debug!(
            "Last frame packed into {} instances ({} bytes)",
            batch.len(),
            summary.last_frame_bytes
        );

        summary.simulated = simulation.scheduler().now();
        summary.meteor_activations = simulation.meteor().map(|m| m.activations()).unwrap_or(0);
        simulation.destroy();

        log::info!(
            "Run finished: {} frames drawn, {:.1} connections/frame, {} meteor activations",
            summary.frames_drawn,
            summary.mean_connections(),
            summary.meteor_activations
        );
        Ok(summary)
    }
}
