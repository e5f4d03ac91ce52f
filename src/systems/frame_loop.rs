//! Frame pacing system
//!
//! Stands in for the host's vsync callback: decides how much time passed
//! since the previous frame and hands it to the simulation.
//!
//! - Fixed pacing advances by the same interval every frame (deterministic,
//!   used for headless runs and tests)
//! - Realtime pacing measures wall-clock time between calls

use std::time::{Duration, Instant};
use starfield_core::{FrameStats, Simulation, Surface};

/// Longest step handed to the simulation in one frame
///
/// Prevents a burst of catch-up work after the host was suspended.
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(250);

/// How frame time is measured
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// Advance by a fixed interval each frame
    Fixed(Duration),
    /// Measure elapsed wall-clock time
    Realtime,
}

/// Drives a simulation one frame at a time
pub struct FrameLoopSystem {
    pacing: Pacing,
    last_frame: Instant,
    frames: u64,
}

impl FrameLoopSystem {
    /// Create a frame loop with the given pacing
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            last_frame: Instant::now(),
            frames: 0,
        }
    }

    /// Frame pacing in use
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Number of frames stepped so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Time step for the next frame
    fn next_step(&mut self) -> Duration {
        match self.pacing {
            Pacing::Fixed(step) => step.min(MAX_FRAME_STEP),
            Pacing::Realtime => {
                let now = Instant::now();
                let raw = now - self.last_frame;
                self.last_frame = now;
                raw.min(MAX_FRAME_STEP)
            }
        }
    }

    /// Run one frame
    ///
    /// Returns the stats of the frame the simulation drew, if any.
    pub fn step<S: Surface + ?Sized>(
        &mut self,
        simulation: &mut Simulation,
        surface: &mut S,
    ) -> Option<FrameStats> {
        let dt = self.next_step();
        self.frames += 1;
        simulation.tick(surface, dt)
    }
}

impl Default for FrameLoopSystem {
    fn default() -> Self {
        Self::new(Pacing::Realtime)
    }
}
