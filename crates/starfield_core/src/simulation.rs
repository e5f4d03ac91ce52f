//! Simulation driver
//!
//! Owns the stars, the meteor and the scheduler, and runs the frame loop:
//!
//! 1. Clear the surface
//! 2. Draw connection lines between nearby stars
//! 3. Update and draw every star
//! 4. Update and draw the meteor
//! 5. Request the next frame
//!
//! The host drives time through [`Simulation::tick`]. Everything is inert
//! before [`Simulation::init`] and after [`Simulation::destroy`].

use std::time::Duration;
use rand::rngs::StdRng;
use rand::Rng;
use starfield_math::{Size2, Vec2};

use crate::config::{SimulationConfig, SimulationConfigError};
use crate::connections::render_connections;
use crate::meteor::Meteor;
use crate::particle::Particle;
use crate::random::rng_from_seed;
use crate::scheduler::{FrameHandle, Scheduler, Task};
use crate::surface::Surface;

/// What a single frame drew
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Connection lines stroked
    pub connections: usize,
    /// Stars drawn
    pub particles_drawn: usize,
    /// Whether the meteor streak was drawn
    pub meteor_drawn: bool,
}

/// State that only exists between init and destroy
#[derive(Debug)]
struct Running {
    particles: Vec<Particle>,
    meteor: Meteor,
    /// Outstanding frame request
    frame: Option<FrameHandle>,
    /// Surface size as of the last frame or resize
    bounds: Size2,
}

/// The starfield simulation
pub struct Simulation<R: Rng = StdRng> {
    config: SimulationConfig,
    rng: R,
    scheduler: Scheduler,
    running: Option<Running>,
    last_frame: Option<FrameStats>,
    frames_rendered: u64,
}

impl Simulation<StdRng> {
    /// Create a simulation seeded from `config.seed` (or the OS when unset)
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationConfigError> {
        let rng = rng_from_seed(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Create a simulation with an explicit random source
    pub fn with_rng(config: SimulationConfig, rng: R) -> Result<Self, SimulationConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            scheduler: Scheduler::new(),
            running: None,
            last_frame: None,
            frames_rendered: 0,
        })
    }

    /// Size the surface to the viewport, spawn stars and meteor, and draw the
    /// first frame
    ///
    /// Calling init on a running simulation tears the old run down first.
    pub fn init<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<FrameStats> {
        if self.running.is_some() {
            log::debug!("Simulation re-initialized, tearing down previous run");
            self.destroy();
        }

        let viewport = surface.viewport();
        surface.resize(viewport);

        let particles: Vec<Particle> = (0..self.config.particle_count)
            .map(|_| Particle::spawn(viewport, &self.config, &mut self.rng))
            .collect();
        let meteor = Meteor::new(viewport, &self.config.meteor, &mut self.rng);

        log::debug!(
            "Simulation started: {} stars on {}x{} surface",
            particles.len(),
            viewport.width,
            viewport.height
        );

        self.running = Some(Running {
            particles,
            meteor,
            frame: None,
            bounds: viewport,
        });
        self.run_frame(surface)
    }

    /// Cancel the frame loop and the meteor timer and drop all stars
    ///
    /// Safe to call at any time, including repeatedly or before init. Pixel
    /// content of the surface is left untouched.
    pub fn destroy(&mut self) {
        let Some(mut state) = self.running.take() else {
            return;
        };

        if let Some(handle) = state.frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        state.meteor.cancel_pending(&mut self.scheduler);
        self.last_frame = None;

        log::debug!("Simulation destroyed after {} frames", self.frames_rendered);
    }

    /// Host vsync entry point
    ///
    /// Advances the clock by `dt`, fires due timers, then runs the requested
    /// frame if there is one. Returns the stats of the frame that ran.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S, dt: Duration) -> Option<FrameStats> {
        if self.running.is_none() {
            return None;
        }

        self.advance_timers(dt);
        self.scheduler.take_frame()?;
        self.run_frame(surface)
    }

    /// Advance the clock without running a frame
    ///
    /// Used when the host throttles or pauses frames; the meteor timer keeps
    /// running. Returns how many respawns happened.
    pub fn advance_timers(&mut self, dt: Duration) -> usize {
        let Some(state) = self.running.as_mut() else {
            return 0;
        };

        let mut respawns = 0;
        for timer in self.scheduler.advance(dt) {
            match timer.task {
                Task::MeteorRespawn => {
                    if state.meteor.respawn(timer.key, state.bounds, &self.config.meteor, &mut self.rng) {
                        respawns += 1;
                    }
                }
            }
        }
        respawns
    }

    /// Forward a viewport resize from the host
    ///
    /// Only honored while running; returns false (and leaves the surface
    /// alone) before init or after destroy.
    pub fn handle_resize<S: Surface + ?Sized>(&mut self, surface: &mut S, size: Size2) -> bool {
        let Some(state) = self.running.as_mut() else {
            log::trace!("Ignoring resize on an idle simulation");
            return false;
        };

        surface.resize(size);
        state.bounds = size;
        log::debug!("Surface resized to {}x{}", size.width, size.height);
        true
    }

    /// Replace the meteor, cancelling the old one's respawn timer
    ///
    /// A meteor that arrives already off screen gets a fresh respawn timer;
    /// any key it carried belonged to the previous run of the cycle.
    pub fn replace_meteor(&mut self, meteor: Meteor) -> bool {
        let Some(state) = self.running.as_mut() else {
            return false;
        };

        state.meteor.cancel_pending(&mut self.scheduler);
        state.meteor = meteor;
        if !state.meteor.is_active() {
            state.meteor.expire(&self.config.meteor, &mut self.scheduler);
        }
        true
    }

    /// Force the meteor off screen, re-arming its respawn timer
    pub fn expire_meteor(&mut self) -> bool {
        let Some(state) = self.running.as_mut() else {
            return false;
        };

        state.meteor.expire(&self.config.meteor, &mut self.scheduler);
        true
    }

    fn run_frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<FrameStats> {
        let Self { config, rng, scheduler, running, last_frame, frames_rendered } = self;
        let state = running.as_mut()?;

        // The loop stays scheduled even if this frame cannot draw
        state.frame = Some(scheduler.request_frame());
        state.bounds = surface.size();
        let bounds = state.bounds;

        let Some(ctx) = surface.context() else {
            log::trace!("Surface has no drawing context, skipping frame");
            return None;
        };

        ctx.clear_rect(Vec2::ZERO, bounds.extent());

        let connections = render_connections(
            ctx,
            &state.particles,
            config.connect_distance,
            config.connection_mode,
        );

        for particle in &mut state.particles {
            particle.update(bounds, config, rng);
            particle.draw(ctx);
        }

        state.meteor.update(bounds, &config.meteor, scheduler);
        state.meteor.draw(ctx, &config.meteor);

        let stats = FrameStats {
            connections,
            particles_drawn: state.particles.len(),
            meteor_drawn: state.meteor.is_active(),
        };
        *last_frame = Some(stats);
        *frames_rendered += 1;

        log::trace!(
            "Frame {}: {} connections, meteor {}",
            frames_rendered,
            connections,
            if stats.meteor_drawn { "visible" } else { "waiting" }
        );
        Some(stats)
    }

    /// Whether the simulation is between init and destroy
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Current stars (empty when not running)
    pub fn particles(&self) -> &[Particle] {
        self.running.as_ref().map(|s| s.particles.as_slice()).unwrap_or(&[])
    }

    /// The meteor, when running
    pub fn meteor(&self) -> Option<&Meteor> {
        self.running.as_ref().map(|s| &s.meteor)
    }

    /// Surface size the simulation is working with, when running
    pub fn bounds(&self) -> Option<Size2> {
        self.running.as_ref().map(|s| s.bounds)
    }

    /// The frame/timer scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Active configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Stats of the most recent frame of the current run
    pub fn last_frame_stats(&self) -> Option<FrameStats> {
        self.last_frame
    }

    /// Total frames drawn over the simulation's lifetime
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionMode;
    use crate::surface::testing::{Call, TestCanvas};
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_millis(16);

    fn seeded(seed: u64) -> Simulation {
        Simulation::new(SimulationConfig::default().with_seed(seed)).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = Simulation::new(SimulationConfig::default().with_particle_count(0));
        assert!(matches!(result, Err(SimulationConfigError::NoParticles)));
    }

    #[test]
    fn test_idle_before_init() {
        let mut sim = seeded(1);
        let mut canvas = TestCanvas::new(800, 600);

        assert!(!sim.is_running());
        assert!(sim.particles().is_empty());
        assert!(sim.meteor().is_none());
        assert_eq!(sim.tick(&mut canvas, FRAME), None);
        assert_eq!(sim.advance_timers(Duration::from_secs(10)), 0);
        assert!(!sim.handle_resize(&mut canvas, Size2::new(10, 10)));
        assert!(!sim.expire_meteor());
        sim.destroy();

        assert!(canvas.calls.is_empty());
        assert_eq!(canvas.size, Size2::new(300, 150));
    }

    #[test]
    fn test_init_sizes_surface_and_draws_first_frame() {
        let mut sim = seeded(2);
        let mut canvas = TestCanvas::new(800, 600);

        let stats = sim.init(&mut canvas).unwrap();

        assert_eq!(canvas.size, Size2::new(800, 600));
        assert_eq!(sim.particles().len(), 60);
        assert!(sim.meteor().unwrap().is_active());
        assert_eq!(stats.particles_drawn, 60);
        assert!(stats.meteor_drawn);
        assert!(sim.scheduler().frame_pending());
        assert_eq!(canvas.calls.first(), Some(&Call::Clear));
    }

    #[test]
    fn test_frame_draw_order() {
        let mut sim = seeded(3);
        let mut canvas = TestCanvas::new(800, 600);
        let stats = sim.init(&mut canvas).unwrap();

        let circles: Vec<usize> = canvas
            .calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, Call::Circle { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(circles.len(), 60);

        // Connections come right after the clear, before any star
        let first_circle = circles[0];
        assert_eq!(first_circle, 1 + stats.connections);
        // The meteor streak is the very last call
        assert!(matches!(canvas.calls.last(), Some(Call::Line { .. })));
        assert_eq!(canvas.calls.len(), 1 + stats.connections + 60 + 1);
    }

    #[test]
    fn test_tick_runs_one_frame_per_request() {
        let mut sim = seeded(4);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);

        assert!(sim.tick(&mut canvas, FRAME).is_some());
        assert!(sim.tick(&mut canvas, FRAME).is_some());
        assert_eq!(sim.frames_rendered(), 3);
        assert_eq!(sim.scheduler().now(), FRAME * 2);
    }

    #[test]
    fn test_missing_context_skips_frame_but_keeps_loop() {
        let mut sim = seeded(5);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);
        let before = sim.particles().to_vec();

        canvas.attached = false;
        canvas.calls.clear();
        assert_eq!(sim.tick(&mut canvas, FRAME), None);
        assert!(canvas.calls.is_empty());
        assert_eq!(sim.particles(), before.as_slice());
        assert!(sim.scheduler().frame_pending());

        canvas.attached = true;
        assert!(sim.tick(&mut canvas, FRAME).is_some());
    }

    #[test]
    fn test_destroy_stops_everything() {
        let mut sim = seeded(6);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);
        assert!(sim.expire_meteor());
        assert_eq!(sim.scheduler().pending_timers(), 1);

        sim.destroy();
        assert!(!sim.is_running());
        assert!(!sim.scheduler().frame_pending());
        assert_eq!(sim.scheduler().pending_timers(), 0);

        canvas.calls.clear();
        for _ in 0..500 {
            assert_eq!(sim.tick(&mut canvas, FRAME), None);
        }
        assert_eq!(sim.advance_timers(Duration::from_secs(60)), 0);
        assert!(canvas.calls.is_empty());

        // Idempotent
        sim.destroy();
        sim.destroy();
    }

    #[test]
    fn test_resize_while_running_then_ignored_after_destroy() {
        let mut sim = seeded(7);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);

        assert!(sim.handle_resize(&mut canvas, Size2::new(400, 300)));
        assert_eq!(canvas.size, Size2::new(400, 300));
        sim.tick(&mut canvas, FRAME);
        for p in sim.particles() {
            assert!(p.position.x < 400.0 && p.position.y < 300.0);
        }

        sim.destroy();
        assert!(!sim.handle_resize(&mut canvas, Size2::new(1024, 768)));
        assert_eq!(canvas.size, Size2::new(400, 300));
    }

    #[test]
    fn test_reinit_replaces_previous_run() {
        let mut sim = seeded(8);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);
        sim.expire_meteor();

        sim.init(&mut canvas);
        assert_eq!(sim.particles().len(), 60);
        assert!(sim.meteor().unwrap().is_active());
        assert_eq!(sim.scheduler().pending_timers(), 0);
    }

    #[test]
    fn test_meteor_respawns_through_ticks_after_delay() {
        let mut sim = seeded(9);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);
        sim.expire_meteor();

        // 187 frames of 16 ms = 2992 ms
        for _ in 0..187 {
            let stats = sim.tick(&mut canvas, FRAME).unwrap();
            assert!(!stats.meteor_drawn);
        }
        assert!(!sim.meteor().unwrap().is_active());

        let stats = sim.tick(&mut canvas, FRAME).unwrap();
        assert!(stats.meteor_drawn);
        assert_eq!(sim.meteor().unwrap().activations(), 2);
    }

    #[test]
    fn test_timers_fire_without_frames() {
        let mut sim = seeded(10);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);
        sim.expire_meteor();

        assert_eq!(sim.advance_timers(Duration::from_millis(2999)), 0);
        assert_eq!(sim.advance_timers(Duration::from_millis(1)), 1);
        assert!(sim.meteor().unwrap().is_active());
    }

    #[test]
    fn test_replace_meteor_cancels_old_timer() {
        let mut sim = seeded(11);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);
        sim.expire_meteor();

        let meteor = Meteor::from_state(Vec2::new(900.0, -50.0), Vec2::new(-1.0, 1.5), 60.0);
        assert!(sim.replace_meteor(meteor));
        assert_eq!(sim.scheduler().pending_timers(), 0);
        assert_eq!(sim.meteor().unwrap().position, Vec2::new(900.0, -50.0));
    }

    #[test]
    fn test_replace_with_inactive_meteor_still_respawns() {
        let mut sim = seeded(14);
        let mut canvas = TestCanvas::new(800, 600);
        sim.init(&mut canvas);
        sim.expire_meteor();
        sim.advance_timers(Duration::from_millis(1000));

        let expired = sim.meteor().unwrap().clone();
        assert!(!expired.is_active());
        assert!(sim.replace_meteor(expired));
        assert_eq!(sim.scheduler().pending_timers(), 1);
        let key = sim.meteor().unwrap().pending_reset().unwrap();
        assert_eq!(sim.scheduler().due_at(key), Some(Duration::from_millis(4000)));

        assert_eq!(sim.advance_timers(Duration::from_millis(2999)), 0);
        assert_eq!(sim.advance_timers(Duration::from_millis(1)), 1);
        assert!(sim.meteor().unwrap().is_active());
        assert!(sim.tick(&mut canvas, FRAME).unwrap().meteor_drawn);
    }

    #[test]
    fn test_connection_mode_changes_first_frame_count() {
        let skip = SimulationConfig::default().with_seed(12);
        let all = skip.clone().with_connection_mode(ConnectionMode::AllOrderedPairs);

        let mut a = Simulation::new(skip).unwrap();
        let mut b = Simulation::new(all).unwrap();
        let sa = a.init(&mut TestCanvas::new(800, 600)).unwrap();
        let sb = b.init(&mut TestCanvas::new(800, 600)).unwrap();

        assert_eq!(sb.connections, sa.connections + 60);
        assert_eq!(sa.connections % 2, 0);
    }

    #[test]
    fn test_injected_rng() {
        let rng = rand::rngs::SmallRng::seed_from_u64(13);
        let mut sim = Simulation::with_rng(SimulationConfig::default(), rng).unwrap();
        let mut canvas = TestCanvas::new(640, 480);
        assert!(sim.init(&mut canvas).is_some());
        for p in sim.particles() {
            assert!(p.position.x < 640.0 && p.position.y < 480.0);
        }
    }
}
