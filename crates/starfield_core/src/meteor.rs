//! Meteor streak and its respawn cycle
//!
//! The meteor enters from the top or right edge, flies down and to the left,
//! and once it has fully left the surface it waits for a respawn timer before
//! appearing again:
//!
//! ```text
//!   Active --(leaves surface)--> PendingReset --(timer fires)--> Active
//! ```
//!
//! At most one respawn timer is ever armed. Expiring again while a timer is
//! pending cancels the old timer first, and a timer whose key no longer
//! matches the pending one is ignored when it fires.

use rand::Rng;
use starfield_math::{Rgba, Size2, Vec2};

use crate::config::MeteorConfig;
use crate::random::uniform;
use crate::scheduler::{Scheduler, Task, TimerKey};
use crate::surface::{DrawContext, GradientStop, Paint, Stroke};

/// Lifecycle state of the meteor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeteorState {
    /// Flying and visible
    Active,
    /// Off screen, waiting for the respawn timer
    PendingReset,
}

/// Edge a meteor enters from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnEdge {
    /// Above the right half of the surface
    Top,
    /// Beside the upper half of the surface
    Right,
}

/// The meteor streak
#[derive(Clone, Debug)]
pub struct Meteor {
    /// Head position in surface pixels
    pub position: Vec2,
    /// Velocity in pixels per frame
    pub velocity: Vec2,
    /// Distance past the edge at which the meteor counts as gone
    pub tail_length: f32,
    /// Fades every frame, restored on reset
    pub opacity: f32,
    state: MeteorState,
    pending_reset: Option<TimerKey>,
    activations: u64,
}

impl Meteor {
    /// Create a meteor and place it on a random spawn edge
    pub fn new<R: Rng>(bounds: Size2, config: &MeteorConfig, rng: &mut R) -> Self {
        let mut meteor = Self::from_state(Vec2::ZERO, Vec2::ZERO, 0.0);
        meteor.activations = 0;
        meteor.reset(bounds, config, rng);
        meteor
    }

    /// Create an active meteor with explicit state
    pub fn from_state(position: Vec2, velocity: Vec2, tail_length: f32) -> Self {
        Self {
            position,
            velocity,
            tail_length,
            opacity: 1.0,
            state: MeteorState::Active,
            pending_reset: None,
            activations: 1,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> MeteorState {
        self.state
    }

    /// Whether the meteor is flying
    pub fn is_active(&self) -> bool {
        self.state == MeteorState::Active
    }

    /// Key of the armed respawn timer
    pub fn pending_reset(&self) -> Option<TimerKey> {
        self.pending_reset
    }

    /// How many times the meteor has been activated
    pub fn activations(&self) -> u64 {
        self.activations
    }

    /// Re-roll spawn position, velocity and tail, and activate
    ///
    /// Returns the chosen spawn edge. A timer that was still pending is
    /// forgotten and will be ignored when it fires.
    pub fn reset<R: Rng>(&mut self, bounds: Size2, config: &MeteorConfig, rng: &mut R) -> SpawnEdge {
        let extent = bounds.extent();
        let margin = config.spawn_margin;

        let edge = if rng.random::<f32>() < 0.5 { SpawnEdge::Top } else { SpawnEdge::Right };
        self.position = match edge {
            SpawnEdge::Top => Vec2::new(uniform(rng, extent.x / 2.0, extent.x), -margin),
            SpawnEdge::Right => Vec2::new(extent.x + margin, uniform(rng, 0.0, extent.y / 2.0)),
        };

        // Always down and to the left
        self.velocity = Vec2::new(uniform(rng, -3.0, -1.0), uniform(rng, 1.0, 2.0));
        self.tail_length = uniform(rng, config.min_tail_length, config.max_tail_length);
        self.opacity = 1.0;
        self.state = MeteorState::Active;
        self.pending_reset = None;
        self.activations += 1;

        log::trace!(
            "Meteor spawned on {:?} edge at ({:.1}, {:.1})",
            edge,
            self.position.x,
            self.position.y
        );
        edge
    }

    /// Advance one frame
    ///
    /// Returns true if the meteor left the surface during this frame.
    pub fn update(&mut self, bounds: Size2, config: &MeteorConfig, scheduler: &mut Scheduler) -> bool {
        if !self.is_active() {
            return false;
        }

        self.position += self.velocity;
        self.opacity *= config.opacity_decay;

        let extent = bounds.extent();
        let gone = self.position.y > extent.y + self.tail_length
            || self.position.x < -self.tail_length;
        if gone {
            self.expire(config, scheduler);
        }
        gone
    }

    /// Deactivate and arm the respawn timer, superseding any armed one
    pub fn expire(&mut self, config: &MeteorConfig, scheduler: &mut Scheduler) {
        self.state = MeteorState::PendingReset;
        self.cancel_pending(scheduler);

        let key = scheduler.set_timeout(config.respawn_delay(), Task::MeteorRespawn);
        self.pending_reset = Some(key);
        log::debug!("Meteor expired, respawn in {} ms", config.respawn_delay_ms);
    }

    /// Handle a fired respawn timer
    ///
    /// Only the currently armed timer resets the meteor; returns false for
    /// superseded keys.
    pub fn respawn<R: Rng>(
        &mut self,
        key: TimerKey,
        bounds: Size2,
        config: &MeteorConfig,
        rng: &mut R,
    ) -> bool {
        if self.pending_reset != Some(key) {
            log::trace!("Ignoring superseded meteor respawn timer");
            return false;
        }
        self.pending_reset = None;
        self.reset(bounds, config, rng);
        true
    }

    /// Cancel the armed respawn timer, if any
    pub fn cancel_pending(&mut self, scheduler: &mut Scheduler) {
        if let Some(key) = self.pending_reset.take() {
            scheduler.clear_timeout(key);
        }
    }

    /// End point of the drawn streak
    pub fn tail_end(&self, config: &MeteorConfig) -> Vec2 {
        self.position - self.velocity * config.streak_scale
    }

    /// Stroke the streak from the head back along the velocity
    pub fn draw(&self, ctx: &mut dyn DrawContext, config: &MeteorConfig) {
        if !self.is_active() {
            return;
        }

        let tail = self.tail_end(config);
        let stroke = Stroke {
            paint: Paint::LinearGradient {
                start: self.position,
                end: tail,
                stops: [
                    GradientStop::new(0.0, Rgba::WHITE.with_alpha(config.head_alpha)),
                    GradientStop::new(1.0, Rgba::WHITE.with_alpha(0.0)),
                ],
            },
            width: config.line_width,
        };
        ctx.stroke_line(self.position, tail, &stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::surface::testing::{Call, TestCanvas};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BOUNDS: Size2 = Size2::new(800, 600);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn assert_reset_postconditions(meteor: &Meteor) {
        assert!(meteor.is_active());
        assert_eq!(meteor.opacity, 1.0);
        assert!(meteor.velocity.x >= -3.0 && meteor.velocity.x < -1.0);
        assert!(meteor.velocity.y >= 1.0 && meteor.velocity.y < 2.0);
        assert!(meteor.tail_length >= 50.0 && meteor.tail_length < 100.0);
    }

    #[test]
    fn test_new_is_active_after_reset() {
        let mut rng = StdRng::seed_from_u64(1);
        let meteor = Meteor::new(BOUNDS, &MeteorConfig::default(), &mut rng);
        assert_reset_postconditions(&meteor);
        assert_eq!(meteor.activations(), 1);
        assert_eq!(meteor.pending_reset(), None);
    }

    #[test]
    fn test_reset_postconditions_and_spawn_edges() {
        let config = MeteorConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut meteor = Meteor::new(BOUNDS, &config, &mut rng);
        let mut seen_top = false;
        let mut seen_right = false;

        for _ in 0..200 {
            meteor.opacity = 0.1;
            match meteor.reset(BOUNDS, &config, &mut rng) {
                SpawnEdge::Top => {
                    seen_top = true;
                    assert!(meteor.position.x >= 400.0 && meteor.position.x < 800.0);
                    assert_eq!(meteor.position.y, -50.0);
                }
                SpawnEdge::Right => {
                    seen_right = true;
                    assert_eq!(meteor.position.x, 850.0);
                    assert!(meteor.position.y >= 0.0 && meteor.position.y < 300.0);
                }
            }
            assert_reset_postconditions(&meteor);
        }

        assert!(seen_top && seen_right);
    }

    #[test]
    fn test_update_integrates_and_fades() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut meteor = Meteor::from_state(Vec2::new(500.0, 10.0), Vec2::new(-2.0, 1.5), 60.0);

        assert!(!meteor.update(BOUNDS, &config, &mut scheduler));
        assert_eq!(meteor.position, Vec2::new(498.0, 11.5));
        assert_eq!(meteor.opacity, 0.98);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_leaving_bottom_expires() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut meteor = Meteor::from_state(Vec2::new(400.0, 659.0), Vec2::new(-1.0, 1.5), 60.0);

        assert!(meteor.update(BOUNDS, &config, &mut scheduler));
        assert_eq!(meteor.state(), MeteorState::PendingReset);
        let key = meteor.pending_reset().unwrap();
        assert_eq!(scheduler.due_at(key), Some(ms(3000)));
    }

    #[test]
    fn test_leaving_left_expires() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut meteor = Meteor::from_state(Vec2::new(-59.0, 300.0), Vec2::new(-2.0, 1.0), 60.0);

        assert!(meteor.update(BOUNDS, &config, &mut scheduler));
        assert!(!meteor.is_active());
    }

    #[test]
    fn test_exactly_at_threshold_stays_active() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut meteor = Meteor::from_state(Vec2::new(400.0, 658.5), Vec2::new(-1.0, 1.5), 60.0);

        // y lands on height + tail exactly, which is not past it
        assert!(!meteor.update(BOUNDS, &config, &mut scheduler));
        assert!(meteor.is_active());
    }

    #[test]
    fn test_inactive_meteor_is_inert() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut meteor = Meteor::from_state(Vec2::new(-100.0, 300.0), Vec2::new(-2.0, 1.0), 60.0);
        meteor.expire(&config, &mut scheduler);

        let frozen = meteor.position;
        assert!(!meteor.update(BOUNDS, &config, &mut scheduler));
        assert_eq!(meteor.position, frozen);
        assert_eq!(scheduler.pending_timers(), 1);

        let mut canvas = TestCanvas::new(800, 600);
        meteor.draw(&mut canvas, &config);
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn test_second_expire_supersedes_first_timer() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut meteor = Meteor::from_state(Vec2::new(-100.0, 300.0), Vec2::new(-2.0, 1.0), 60.0);

        meteor.expire(&config, &mut scheduler);
        let first = meteor.pending_reset().unwrap();
        scheduler.advance(ms(1000));
        meteor.expire(&config, &mut scheduler);
        assert_eq!(scheduler.pending_timers(), 1);
        assert!(!scheduler.is_pending(first));

        // The first timer would have fired at 3000 ms
        assert!(scheduler.advance(ms(2500)).is_empty());
        assert!(!meteor.is_active());

        let fired = scheduler.advance(ms(500));
        assert_eq!(fired.len(), 1);
        for timer in fired {
            assert!(meteor.respawn(timer.key, BOUNDS, &config, &mut rng));
        }
        assert!(meteor.is_active());
        assert_eq!(meteor.activations(), 2);
    }

    #[test]
    fn test_stale_key_is_ignored() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut meteor = Meteor::from_state(Vec2::new(-100.0, 300.0), Vec2::new(-2.0, 1.0), 60.0);

        meteor.expire(&config, &mut scheduler);
        let first = meteor.pending_reset().unwrap();
        meteor.expire(&config, &mut scheduler);

        assert!(!meteor.respawn(first, BOUNDS, &config, &mut rng));
        assert!(!meteor.is_active());
        assert_eq!(meteor.activations(), 1);
    }

    #[test]
    fn test_cancel_pending_clears_timer() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut meteor = Meteor::from_state(Vec2::new(-100.0, 300.0), Vec2::new(-2.0, 1.0), 60.0);

        meteor.expire(&config, &mut scheduler);
        meteor.cancel_pending(&mut scheduler);

        assert_eq!(meteor.pending_reset(), None);
        assert_eq!(scheduler.pending_timers(), 0);
        assert!(scheduler.advance(ms(10_000)).is_empty());
    }

    #[test]
    fn test_draw_gradient_streak() {
        let config = MeteorConfig::default();
        let mut canvas = TestCanvas::new(800, 600);
        let meteor = Meteor::from_state(Vec2::new(300.0, 200.0), Vec2::new(-2.0, 1.5), 60.0);

        meteor.draw(&mut canvas, &config);

        let expected_tail = Vec2::new(320.0, 185.0);
        match canvas.calls.as_slice() {
            [Call::Line { from, to, stroke }] => {
                assert_eq!(*from, Vec2::new(300.0, 200.0));
                assert_eq!(*to, expected_tail);
                assert_eq!(stroke.width, 2.0);
                match &stroke.paint {
                    Paint::LinearGradient { start, end, stops } => {
                        assert_eq!(*start, *from);
                        assert_eq!(*end, expected_tail);
                        assert_eq!(stops[0].color, Rgba::WHITE);
                        assert_eq!(stops[1].color.a, 0.0);
                    }
                    other => panic!("expected gradient, got {:?}", other),
                }
            }
            other => panic!("expected a single line, got {:?}", other),
        }
    }

    #[test]
    fn test_scenario_exits_bottom_and_waits_full_delay() {
        let config = MeteorConfig::default();
        let mut scheduler = Scheduler::new();
        let mut rng = StdRng::seed_from_u64(8);
        let mut meteor = Meteor::from_state(Vec2::new(900.0, -50.0), Vec2::new(-1.0, 1.5), 60.0);

        let mut frames = 0;
        while meteor.is_active() {
            meteor.update(BOUNDS, &config, &mut scheduler);
            frames += 1;
            assert!(frames < 1000, "meteor never left the surface");
        }
        assert!(meteor.position.y > 660.0);
        assert_eq!(frames, 474);

        let key = meteor.pending_reset().unwrap();
        assert!(scheduler.advance(ms(2999)).is_empty());
        assert!(!meteor.is_active());

        let fired = scheduler.advance(ms(1));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].key, key);
        assert!(meteor.respawn(key, BOUNDS, &config, &mut rng));
        assert!(meteor.is_active());
    }
}
