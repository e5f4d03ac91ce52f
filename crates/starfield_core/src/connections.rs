//! Proximity lines between stars
//!
//! Every ordered pair of stars closer than the connect distance is joined by
//! a faint white line whose alpha falls off with squared distance. The pass is
//! O(n²), which is fine for the small, fixed star counts involved.

use starfield_math::Rgba;

use crate::config::ConnectionMode;
use crate::particle::Particle;
use crate::surface::{DrawContext, Stroke};

/// Alpha of a line between two coincident stars
pub const MAX_CONNECTION_ALPHA: f32 = 0.2;
/// Stroke width of connection lines
pub const CONNECTION_LINE_WIDTH: f32 = 1.0;

/// Alpha for a line at squared distance `dist_sq`, or `None` when the pair is
/// not connected (strictly below the threshold is required)
pub fn connection_alpha(dist_sq: f32, connect_distance: f32) -> Option<f32> {
    let threshold_sq = connect_distance * connect_distance;
    if dist_sq < threshold_sq {
        Some((MAX_CONNECTION_ALPHA - dist_sq / threshold_sq).max(0.0))
    } else {
        None
    }
}

/// Draw all connection lines and return how many were stroked
pub fn render_connections(
    ctx: &mut dyn DrawContext,
    particles: &[Particle],
    connect_distance: f32,
    mode: ConnectionMode,
) -> usize {
    let mut lines = 0;

    for (i, p1) in particles.iter().enumerate() {
        for (j, p2) in particles.iter().enumerate() {
            if i == j && mode == ConnectionMode::SkipSelf {
                continue;
            }

            let dist_sq = p1.position.distance_squared(p2.position);
            if let Some(alpha) = connection_alpha(dist_sq, connect_distance) {
                let stroke = Stroke::solid(Rgba::WHITE.with_alpha(alpha), CONNECTION_LINE_WIDTH);
                ctx.stroke_line(p1.position, p2.position, &stroke);
                lines += 1;
            }
        }
    }

    lines
}
